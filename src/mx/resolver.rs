use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{AddressFamily, LookupError, MxCandidate, MxStatus, ResolutionError, ResolvedTarget};
use crate::observer::{NoopObserver, RecordKind, VerifyObserver};

/// The DNS queries the verifier needs. Implemented for the synchronous
/// `trust-dns` [`Resolver`]; tests plug in stubs.
pub trait DnsLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxCandidate>, LookupError>;
    fn lookup_ipv6(&self, host: &str) -> Result<Vec<Ipv6Addr>, LookupError>;
    fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, LookupError>;
}

impl<T: DnsLookup + ?Sized> DnsLookup for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxCandidate>, LookupError> {
        (**self).lookup_mx(domain)
    }

    fn lookup_ipv6(&self, host: &str) -> Result<Vec<Ipv6Addr>, LookupError> {
        (**self).lookup_ipv6(host)
    }

    fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, LookupError> {
        (**self).lookup_ipv4(host)
    }
}

impl DnsLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxCandidate>, LookupError> {
        let lookup = Resolver::mx_lookup(self, domain).map_err(classify)?;
        Ok(lookup
            .iter()
            .map(|mx| {
                MxCandidate::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8()))
            })
            .collect())
    }

    fn lookup_ipv6(&self, host: &str) -> Result<Vec<Ipv6Addr>, LookupError> {
        let lookup = Resolver::ipv6_lookup(self, host).map_err(classify)?;
        Ok(lookup.iter().map(|aaaa| aaaa.0).collect())
    }

    fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, LookupError> {
        let lookup = Resolver::ipv4_lookup(self, host).map_err(classify)?;
        Ok(lookup.iter().map(|a| a.0).collect())
    }
}

fn classify(err: ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            LookupError::NoSuchDomain
        }
        ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoRecords,
        _ => LookupError::Failed(err.to_string()),
    }
}

/// Build a resolver from the system configuration (`/etc/resolv.conf`).
pub fn system_resolver() -> Result<Resolver, ResolutionError> {
    Resolver::from_system_conf().map_err(ResolutionError::resolver_init)
}

/// Lookup MX records for `domain` using the system resolver.
///
/// The domain is normalized via IDNA before querying DNS. The resulting
/// [`MxStatus`] holds the records in ascending preference.
pub fn check_mx(domain: &str) -> Result<MxStatus, ResolutionError> {
    let ascii = normalize_domain(domain)?;
    let resolver = system_resolver()?;
    mx_status_with(&resolver, &ascii)
}

pub(crate) fn mx_status_with<L: DnsLookup>(
    lookup: &L,
    ascii_domain: &str,
) -> Result<MxStatus, ResolutionError> {
    match ranked_candidates(lookup, ascii_domain) {
        Ok(records) if records.is_empty() => Ok(MxStatus::NoRecords),
        Ok(records) => Ok(MxStatus::Records(records)),
        Err(err) if err.is_absent() => Ok(MxStatus::NoRecords),
        Err(err) => Err(ResolutionError::lookup(ascii_domain, err)),
    }
}

/// MX answers for `domain`, sorted by preference. Equal preferences keep the
/// order the resolver returned them in.
pub fn ranked_candidates<L: DnsLookup>(
    lookup: &L,
    domain: &str,
) -> Result<Vec<MxCandidate>, LookupError> {
    let mut records = lookup.lookup_mx(domain)?;
    records.sort_by_key(|record| record.preference);
    Ok(records)
}

/// Pick the address to probe for `domain`.
///
/// Candidates are walked in preference order; for each one an AAAA lookup is
/// tried first (unless `family` is [`AddressFamily::Ipv4Only`]), then an A
/// lookup. The first address found wins.
pub fn resolve_target<L: DnsLookup>(
    lookup: &L,
    domain: &str,
    family: AddressFamily,
    observer: &dyn VerifyObserver,
) -> Result<ResolvedTarget, ResolutionError> {
    observer.resolution_started(domain);

    let candidates = match ranked_candidates(lookup, domain) {
        Ok(candidates) => candidates,
        Err(err) if err.is_absent() => return Err(ResolutionError::no_mail_exchange(domain)),
        Err(err) => return Err(ResolutionError::lookup(domain, err)),
    };

    for candidate in &candidates {
        observer.candidate_tried(candidate);
        if let Some(address) = first_address(lookup, &candidate.exchange, family, observer) {
            let target = ResolvedTarget {
                exchange: candidate.exchange.clone(),
                preference: candidate.preference,
                address,
            };
            observer.target_selected(&target);
            return Ok(target);
        }
    }

    Err(ResolutionError::no_mail_exchange(domain))
}

/// Convenience wrapper around [`resolve_target`] with no observer attached.
pub fn resolve_target_quiet<L: DnsLookup>(
    lookup: &L,
    domain: &str,
    family: AddressFamily,
) -> Result<ResolvedTarget, ResolutionError> {
    resolve_target(lookup, domain, family, &NoopObserver)
}

fn first_address<L: DnsLookup>(
    lookup: &L,
    host: &str,
    family: AddressFamily,
    observer: &dyn VerifyObserver,
) -> Option<IpAddr> {
    if family.allows_ipv6() {
        match lookup.lookup_ipv6(host) {
            Ok(addrs) => match addrs.first() {
                Some(addr) => return Some(IpAddr::V6(*addr)),
                None => {
                    observer.address_lookup_missed(host, RecordKind::Aaaa, &LookupError::NoRecords)
                }
            },
            Err(err) => observer.address_lookup_missed(host, RecordKind::Aaaa, &err),
        }
    }

    match lookup.lookup_ipv4(host) {
        Ok(addrs) => match addrs.first() {
            Some(addr) => Some(IpAddr::V4(*addr)),
            None => {
                observer.address_lookup_missed(host, RecordKind::A, &LookupError::NoRecords);
                None
            }
        },
        Err(err) => {
            observer.address_lookup_missed(host, RecordKind::A, &err);
            None
        }
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, ResolutionError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(ResolutionError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(ResolutionError::idna)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
