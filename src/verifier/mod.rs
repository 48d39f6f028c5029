//! Single-address verification: split the address, resolve a mail exchange,
//! probe it, classify the result.

mod error;
mod options;
mod types;

pub use error::VerificationError;
pub use options::{DEFAULT_MAIL_FROM, DEFAULT_SMTP_PORT, VerifierConfig};
pub use types::{Verification, VerificationOutcome, VerifyAddress};

use trust_dns_resolver::Resolver;

use crate::mx::{self, DnsLookup, ResolutionError};
use crate::observer::{NoopObserver, VerifyObserver};
use crate::smtp::{SmtpProbe, TcpProbe};

pub struct Verifier<L, P> {
    config: VerifierConfig,
    lookup: L,
    probe: P,
    observer: Box<dyn VerifyObserver>,
}

impl Verifier<Resolver, TcpProbe> {
    /// A verifier backed by the system DNS configuration and real SMTP
    /// connections.
    pub fn from_system(config: VerifierConfig) -> Result<Self, ResolutionError> {
        Ok(Self::new(config, mx::system_resolver()?, TcpProbe))
    }
}

impl<L: DnsLookup, P: SmtpProbe> Verifier<L, P> {
    pub fn new(config: VerifierConfig, lookup: L, probe: P) -> Self {
        Self {
            config,
            lookup,
            probe,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl VerifyObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Verify one address.
    ///
    /// Succeeds when the preferred mail exchange answers `250` to `RCPT TO`,
    /// or as soon as a mail exchange resolves in DNS-only mode.
    pub fn verify(&self, email: &str) -> VerificationOutcome {
        let email = email.trim();
        self.observer.verification_started(email);

        let (_, domain) = split_address(email)?;
        let ascii_domain =
            mx::normalize_domain(domain).map_err(|_| VerificationError::malformed(email))?;

        let target = mx::resolve_target(
            &self.lookup,
            &ascii_domain,
            self.config.family,
            self.observer.as_ref(),
        )
        .map_err(|source| VerificationError::dns(domain, source))?;

        if self.config.dns_only {
            return Ok(Verification {
                email: email.to_string(),
                target,
                reply: None,
            });
        }

        let outcome = self.probe.probe(&target, email, &self.config);
        match &outcome {
            Ok(reply) => self.observer.probe_replied(&target, reply),
            Err(err) => self.observer.probe_failed(&target, err),
        }

        let reply = outcome?;
        if reply.code == 250 {
            Ok(Verification {
                email: email.to_string(),
                target,
                reply: Some(reply),
            })
        } else {
            Err(VerificationError::Rejected {
                code: reply.code,
                message: reply.message,
            })
        }
    }
}

impl<L: DnsLookup, P: SmtpProbe> VerifyAddress for Verifier<L, P> {
    fn verify(&self, email: &str) -> VerificationOutcome {
        Verifier::verify(self, email)
    }
}

/// Split at the last `@`. The domain part must be non-empty, and the address
/// may not contain ASCII control characters or angle brackets since it is
/// sent verbatim inside `RCPT TO:<...>`.
pub fn split_address(email: &str) -> Result<(&str, &str), VerificationError> {
    if email
        .chars()
        .any(|c| c.is_ascii_control() || c == '<' || c == '>')
    {
        return Err(VerificationError::malformed(email));
    }
    match email.rsplit_once('@') {
        Some((local, domain)) if !domain.trim().is_empty() => Ok((local, domain)),
        _ => Err(VerificationError::malformed(email)),
    }
}

#[cfg(test)]
mod tests;
