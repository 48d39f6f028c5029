use thiserror::Error;

/// Failure categories reported by a [`DnsLookup`](super::DnsLookup)
/// implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no records of the requested type")]
    NoRecords,
    #[error("domain does not exist")]
    NoSuchDomain,
    #[error("lookup failed: {0}")]
    Failed(String),
}

impl LookupError {
    /// `true` when the name answered but had nothing for this record type,
    /// or does not exist at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NoRecords | Self::NoSuchDomain)
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("no usable mail exchange for {domain}")]
    NoMailExchange { domain: String },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: LookupError,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
}

impl ResolutionError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn no_mail_exchange(domain: impl Into<String>) -> Self {
        Self::NoMailExchange {
            domain: domain.into(),
        }
    }

    pub(crate) fn lookup(domain: impl Into<String>, source: LookupError) -> Self {
        Self::Lookup {
            domain: domain.into(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }
}
