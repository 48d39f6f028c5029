use thiserror::Error;

use crate::mx::ResolutionError;
use crate::smtp::ProbeError;

/// Why an address could not be verified. Only [`Rejected`](Self::Rejected)
/// carries an SMTP status code.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("malformed address: {0}")]
    MalformedAddress(String),
    #[error("DNS error for {domain}")]
    Dns {
        domain: String,
        #[source]
        source: ResolutionError,
    },
    #[error("Other Error: {source}")]
    Other {
        #[from]
        source: ProbeError,
    },
    #[error("RCPT TO error: {code} {message}")]
    Rejected { code: u16, message: String },
}

impl VerificationError {
    pub(crate) fn malformed(input: impl Into<String>) -> Self {
        Self::MalformedAddress(input.into())
    }

    pub(crate) fn dns(domain: impl Into<String>, source: ResolutionError) -> Self {
        Self::Dns {
            domain: domain.into(),
            source,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// A 4xx rejection: the server may accept the address later.
    pub fn is_transient(&self) -> bool {
        self.status_code()
            .is_some_and(|code| (400..500).contains(&code))
    }
}
