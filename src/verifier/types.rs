use crate::mx::ResolvedTarget;
use crate::smtp::SmtpReply;

use super::VerificationError;

/// A positive verification result.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub email: String,
    pub target: ResolvedTarget,
    /// The accepting RCPT TO reply. `None` in DNS-only mode.
    pub reply: Option<SmtpReply>,
}

pub type VerificationOutcome = Result<Verification, VerificationError>;

/// Anything that can verify a single address. Implemented by
/// [`Verifier`](super::Verifier) and by plain closures.
pub trait VerifyAddress {
    fn verify(&self, email: &str) -> VerificationOutcome;
}

impl<F> VerifyAddress for F
where
    F: Fn(&str) -> VerificationOutcome,
{
    fn verify(&self, email: &str) -> VerificationOutcome {
        self(email)
    }
}
