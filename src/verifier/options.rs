use std::time::Duration;

use crate::mx::AddressFamily;

pub const DEFAULT_MAIL_FROM: &str = "noreply@example.com";
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Settings shared by every verification. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Name announced with `HELO`.
    pub helo: String,
    /// Envelope sender used for `MAIL FROM`.
    pub mail_from: String,
    /// Connect/read/write deadline for each SMTP operation. Zero disables it.
    pub timeout: Duration,
    /// Stop after resolving a mail exchange; never open an SMTP session.
    pub dns_only: bool,
    pub family: AddressFamily,
    pub port: u16,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            helo: "localhost".to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            timeout: Duration::from_secs(10),
            dns_only: false,
            family: AddressFamily::Any,
            port: DEFAULT_SMTP_PORT,
        }
    }
}

impl VerifierConfig {
    /// Return the timeout as an [`Option`]; `None` means no deadline.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}
