//! SMTP recipient probing.
//!
//! [`TcpProbe`] opens a session to the resolved mail exchange, walks
//! HELO / MAIL FROM / RCPT TO and hands back the RCPT TO reply. No message is
//! ever transmitted: the session is closed with QUIT right after RCPT TO.

mod error;
mod probe;
mod session;
mod types;

pub use error::ProbeError;
pub use probe::{SmtpProbe, TcpProbe};
pub use types::SmtpReply;
