use std::net::SocketAddr;

use thiserror::Error;

/// Transport-level failures while talking to a mail server. None of them
/// carry an SMTP status code for the probed recipient.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {address} failed: {source}")]
    Connect {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("server refused the session: {code} {message}")]
    Greeting { code: u16, message: String },
}

impl ProbeError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
