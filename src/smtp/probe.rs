use std::net::SocketAddr;

use super::session::SmtpSession;
use super::{ProbeError, SmtpReply};
use crate::mx::ResolvedTarget;
use crate::verifier::VerifierConfig;

/// Runs the HELO / MAIL FROM / RCPT TO dialogue against one target and
/// returns the RCPT TO reply.
pub trait SmtpProbe {
    fn probe(
        &self,
        target: &ResolvedTarget,
        recipient: &str,
        config: &VerifierConfig,
    ) -> Result<SmtpReply, ProbeError>;
}

impl<T: SmtpProbe + ?Sized> SmtpProbe for &T {
    fn probe(
        &self,
        target: &ResolvedTarget,
        recipient: &str,
        config: &VerifierConfig,
    ) -> Result<SmtpReply, ProbeError> {
        (**self).probe(target, recipient, config)
    }
}

/// [`SmtpProbe`] over a plain TCP connection to `target:config.port`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl SmtpProbe for TcpProbe {
    fn probe(
        &self,
        target: &ResolvedTarget,
        recipient: &str,
        config: &VerifierConfig,
    ) -> Result<SmtpReply, ProbeError> {
        let addr = SocketAddr::new(target.address, config.port);
        let mut session = SmtpSession::connect(addr, config.timeout())?;
        let result = converse(&mut session, recipient, config);
        session.quit();
        result
    }
}

/// HELO and MAIL FROM replies are not inspected; only the RCPT TO reply
/// decides the outcome.
fn converse(
    session: &mut SmtpSession,
    recipient: &str,
    config: &VerifierConfig,
) -> Result<SmtpReply, ProbeError> {
    let greeting = session.read_reply()?;
    if !greeting.is_positive_completion() {
        return Err(ProbeError::Greeting {
            code: greeting.code,
            message: greeting.message,
        });
    }

    session.command(&format!("HELO {}", config.helo))?;
    session.command(&format!("MAIL FROM:<{}>", config.mail_from))?;
    session.command(&format!("RCPT TO:<{recipient}>"))
}
