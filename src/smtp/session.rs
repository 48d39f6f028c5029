use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::{ProbeError, SmtpReply};

const WIRE_TARGET: &str = "greycheck::smtp";

/// Longest reply line accepted from a server, terminator excluded.
const MAX_LINE_LEN: u64 = 8192;

/// A plain-text SMTP client connection. Every command and reply line is
/// logged at `trace` level under the `greycheck::smtp` target.
pub(crate) struct SmtpSession {
    peer: SocketAddr,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    pub(crate) fn connect(
        addr: SocketAddr,
        timeout: Option<Duration>,
    ) -> Result<Self, ProbeError> {
        let connected = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        let stream = connected.map_err(|source| ProbeError::Connect {
            address: addr,
            source,
        })?;
        stream.set_read_timeout(timeout).map_err(ProbeError::io)?;
        stream.set_write_timeout(timeout).map_err(ProbeError::io)?;
        let reader = BufReader::new(stream.try_clone().map_err(ProbeError::io)?);
        tracing::trace!(target: WIRE_TARGET, "connected to {addr}");
        Ok(Self {
            peer: addr,
            stream,
            reader,
        })
    }

    /// Send `command` and wait for its reply. A command with an embedded line
    /// break is refused before anything is written.
    pub(crate) fn command(&mut self, command: &str) -> Result<SmtpReply, ProbeError> {
        if command.contains(['\r', '\n']) {
            return Err(ProbeError::Protocol(format!(
                "refusing to send command with embedded line break: {command:?}"
            )));
        }
        tracing::trace!(target: WIRE_TARGET, "[{}] C: {command}", self.peer);
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line).map_err(ProbeError::io)?;
        self.stream.flush().map_err(ProbeError::io)?;
        self.read_reply()
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let mut raw = String::new();
            let bytes = (&mut self.reader)
                .take(MAX_LINE_LEN + 2)
                .read_line(&mut raw)
                .map_err(ProbeError::io)?;
            if bytes == 0 {
                return Err(ProbeError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                )));
            }
            if raw.ends_with('\n') {
                raw.pop();
                if raw.ends_with('\r') {
                    raw.pop();
                }
            }
            if raw.len() as u64 > MAX_LINE_LEN {
                return Err(ProbeError::Protocol(format!(
                    "reply line longer than {MAX_LINE_LEN} bytes"
                )));
            }
            tracing::trace!(target: WIRE_TARGET, "[{}] S: {raw}", self.peer);

            let code_part = raw.get(..3).ok_or_else(|| {
                ProbeError::Protocol(format!("invalid SMTP reply: '{raw}'"))
            })?;
            let parsed_code = code_part.parse::<u16>().map_err(|_| {
                ProbeError::Protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(ProbeError::Protocol(format!(
                        "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            message_lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        let code =
            code.ok_or_else(|| ProbeError::Protocol("SMTP reply missing status code".into()))?;
        Ok(SmtpReply::new(code, message_lines.join("\n")))
    }

    /// Best-effort `QUIT`; the connection is closed when the session drops.
    pub(crate) fn quit(mut self) {
        if let Err(err) = self.command("QUIT") {
            tracing::trace!(target: WIRE_TARGET, "[{}] QUIT not acknowledged: {err}", self.peer);
        }
    }
}
