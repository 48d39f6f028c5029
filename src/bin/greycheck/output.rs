use std::io::Write;

use anyhow::Result;
use greycheck::{ResultSink, Verification, VerificationError};

use crate::args::OutputFormat;

pub fn sink_for(format: OutputFormat) -> Result<Box<dyn ResultSink>> {
    match format {
        OutputFormat::Human => Ok(Box::new(HumanSink::new(
            std::io::stdout(),
            std::io::stderr(),
        ))),
        #[cfg(feature = "with-serde")]
        OutputFormat::Ndjson => Ok(Box::new(NdjsonSink::new(std::io::stdout()))),
        #[cfg(not(feature = "with-serde"))]
        OutputFormat::Ndjson => anyhow::bail!("format=ndjson requires the 'with-serde' feature"),
    }
}

/// Verified addresses go to `out`, failures (`address: reason`) to `err`.
/// Each line is flushed immediately so long batches show progress.
pub struct HumanSink<O: Write, E: Write> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> HumanSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }
}

impl<O: Write, E: Write> ResultSink for HumanSink<O, E> {
    fn verified(&mut self, verification: &Verification) {
        let written = writeln!(self.out, "{}", verification.email).and_then(|()| self.out.flush());
        if let Err(err) = written {
            tracing::error!("writing result for {} failed: {err}", verification.email);
        }
    }

    fn failed(&mut self, email: &str, error: &VerificationError) {
        let written = writeln!(self.err, "{email}: {error}").and_then(|()| self.err.flush());
        if let Err(err) = written {
            tracing::error!("writing result for {email} failed: {err}");
        }
    }
}

#[cfg(feature = "with-serde")]
#[derive(serde::Serialize)]
struct ResultLine<'a> {
    email: &'a str,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a greycheck::ResolvedTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
}

/// One JSON object per address, verified or not, on a single stream.
#[cfg(feature = "with-serde")]
pub struct NdjsonSink<W: Write> {
    out: W,
}

#[cfg(feature = "with-serde")]
impl<W: Write> NdjsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write(&mut self, line: &ResultLine<'_>) {
        let written = serde_json::to_writer(&mut self.out, line)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(err) = written {
            tracing::error!("writing result for {} failed: {err}", line.email);
        }
    }
}

#[cfg(feature = "with-serde")]
impl<W: Write> ResultSink for NdjsonSink<W> {
    fn verified(&mut self, verification: &Verification) {
        self.write(&ResultLine {
            email: &verification.email,
            verified: true,
            target: Some(&verification.target),
            error: None,
            code: None,
        });
    }

    fn failed(&mut self, email: &str, error: &VerificationError) {
        self.write(&ResultLine {
            email,
            verified: false,
            target: None,
            error: Some(error.to_string()),
            code: error.status_code(),
        });
    }
}
