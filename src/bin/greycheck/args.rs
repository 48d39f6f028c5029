use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use greycheck::verifier::{DEFAULT_MAIL_FROM, DEFAULT_SMTP_PORT};
use greycheck::{AddressFamily, RetrySettings, VerifierConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// address on stdout when verified, `address: reason` on stderr otherwise
    Human,
    /// one JSON object per address on stdout (feature `with-serde`)
    Ndjson,
}

#[derive(Parser)]
#[command(
    name = "greycheck",
    version,
    about = "Check whether email addresses are deliverable, retrying greylisted ones"
)]
pub struct Cli {
    /// Email address to verify
    pub email: Option<String>,

    /// File with one address per line
    #[arg(short, long, value_name = "PATH", help_heading = "Main Options")]
    pub file: Option<PathBuf>,

    /// Read addresses from stdin (one per line)
    #[arg(long, conflicts_with = "file", help_heading = "Main Options")]
    pub stdin: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human, help_heading = "Main Options")]
    pub format: OutputFormat,

    /// DNS-only domain check, without connecting to the mail server
    #[arg(long, help_heading = "Verification options")]
    pub dns: bool,

    /// Envelope sender for MAIL FROM
    #[arg(long = "from", value_name = "EMAIL", default_value = DEFAULT_MAIL_FROM,
          help_heading = "Verification options")]
    pub mail_from: String,

    /// HELO host name [default: the kernel's host name, not resolved to a
    /// fully qualified name]
    #[arg(long, value_name = "HOST", help_heading = "Verification options")]
    pub helo: Option<String>,

    /// Timeout in seconds for each SMTP operation
    #[arg(long, value_name = "N", default_value_t = 10, help_heading = "Verification options")]
    pub timeout: u64,

    /// SMTP port on the mail exchange
    #[arg(long, default_value_t = DEFAULT_SMTP_PORT, help_heading = "Verification options")]
    pub port: u16,

    /// Never connect over IPv6
    #[arg(short = '4', long = "ipv4-only", help_heading = "Verification options")]
    pub ipv4_only: bool,

    /// Delay in seconds before retrying addresses that got a 4xx (greylisting)
    #[arg(long, value_name = "N", default_value_t = 60,
          help_heading = "Options for retries (Greylisting)")]
    pub retry: u64,

    /// Do not retry for more than N seconds (0 disables retries; 180+ is sensible)
    #[arg(long = "max-retry", value_name = "N", default_value_t = 0,
          help_heading = "Options for retries (Greylisting)")]
    pub max_retry: u64,

    /// Log verifier decisions to stderr
    #[arg(short, long, help_heading = "Verbosity")]
    pub verbose: bool,

    /// Log the SMTP conversation to stderr
    #[arg(short = 's', long = "smtp-verbose", help_heading = "Verbosity")]
    pub smtp_verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn has_input(&self) -> bool {
        self.email.is_some() || self.file.is_some() || self.stdin
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            helo: self.helo.clone().unwrap_or_else(default_helo),
            mail_from: self.mail_from.clone(),
            timeout: Duration::from_secs(self.timeout),
            dns_only: self.dns,
            family: if self.ipv4_only {
                AddressFamily::Ipv4Only
            } else {
                AddressFamily::Any
            },
            port: self.port,
        }
    }

    pub fn retry_settings(&self) -> RetrySettings {
        RetrySettings {
            retry_delay: Duration::from_secs(self.retry),
            max_retry_window: Duration::from_secs(self.max_retry),
        }
    }
}

/// This machine's host name as the kernel reports it (usually the short
/// name), or `localhost` when it cannot be determined. Pass `--helo` for a
/// fully qualified name.
pub fn default_helo() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .or_else(|| std::env::var("HOSTNAME").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
