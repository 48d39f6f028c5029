#![forbid(unsafe_code)]
//! greycheck — SMTP mailbox verification without sending mail.
//!
//! An address is checked by resolving the MX of its domain and running
//! HELO / MAIL FROM / RCPT TO against the preferred exchange. Batches are
//! retried after a delay when servers answer with a temporary 4xx status,
//! which is how greylisting usually shows up.

pub mod input;
pub mod mx;
pub mod observer;
pub mod retry;
pub mod smtp;
pub mod verifier;

pub use input::read_addresses;
pub use mx::{
    AddressFamily, DnsLookup, LookupError, MxCandidate, MxStatus, ResolutionError, ResolvedTarget,
    check_mx, resolve_target,
};
pub use observer::{NoopObserver, RecordKind, TracingObserver, VerifyObserver};
pub use retry::{
    BatchReport, BatchRetryController, Clock, ResultSink, RetrySettings, RetryState, SystemClock,
    retry_permitted,
};
pub use smtp::{ProbeError, SmtpProbe, SmtpReply, TcpProbe};
pub use verifier::{
    Verification, VerificationError, VerificationOutcome, Verifier, VerifierConfig, VerifyAddress,
};
