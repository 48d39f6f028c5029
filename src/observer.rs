//! Progress hooks for the verifier and the batch controller.
//!
//! Components receive a [`VerifyObserver`] when they are built and call it at
//! fixed points (resolution start, every MX candidate, address-family
//! fallback, probe result, retry scheduling). [`TracingObserver`] forwards
//! those calls to `tracing`; [`NoopObserver`] discards them.

use std::fmt;
use std::time::Duration;

use crate::mx::{LookupError, MxCandidate, ResolvedTarget};
use crate::smtp::{ProbeError, SmtpReply};
use crate::verifier::VerificationError;

/// DNS record type queried while resolving a probe target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Aaaa,
    A,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aaaa => f.write_str("AAAA"),
            Self::A => f.write_str("A"),
        }
    }
}

pub trait VerifyObserver {
    fn verification_started(&self, _email: &str) {}

    fn resolution_started(&self, _domain: &str) {}

    fn candidate_tried(&self, _candidate: &MxCandidate) {}

    /// An address lookup for an MX host produced nothing usable. The search
    /// continues with the next family or candidate either way.
    fn address_lookup_missed(&self, _host: &str, _kind: RecordKind, _error: &LookupError) {}

    fn target_selected(&self, _target: &ResolvedTarget) {}

    fn probe_replied(&self, _target: &ResolvedTarget, _reply: &SmtpReply) {}

    fn probe_failed(&self, _target: &ResolvedTarget, _error: &ProbeError) {}

    fn round_started(&self, _round: u32, _pending: usize, _retry_permitted: bool) {}

    fn deferred(&self, _email: &str, _error: &VerificationError) {}

    fn sleeping(&self, _delay: Duration, _queued: usize) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl VerifyObserver for NoopObserver {}

/// Emits every hook as a `tracing` event under the `greycheck` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl VerifyObserver for TracingObserver {
    fn verification_started(&self, email: &str) {
        tracing::debug!(target: "greycheck", "Verifying {email}");
    }

    fn resolution_started(&self, domain: &str) {
        tracing::debug!(target: "greycheck", domain, "resolving MX records");
    }

    fn candidate_tried(&self, candidate: &MxCandidate) {
        tracing::debug!(
            target: "greycheck",
            exchange = %candidate.exchange,
            preference = candidate.preference,
            "trying MX candidate"
        );
    }

    fn address_lookup_missed(&self, host: &str, kind: RecordKind, error: &LookupError) {
        if error.is_absent() {
            tracing::debug!(target: "greycheck", host, "no {kind} record: {error}");
        } else {
            tracing::warn!(target: "greycheck", host, "{kind} lookup failed, falling back: {error}");
        }
    }

    fn target_selected(&self, target: &ResolvedTarget) {
        tracing::debug!(target: "greycheck", "selected target {target}");
    }

    fn probe_replied(&self, target: &ResolvedTarget, reply: &SmtpReply) {
        tracing::debug!(
            target: "greycheck",
            exchange = %target.exchange,
            code = reply.code,
            "RCPT TO answered: {}",
            reply.message
        );
    }

    fn probe_failed(&self, target: &ResolvedTarget, error: &ProbeError) {
        tracing::debug!(target: "greycheck", exchange = %target.exchange, "probe failed: {error}");
    }

    fn round_started(&self, round: u32, pending: usize, retry_permitted: bool) {
        tracing::debug!(target: "greycheck", round, pending, retry_permitted, "starting round");
    }

    fn deferred(&self, email: &str, error: &VerificationError) {
        tracing::debug!(target: "greycheck", "{email}: {error} (will retry)");
    }

    fn sleeping(&self, delay: Duration, queued: usize) {
        tracing::debug!(
            target: "greycheck",
            "RETRY: {queued} emails, sleeping {} seconds",
            delay.as_secs()
        );
    }
}
