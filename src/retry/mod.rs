//! Batch verification with greylisting retries.
//!
//! [`BatchRetryController`] verifies every address of a batch in order.
//! Addresses rejected with a 4xx status are queued and re-verified after
//! `retry_delay`, for as long as another round still fits in the
//! `max_retry_window` measured from the start of the batch. Everything else
//! is reported to the [`ResultSink`] as soon as it is known.

mod clock;

pub use clock::{Clock, SystemClock};

use std::time::{Duration, Instant};

use crate::observer::{NoopObserver, VerifyObserver};
use crate::verifier::{Verification, VerificationError, VerifyAddress};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Wait between two rounds.
    pub retry_delay: Duration,
    /// Total time budget for retries, counted from the start of the batch.
    /// Zero disables retries: every 4xx is final on the first attempt.
    pub max_retry_window: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retry_window: Duration::ZERO,
        }
    }
}

impl RetrySettings {
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        if self.max_retry_window.is_zero() {
            None
        } else {
            start.checked_add(self.max_retry_window)
        }
    }
}

/// Receives each address's final result as soon as it is decided.
pub trait ResultSink {
    fn verified(&mut self, verification: &Verification);
    fn failed(&mut self, email: &str, error: &VerificationError);
}

/// Whether a round starting at `now` may defer 4xx results: the following
/// round must begin strictly before `deadline`.
pub fn retry_permitted(now: Instant, retry_delay: Duration, deadline: Option<Instant>) -> bool {
    match deadline {
        Some(deadline) => now
            .checked_add(retry_delay)
            .is_some_and(|next_round| next_round < deadline),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub verified: usize,
    pub failed: usize,
    pub rounds: u32,
}

impl BatchReport {
    pub fn all_verified(&self) -> bool {
        self.failed == 0
    }
}

/// Pending addresses, deadline and round counter of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pending: Vec<String>,
    deadline: Option<Instant>,
    round: u32,
}

impl RetryState {
    pub fn new(pending: Vec<String>, deadline: Option<Instant>) -> Self {
        Self {
            pending,
            deadline,
            round: 0,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    fn begin_round(&mut self) -> Vec<String> {
        self.round += 1;
        std::mem::take(&mut self.pending)
    }

    fn requeue(&mut self, deferred: Vec<String>) {
        self.pending = deferred;
    }
}

pub struct BatchRetryController<'a, V: ?Sized, C> {
    verifier: &'a V,
    clock: C,
    settings: RetrySettings,
    observer: Box<dyn VerifyObserver + 'a>,
}

impl<'a, V: VerifyAddress + ?Sized> BatchRetryController<'a, V, SystemClock> {
    pub fn new(verifier: &'a V, settings: RetrySettings) -> Self {
        Self::with_clock(verifier, settings, SystemClock)
    }
}

impl<'a, V: VerifyAddress + ?Sized, C: Clock> BatchRetryController<'a, V, C> {
    pub fn with_clock(verifier: &'a V, settings: RetrySettings, clock: C) -> Self {
        Self {
            verifier,
            clock,
            settings,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl VerifyObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Verify `addresses` until every one of them is either verified or has
    /// failed for good. Blank entries are skipped.
    pub fn run<I, S>(&self, addresses: I, sink: &mut dyn ResultSink) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pending = addresses
            .into_iter()
            .map(Into::into)
            .filter(|email: &String| !email.trim().is_empty())
            .collect();
        let mut state = RetryState::new(pending, self.settings.deadline_from(self.clock.now()));
        let mut report = BatchReport::default();

        while !state.is_done() {
            let deferred = self.run_round(&mut state, sink, &mut report);
            if !deferred.is_empty() {
                self.observer
                    .sleeping(self.settings.retry_delay, deferred.len());
                self.clock.sleep(self.settings.retry_delay);
            }
            state.requeue(deferred);
        }

        report
    }

    fn run_round(
        &self,
        state: &mut RetryState,
        sink: &mut dyn ResultSink,
        report: &mut BatchReport,
    ) -> Vec<String> {
        let permitted = retry_permitted(
            self.clock.now(),
            self.settings.retry_delay,
            state.deadline(),
        );
        let batch = state.begin_round();
        report.rounds = state.round();
        self.observer
            .round_started(state.round(), batch.len(), permitted);

        let mut deferred = Vec::new();
        for email in batch {
            match self.verifier.verify(&email) {
                Ok(verification) => {
                    report.verified += 1;
                    sink.verified(&verification);
                }
                Err(err) if permitted && err.is_transient() => {
                    self.observer.deferred(&email, &err);
                    deferred.push(email);
                }
                Err(err) => {
                    report.failed += 1;
                    sink.failed(&email, &err);
                }
            }
        }
        deferred
    }
}
