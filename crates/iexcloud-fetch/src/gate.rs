//! Process-wide spacing of batch dispatches.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use serde_json::Value;
use tracing::trace;

use crate::{RetryBehavior, Url, UrlJsonMap, UrlSet};

#[derive(Debug)]
struct GateState {
    last_dispatch: Option<Instant>,
    policy: RetryBehavior,
}

impl GateState {
    fn cool_down(&self) {
        let Some(last) = self.last_dispatch else {
            return;
        };
        let remaining = self.policy.timeout.saturating_sub(last.elapsed());
        if !remaining.is_zero() {
            trace!(?remaining, "rate gate cooling down");
            thread::sleep(remaining);
        }
    }
}

/// Serializes batches across every thread so that a batch never starts less
/// than the policy's `timeout` after the previous one finished.
///
/// [`RateGate::fetch`] holds the lock through the cooldown sleep and the batch
/// itself, so batches from concurrent callers run one after another and never
/// overlap on the network.
///
/// Like [`fetch`](crate::fetch), a batch started from within an async runtime
/// reports [`FetchError::Runtime`](crate::FetchError::Runtime) for every URL.
///
/// ```no_run
/// use iexcloud_fetch::{RateGate, RetryBehavior, Url, UrlSet};
/// use std::time::Duration;
///
/// let gate = RateGate::new(
///     RetryBehavior::default()
///         .with_max_retries(3)
///         .with_responses_to_retry([429])
///         .with_timeout(Duration::from_millis(40)),
/// );
/// let urls: UrlSet = [Url::new("https://postman-echo.com/get").unwrap()].into();
/// let results = gate.fetch(&urls, 0);
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct RateGate {
    state: Mutex<GateState>,
}

impl RateGate {
    /// Creates a gate that has never dispatched.
    #[must_use]
    pub const fn new(policy: RetryBehavior) -> Self {
        Self {
            state: Mutex::new(GateState {
                last_dispatch: None,
                policy,
            }),
        }
    }

    /// Returns a copy of the current retry policy.
    #[must_use]
    pub fn retry_behavior(&self) -> RetryBehavior {
        self.lock().policy.clone()
    }

    /// Replaces the retry policy used by subsequent batches.
    pub fn set_retry_behavior(&self, policy: RetryBehavior) {
        self.lock().policy = policy;
    }

    /// Blocks until the cooldown since the previous dispatch has elapsed,
    /// then records a new dispatch and returns the policy for it.
    pub fn wait(&self) -> RetryBehavior {
        let mut state = self.lock();
        state.cool_down();
        state.last_dispatch = Some(Instant::now());
        state.policy.clone()
    }

    /// Waits for the gate, then fetches `urls` with the current policy.
    ///
    /// Other callers stay blocked until this batch has finished.
    pub fn fetch(&self, urls: &UrlSet, max_connections: usize) -> UrlJsonMap {
        self.dispatch(|policy| crate::fetch(urls, max_connections, policy))
    }

    /// Waits for the gate, then fetches a single URL.
    pub fn fetch_one(&self, url: &Url) -> Option<Value> {
        self.dispatch(|policy| crate::fetch_one(url, 1, policy))
    }

    fn dispatch<T>(&self, batch: impl FnOnce(&RetryBehavior) -> T) -> T {
        let mut state = self.lock();
        state.cool_down();
        let out = batch(&state.policy);
        state.last_dispatch = Some(Instant::now());
        out
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
