//! Per-thread batch scheduler.
//!
//! Every OS thread that fetches lazily builds its own [`BatchScheduler`]: a
//! current-thread tokio runtime that multiplexes the batch's transfers, plus
//! the thread's [`HandlePool`]. Neither is shared, so the hot path takes no
//! locks. Both are dropped when the thread exits.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::runtime::{Builder, Runtime};
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

use crate::aggregate::{ResultAggregator, UrlJsonMap};
use crate::client::{Completion, Handle, transport_config};
use crate::pool::HandlePool;
use crate::{FetchError, RetryBehavior, RetryDecision, TransportConfig, UrlSet};

/// Longest the drive loop waits for a completion before logging an idle tick.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

thread_local! {
    static LOCAL_SCHEDULER: RefCell<Option<BatchScheduler>> = const { RefCell::new(None) };
}

/// Fetches `urls` on the calling thread's scheduler, creating it on first use.
///
/// Setup failures are reported per URL, so the returned map always holds an
/// entry for every input. The thread's runtime cannot block inside another
/// runtime, so calls from async code fail every URL with
/// [`FetchError::Runtime`].
pub(crate) fn run_local(
    urls: &UrlSet,
    max_connections: usize,
    policy: &RetryBehavior,
) -> UrlJsonMap {
    if urls.is_empty() {
        return UrlJsonMap::default();
    }

    let config = match transport_config() {
        Ok(config) => config,
        Err(msg) => return fail_all(urls, || FetchError::Init(msg.to_string())),
    };

    let outcome = LOCAL_SCHEDULER.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return Err("scheduler already in use on this thread".to_string());
        };
        if slot.is_none() {
            *slot = Some(BatchScheduler::new().map_err(|e| e.to_string())?);
        }
        match slot.as_mut() {
            Some(scheduler) => Ok(scheduler.run(urls, max_connections, policy, config)),
            None => Err("scheduler unavailable".to_string()),
        }
    });

    match outcome {
        Ok(Ok(results)) => results,
        Ok(Err(msg)) => fail_all(urls, || FetchError::Runtime(msg.clone())),
        Err(e) => fail_all(urls, || FetchError::Runtime(e.to_string())),
    }
}

fn fail_all(urls: &UrlSet, error: impl Fn() -> FetchError) -> UrlJsonMap {
    let mut results = ResultAggregator::with_capacity(urls.len());
    for url in urls {
        results.record_failure(url.clone(), error());
    }
    results.finish()
}

/// Drives batches for one thread.
#[derive(Debug)]
pub(crate) struct BatchScheduler {
    runtime: Runtime,
    pool: HandlePool,
}

impl BatchScheduler {
    pub(crate) fn new() -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime,
            pool: HandlePool::new(),
        })
    }

    /// Whether this thread may block on the runtime.
    ///
    /// Worker threads of another runtime may not; threads of its blocking
    /// pool may, even though they carry that runtime's context.
    fn can_block(&self) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| self.runtime.block_on(async {}))).is_ok()
    }

    /// Fetches every URL, blocking until each one is finalized.
    pub(crate) fn run(
        &mut self,
        urls: &UrlSet,
        max_connections: usize,
        policy: &RetryBehavior,
        config: &TransportConfig,
    ) -> UrlJsonMap {
        if !self.can_block() {
            return fail_all(urls, || {
                FetchError::Runtime(
                    "called from within an async runtime; use spawn_blocking".into(),
                )
            });
        }

        let mut results = ResultAggregator::with_capacity(urls.len());

        let acquired = {
            let _guard = self.runtime.enter();
            self.pool.acquire(urls, config)
        };
        for (url, e) in acquired.unallocated {
            results.record_failure(url, FetchError::Transport(e));
        }

        debug!(
            urls = urls.len(),
            max_connections,
            idle = self.pool.idle(),
            created = self.pool.created(),
            "starting batch"
        );

        let finished = self
            .runtime
            .block_on(drive(acquired.handles, max_connections, policy));

        let mut handles = Vec::with_capacity(finished.len());
        for (mut handle, completion) in finished {
            let body = handle.take_body();
            results.record(handle.url().clone(), completion, &body);
            handles.push(handle);
        }
        self.pool.release(handles);

        debug!(idle = self.pool.idle(), "batch finished");
        results.finish()
    }
}

/// Runs transfers until every handle is finalized.
///
/// At most `max_connections` transfers are in flight (zero means no limit).
/// A retried transfer waits out the policy's backoff on its own, so other
/// transfers keep progressing meanwhile.
async fn drive(
    handles: Vec<Handle>,
    max_connections: usize,
    policy: &RetryBehavior,
) -> Vec<(Handle, Completion)> {
    let limit = if max_connections == 0 {
        usize::MAX
    } else {
        max_connections
    };

    let mut finished = Vec::with_capacity(handles.len());
    let mut queue: VecDeque<Handle> = handles.into();
    let mut active = FuturesUnordered::new();
    let mut retries: HashMap<usize, u32> = HashMap::new();

    loop {
        while active.len() < limit {
            let Some(handle) = queue.pop_front() else {
                break;
            };
            active.push(transfer(handle, Duration::ZERO));
        }

        if active.is_empty() {
            break;
        }

        let (mut handle, completion) = match timeout(POLL_INTERVAL, active.next()).await {
            Ok(Some(done)) => done,
            Ok(None) => break,
            Err(_) => {
                trace!(active = active.len(), queued = queue.len(), "waiting for transfers");
                continue;
            }
        };

        let used = retries.get(&handle.id()).copied().unwrap_or(0);
        let outcome = handle.outcome(&completion);
        match policy.decide(outcome, used) {
            RetryDecision::Retry => {
                retries.insert(handle.id(), used + 1);
                debug!(
                    url = %handle.url(),
                    ?outcome,
                    attempt = used + 1,
                    backoff = ?policy.timeout,
                    "retrying transfer"
                );
                handle.clear();
                active.push(transfer(handle, policy.timeout));
            }
            RetryDecision::Finalize => finished.push((handle, completion)),
        }
    }

    finished
}

async fn transfer(mut handle: Handle, delay: Duration) -> (Handle, Completion) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
    let completion = handle.perform().await;
    (handle, completion)
}
