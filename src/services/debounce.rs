// src/services/debounce.rs
// DOCUMENTATION: Cancelable debounce timers and per-channel request sequencing
// PURPOSE: Collapse bursts of viewport/keystroke events and discard stale responses

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Independent debounce timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceChannel {
    RegionFetch,
    TextSearch,
}

/// Independent request streams, each with its own sequence counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchChannel {
    Catalog,
    Region,
    TextSearch,
}

impl FetchChannel {
    fn index(self) -> usize {
        match self {
            FetchChannel::Catalog => 0,
            FetchChannel::Region => 1,
            FetchChannel::TextSearch => 2,
        }
    }
}

/// One pending timer per channel
/// DOCUMENTATION: Scheduling cancels any not-yet-fired timer on the same channel.
/// Once a timer fires its work runs as a detached task, so a later cancel never
/// aborts a request that is already in flight (stale results are handled by
/// RequestSequencer instead).
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<HashMap<DebounceChannel, JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` unless rescheduled or cancelled first
    /// DOCUMENTATION: Must be called from within a tokio runtime
    pub fn schedule_debounced<F>(&self, channel: DebounceChannel, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });

        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.insert(channel, timer) {
            if !previous.is_finished() {
                log::debug!("Debounce {:?}: rescheduled, previous timer cancelled", channel);
            }
            previous.abort();
        }
    }

    /// Cancel the pending timer on one channel, if any
    pub fn cancel(&self, channel: DebounceChannel) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = pending.remove(&channel) {
            handle.abort();
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }

    /// Whether a timer is scheduled and has not fired yet
    pub fn is_pending(&self, channel: DebounceChannel) -> bool {
        let pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending
            .get(&channel)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Monotonic request numbering per channel
/// DOCUMENTATION: A response is applied only if its number is still the latest
/// issued on its channel
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: [AtomicU64; 3],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new outgoing request
    pub fn issue(&self, channel: FetchChannel) -> u64 {
        self.latest[channel.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, channel: FetchChannel, seq: u64) -> bool {
        self.latest[channel.index()].load(Ordering::SeqCst) == seq
    }

    /// Invalidate whatever is in flight on a channel without issuing a request
    pub fn invalidate(&self, channel: FetchChannel) {
        self.issue(channel);
    }
}
