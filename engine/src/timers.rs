//! Deferred engine work.
//!
//! The engine never sleeps. Work that has to happen later (retry reloads,
//! overlay auto-hide) is queued here with a deadline and executed by
//! [`crate::App::run_due_timers`]. Queued work is never cancelled; every task
//! re-validates the state it was scheduled against when it fires.

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chorus_types::ViewId;

use crate::recovery::PaneRecoveryState;

/// Time source for scheduling. Injected so tests can drive time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Reload a pane view toward `expected.target_url`, if its recovery state
    /// is still exactly `expected`.
    RetryLoad {
        view: ViewId,
        expected: PaneRecoveryState,
    },
    /// Hide the quick prompt if it is still visible, still `view`, and still
    /// unfocused.
    QuickPromptBlurHide { view: ViewId },
}

#[derive(Debug)]
struct ScheduledTask {
    deadline: Instant,
    seq: u64,
    task: TimerTask,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    scheduled: Vec<ScheduledTask>,
    next_seq: u64,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::debug!(?task, "Scheduled timer");
        self.scheduled.push(ScheduledTask {
            deadline,
            seq,
            task,
        });
    }

    /// Remove and return every task due at `now`, earliest first. Tasks with
    /// equal deadlines keep scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) = mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|scheduled| scheduled.deadline <= now);
        self.scheduled = pending;
        due.sort_by_key(|scheduled| (scheduled.deadline, scheduled.seq));
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.iter().map(|scheduled| scheduled.deadline).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}
