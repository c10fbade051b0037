//! Delayed callbacks.
//!
//! The controller never sleeps. It asks a [`Scheduler`] to hand a
//! [`Deferred`] back after a number of ticks; the driver passes it to
//! `Controller::fire` when it comes due.

use crate::core::{SessionId, TimerEvent};
use serde::{Deserialize, Serialize};

/// Length of a delay in abstract time units.
pub type Ticks = u32;

/// Handle used to cancel a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// A callback reified as data: which session asked, and for what.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deferred {
    pub session: SessionId,
    pub event: TimerEvent,
}

/// Delayed-callback facility.
pub trait Scheduler {
    /// Deliver `deferred` once, `ticks` from now.
    fn after(&mut self, ticks: Ticks, deferred: Deferred) -> TimerHandle;

    /// Drop a pending callback. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Clone, Debug)]
struct PendingTimer {
    due: u64,
    handle: TimerHandle,
    deferred: Deferred,
}

/// Scheduler driven by an explicit virtual clock.
///
/// # Example
///
/// ```rust
/// use cashpoint::core::{SessionId, TimerEvent};
/// use cashpoint::effects::{Deferred, ManualScheduler, Scheduler};
///
/// let mut scheduler = ManualScheduler::new();
/// let deferred = Deferred { session: SessionId::new(), event: TimerEvent::PinRetry };
/// scheduler.after(2, deferred);
///
/// assert!(scheduler.advance(1).is_empty());
/// assert_eq!(scheduler.advance(1), vec![deferred]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now: u64,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of callbacks not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Ticks until the next callback is due.
    pub fn next_due_in(&self) -> Option<u64> {
        self.pending
            .iter()
            .map(|timer| timer.due.saturating_sub(self.now))
            .min()
    }

    /// Move the clock forward and return every callback now due, earliest first.
    pub fn advance(&mut self, ticks: Ticks) -> Vec<Deferred> {
        self.now += u64::from(ticks);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|timer| timer.due <= now);
        self.pending = pending;

        due.sort_by_key(|timer| (timer.due, timer.handle));
        due.into_iter().map(|timer| timer.deferred).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, ticks: Ticks, deferred: Deferred) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTimer {
            due: self.now + u64::from(ticks),
            handle,
            deferred,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }
}
