//! Transition log.
//!
//! Records every phase change the controller makes so a shell or a test can
//! replay the path a session took. The log is bounded; the oldest records
//! are dropped first.

use super::event::Trigger;
use super::phase::Phase;
use super::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of records kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Record of a single phase change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Session the change belongs to
    pub session: SessionId,
    /// The phase being left
    pub from: Phase,
    /// The phase being entered
    pub to: Phase,
    /// The input or delay that caused it
    pub trigger: Trigger,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of phase changes.
///
/// # Example
///
/// ```rust
/// use cashpoint::core::{Phase, SessionId, TransitionLog, TransitionRecord, Trigger};
/// use chrono::Utc;
///
/// let session = SessionId::new();
/// let mut log = TransitionLog::with_capacity(8);
/// log.record(TransitionRecord {
///     session,
///     from: Phase::Welcome,
///     to: Phase::EnteringPin,
///     trigger: Trigger::Confirm,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.path(), vec![Phase::Welcome, Phase::EnteringPin]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionLog {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl TransitionLog {
    /// Create an empty log keeping at most `capacity` records (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Phases traversed: the first record's origin, then every destination.
    pub fn path(&self) -> Vec<Phase> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Path restricted to the records of one session.
    pub fn session_path(&self, session: SessionId) -> Vec<Phase> {
        let mut records = self.records.iter().filter(|r| r.session == session);
        let mut path = Vec::new();
        if let Some(first) = records.next() {
            path.push(first.from);
            path.push(first.to);
        }
        path.extend(records.map(|r| r.to));
        path
    }

    /// Time between the oldest and newest record still held.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
