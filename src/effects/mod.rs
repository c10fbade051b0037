//! Collaborators the controller performs side effects through.
//!
//! This module is the "imperative shell" around the pure core: the
//! controller decides, and these traits carry its decisions out.
//!
//! - **Display**: write-only presentation sink, one screen at a time
//! - **Scheduler**: delayed callbacks with cancellation
//!
//! In-memory implementations of both ship here for tests and simple shells.

mod display;
mod scheduler;

pub use display::{Display, DisplayCall, RecordingDisplay, Screen};
pub use scheduler::{Deferred, ManualScheduler, Scheduler, Ticks, TimerHandle};
