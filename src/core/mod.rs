//! Pure core of the transaction controller.
//!
//! This module contains plain data with no collaborators attached:
//! - Controller phases and their error recovery
//! - Per-customer session state
//! - Inbound events and scheduled work
//! - The bounded transition log

mod event;
mod history;
mod phase;
mod session;

pub use event::{Input, TimerEvent, Trigger};
pub use history::{TransitionLog, TransitionRecord, DEFAULT_HISTORY_CAPACITY};
pub use phase::{Phase, Recovery};
pub use session::{Amount, Session, SessionId, PIN_LENGTH};
