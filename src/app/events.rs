//! Outbound application events.
//!
//! The [`LockService`](super::service::LockService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, forward to a host,
//! drive a test recorder.
//!
//! Nothing here carries the configured password or the digits entered.

use crate::fsm::LockingState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(LockingState),

    /// The FSM transitioned between states.
    StateChanged { from: LockingState, to: LockingState },

    /// A digit was committed; `index` is the position now being edited.
    EntryProgress { index: u8 },

    /// The entered password matched.
    Accepted,

    /// The entered password did not match.
    Rejected { consecutive_failures: u8 },

    /// Entry was abandoned after the inactivity timeout.
    EntryTimedOut,

    /// The lock record left its valid range and was reset to `Idle`.
    InvariantReset(&'static str),

    /// The service was torn down.
    Stopped,
}

/// Point-in-time status snapshot suitable for logging or display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    pub state: LockingState,
    pub password_index: u8,
    pub max_digits: u8,
    pub consecutive_failures: u8,
    pub armed_timers: u8,
}
