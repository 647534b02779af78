//! Function-pointer finite state machine engine.
//!
//! Table-driven event FSM:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌──────────────────┬──────────┬──────────┬──────────────────┐  │
//! │  │ LockingState     │ on_enter │ on_exit  │ on_event         │  │
//! │  ├──────────────────┼──────────┼──────────┼──────────────────┤  │
//! │  │ Idle             │ fn(ctx)  │    —     │ fn(ctx,ev)->Opt  │  │
//! │  │ EnteringPassword │ fn(ctx)  │ fn(ctx)  │ fn(ctx,ev)->Opt  │  │
//! │  │ Unlocked         │ fn(ctx)  │    —     │ fn(ctx,ev)->Opt  │  │
//! │  │ Locked           │ fn(ctx)  │    —     │ fn(ctx,ev)->Opt  │  │
//! │  └──────────────────┴──────────┴──────────┴──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each delivered event is handed to `on_event` of the **current** state,
//! which matches the full [`Event`] enum.  If it returns `Some(next)`, the
//! engine runs `on_exit` for the current state, then `on_enter` for the
//! next, and updates the current pointer.  All functions receive
//! `&mut LockContext`.

pub mod context;
pub mod states;

use core::fmt;

use context::LockContext;
use log::info;

use crate::events::Event;
use crate::timers::TimerId;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Coarse mode of the lock.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockingState {
    /// Waiting, no entry in progress.
    Idle = 0,
    /// Digits are being entered with the encoder and buttons.
    EnteringPassword = 1,
    /// Password accepted; device disarmed.
    Unlocked = 2,
    /// Explicit lock after a re-lock or a rejected attempt.
    Locked = 3,
}

impl LockingState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `LockingState`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::EnteringPassword,
            2 => Self::Unlocked,
            3 => Self::Locked,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

impl fmt::Display for LockingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::EnteringPassword => "EnteringPassword",
            Self::Unlocked => "Unlocked",
            Self::Locked => "Locked",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut LockContext);

/// Signature for the per-event handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateEventFn = fn(&mut LockContext, Event) -> Option<LockingState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: LockingState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and tracks the
/// current state.  The [`LockContext`] is threaded through every call.
pub struct Fsm {
    /// Fixed-size table indexed by `LockingState as usize`.
    table: [StateDescriptor; LockingState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Events dispatched since construction.
    event_count: u64,
    /// Event count at which the current state was entered.
    state_entry_event: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; LockingState::COUNT], initial: LockingState) -> Self {
        Self {
            table,
            current: initial as usize,
            event_count: 0,
            state_entry_event: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut LockContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Handle one event to completion.
    ///
    /// 1. A timer event clears the feedback armed flag of its timer.
    /// 2. Call `on_event` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn dispatch(&mut self, ctx: &mut LockContext, event: Event) {
        self.event_count += 1;

        if let Some(timer) = TimerId::for_event(event) {
            ctx.feedback.note_fired(timer);
        }

        let next = (self.table[self.current].on_event)(ctx, event);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    /// Force an immediate transition (used for invariant recovery).
    pub fn force_transition(&mut self, next: LockingState, ctx: &mut LockContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> LockingState {
        LockingState::from_index(self.current)
    }

    /// How many events have been dispatched in the current state.
    pub fn events_in_current_state(&self) -> u64 {
        self.event_count - self.state_entry_event
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: LockingState, ctx: &mut LockContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_event = self.event_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
