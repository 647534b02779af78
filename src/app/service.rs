//! Application service — the hexagonal core.
//!
//! [`LockService`] owns the FSM and the lock record.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  EncoderPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                  │      LockService       │
//!    PanelPort ◀── │  FSM · Feedback        │ ──▶ TimerPort
//!                  └────────────────────────┘
//! ```

use log::{debug, error, info};

use crate::config::LockConfig;
use crate::error::ConfigError;
use crate::events::Event;
use crate::fsm::context::{
    Command, EntryOutcome, InputSnapshot, IoCommand, LockContext, TimerCommand,
};
use crate::fsm::states::{build_state_table, display_content};
use crate::fsm::{Fsm, LockingState};
use crate::timers::TimerId;

use super::events::{AppEvent, LockStatus};
use super::ports::{EncoderPort, EventSink, PanelPort, TimerPort};

// ───────────────────────────────────────────────────────────────
// LockService
// ───────────────────────────────────────────────────────────────

/// The lock service orchestrates all domain logic.
pub struct LockService {
    fsm: Fsm,
    ctx: LockContext,
    events_handled: u64,
}

impl LockService {
    /// Construct the service from a configuration that passes
    /// [`LockConfig::validate`].
    ///
    /// Does **not** start the FSM — call [`init`](Self::init) next.
    pub fn new(config: LockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fsm: Fsm::new(build_state_table(), LockingState::Idle),
            ctx: LockContext::new(config),
            events_handled: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the record into `Idle` with zeroed entry fields and start the
    /// periodic display refresh.
    pub fn init(
        &mut self,
        panel: &mut impl PanelPort,
        timers: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        self.fsm.start(&mut self.ctx);

        let content = display_content(self.fsm.current_state(), &self.ctx);
        self.ctx.feedback.ui_refresh(&mut self.ctx.commands, content);

        self.apply(panel, timers);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("LockService started in {}", self.fsm.current_state());
    }

    /// Disarm all four timers, drive outputs off and reset the record.
    /// A later [`init`](Self::init) starts from scratch.
    pub fn deinit(
        &mut self,
        panel: &mut impl PanelPort,
        timers: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.feedback.shutdown(&mut self.ctx.commands);
        self.apply(panel, timers);
        panel.all_off();

        let config = self.ctx.config.clone();
        self.fsm = Fsm::new(build_state_table(), LockingState::Idle);
        self.ctx = LockContext::new(config);

        sink.emit(&AppEvent::Stopped);
        info!("LockService stopped after {} events", self.events_handled);
    }

    // ── Event handling ────────────────────────────────────────

    /// Handle one event to completion: read input, run the FSM, apply the
    /// resulting commands, report what happened.
    ///
    /// The `io` parameter satisfies **both** [`PanelPort`] and
    /// [`EncoderPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn handle_event(
        &mut self,
        event: Event,
        io: &mut (impl PanelPort + EncoderPort),
        timers: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        self.events_handled += 1;

        // A one-shot re-armed after it fired still shows as armed: the
        // queued event is from the old countdown.
        if let Some(timer) = TimerId::for_event(event) {
            if timers.is_armed(timer) {
                debug!("Dropped {event}: {} re-armed since it fired", timer.name());
                return;
            }
        }

        let prev_state = self.fsm.current_state();
        let prev_index = self.ctx.password_index;

        // 1. Snapshot input.  The encoder is only read when a turn can
        //    matter, so stray turns elsewhere leave no trace.
        self.ctx.outcome = None;
        self.ctx.input = InputSnapshot::default();
        if event == Event::EncoderTurn && prev_state == LockingState::EnteringPassword {
            self.ctx.input.encoder_delta = io.read_delta();
        }

        // 2. FSM dispatch (pure state logic)
        self.fsm.dispatch(&mut self.ctx, event);

        // 3. Invariant check with reset-to-Idle recovery
        if let Some(what) = self.ctx.check_invariants() {
            error!("Lock record invariant broken ({what}); resetting to Idle");
            self.ctx.clear_entry();
            self.fsm.force_transition(LockingState::Idle, &mut self.ctx);
            sink.emit(&AppEvent::InvariantReset(what));
        }

        let new_state = self.fsm.current_state();

        // Turns made before entry began must not count towards the first digit.
        if new_state == LockingState::EnteringPassword && prev_state != new_state {
            let stale = io.read_delta();
            if stale != 0 {
                debug!("Discarded {stale} encoder steps from before entry");
            }
        }

        // 4. Apply device and timer commands via the ports
        self.apply(io, timers);

        // 5. Report
        match self.ctx.outcome.take() {
            Some(EntryOutcome::Accepted) => sink.emit(&AppEvent::Accepted),
            Some(EntryOutcome::Rejected {
                consecutive_failures,
            }) => sink.emit(&AppEvent::Rejected {
                consecutive_failures,
            }),
            Some(EntryOutcome::TimedOut) => sink.emit(&AppEvent::EntryTimedOut),
            None => {
                if new_state == LockingState::EnteringPassword
                    && prev_state == new_state
                    && self.ctx.password_index > prev_index
                {
                    sink.emit(&AppEvent::EntryProgress {
                        index: self.ctx.password_index,
                    });
                }
            }
        }

        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot.  Never includes the password or the
    /// digits entered so far.
    pub fn build_status(&self) -> LockStatus {
        let armed_timers = TimerId::ALL
            .iter()
            .filter(|t| self.ctx.feedback.is_armed(**t))
            .count() as u8;
        LockStatus {
            state: self.fsm.current_state(),
            password_index: self.ctx.password_index,
            max_digits: self.ctx.config.max_digits,
            consecutive_failures: self.ctx.consecutive_failures,
            armed_timers,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> LockingState {
        self.fsm.current_state()
    }

    pub fn password_index(&self) -> u8 {
        self.ctx.password_index
    }

    pub fn unlock_value(&self) -> u16 {
        self.ctx.unlock_value
    }

    /// Digit currently under edit.
    pub fn digit(&self) -> u8 {
        self.ctx.digit
    }

    pub fn consecutive_failures(&self) -> u8 {
        self.ctx.consecutive_failures
    }

    /// Total events handled since construction.
    pub fn events_handled(&self) -> u64 {
        self.events_handled
    }

    pub fn config(&self) -> &LockConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM commands into port calls, in the order produced.
    fn apply(&mut self, panel: &mut impl PanelPort, timers: &mut impl TimerPort) {
        for cmd in self.ctx.take_commands() {
            debug!("apply {:?}", cmd);
            match cmd {
                Command::Io(IoCommand::SetLed { led, on }) => panel.set_led(led, on),
                Command::Io(IoCommand::Show(content)) => panel.show(content),
                Command::Io(IoCommand::Buzz(pattern)) => panel.buzz(pattern),
                Command::Timer(TimerCommand::Arm {
                    timer,
                    period_ms,
                    mode,
                }) => timers.arm(timer, period_ms, mode),
                Command::Timer(TimerCommand::Disarm(timer)) => timers.disarm(timer),
            }
        }
    }
}
