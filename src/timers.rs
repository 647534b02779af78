//! Panel timer identities and the software timer service.
//!
//! The lock state machine never sleeps.  It issues arm/disarm commands
//! as data, and whichever timer service is plugged into the
//! [`TimerPort`] turns them into future events.  On the panel that is
//! the process framework; on the host it is [`SoftTimers`].
//!
//! ```text
//!  LockService ──arm/disarm──▶ TimerPort ──fired──▶ TimerDelegate
//!                                                     │
//!                                                     ▼
//!                                                EventQueue
//! ```

use crate::app::ports::{TimerDelegate, TimerPort};
use crate::events::Event;
use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Timer types
// ═══════════════════════════════════════════════════════════════

/// The four independent panel timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerId {
    /// General UI refresh (timerUIGeneral).
    UiGeneral = 0,
    /// Red/blue heartbeat blink (timerLedBlink).
    LedBlink = 1,
    /// Yellow entry-indicator blink (timerYellowLedBlink).
    YellowLedBlink = 2,
    /// Entry inactivity timeout (timerUI).
    UiTimeout = 3,
}

impl TimerId {
    pub const COUNT: usize = 4;

    pub const ALL: [TimerId; TimerId::COUNT] = [
        TimerId::UiGeneral,
        TimerId::LedBlink,
        TimerId::YellowLedBlink,
        TimerId::UiTimeout,
    ];

    /// Event delivered when this timer fires.
    pub fn event(self) -> Event {
        match self {
            TimerId::UiGeneral => Event::UiRefresh,
            TimerId::LedBlink => Event::LedsBlink,
            TimerId::YellowLedBlink => Event::YellowLedsBlink,
            TimerId::UiTimeout => Event::UiUpdate,
        }
    }

    /// Timer that delivers `event`, if it is a timer event.
    pub fn for_event(event: Event) -> Option<TimerId> {
        TimerId::ALL.into_iter().find(|t| t.event() == event)
    }

    pub fn name(self) -> &'static str {
        match self {
            TimerId::UiGeneral => "ui-general",
            TimerId::LedBlink => "led-blink",
            TimerId::YellowLedBlink => "yellow-led-blink",
            TimerId::UiTimeout => "ui-timeout",
        }
    }
}

/// Whether a timer reloads after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Fire once, then disarm.
    OneShot,
    /// Fire every period until disarmed.
    Repeating,
}

// ═══════════════════════════════════════════════════════════════
//  Software timer service
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct Slot {
    period_ms: u32,
    remaining_ms: u32,
    mode: TimerMode,
}

/// Tick-driven timer service for host builds and tests.
///
/// One slot per [`TimerId`].  Arming an armed timer restarts it, and
/// disarming takes effect immediately, so a cancelled timer can never
/// fire afterwards.
pub struct SoftTimers {
    slots: [Option<Slot>; TimerId::COUNT],
}

impl SoftTimers {
    pub fn new() -> Self {
        Self {
            slots: [None; TimerId::COUNT],
        }
    }

    /// Milliseconds until `timer` fires, if armed.
    pub fn remaining_ms(&self, timer: TimerId) -> Option<u32> {
        self.slots[timer as usize].map(|s| s.remaining_ms)
    }

    /// Milliseconds until the earliest armed timer fires.
    pub fn next_due_ms(&self) -> Option<u32> {
        self.slots.iter().flatten().map(|s| s.remaining_ms).min()
    }

    /// Number of armed timers.
    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Advance time by `elapsed_ms`.
    ///
    /// Every expiry inside the window is reported to `delegate` in time
    /// order (ties in [`TimerId`] order), so a repeating timer with a short
    /// period fires several times in one call.  Returns the number of
    /// firings.
    pub fn tick(&mut self, elapsed_ms: u32, delegate: &mut dyn TimerDelegate) -> usize {
        let mut budget = elapsed_ms;
        let mut fired = 0;

        loop {
            let next = self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.map(|s| (s.remaining_ms, i)))
                .min();

            let Some((due_in, idx)) = next else {
                break;
            };
            if due_in > budget {
                break;
            }

            budget -= due_in;
            for slot in self.slots.iter_mut().flatten() {
                slot.remaining_ms -= due_in;
            }

            let timer = TimerId::ALL[idx];
            match self.slots[idx].map(|s| s.mode) {
                Some(TimerMode::OneShot) => self.slots[idx] = None,
                Some(TimerMode::Repeating) => {
                    if let Some(slot) = self.slots[idx].as_mut() {
                        slot.remaining_ms = slot.period_ms;
                    }
                }
                None => {}
            }
            debug!("timer {} fired", timer.name());
            delegate.on_timer_fired(timer);
            fired += 1;
        }

        for slot in self.slots.iter_mut().flatten() {
            slot.remaining_ms -= budget;
        }
        fired
    }
}

impl Default for SoftTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerPort for SoftTimers {
    fn arm(&mut self, timer: TimerId, period_ms: u32, mode: TimerMode) {
        // A zero period would fire forever inside one tick.
        let period_ms = period_ms.max(1);
        self.slots[timer as usize] = Some(Slot {
            period_ms,
            remaining_ms: period_ms,
            mode,
        });
    }

    fn disarm(&mut self, timer: TimerId) {
        self.slots[timer as usize] = None;
    }

    fn is_armed(&self, timer: TimerId) -> bool {
        self.slots[timer as usize].is_some()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
