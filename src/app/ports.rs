//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LockService (domain)
//! ```
//!
//! Driven adapters (panel outputs, encoder, timer service, event sinks)
//! implement these traits.  The [`LockService`](super::service::LockService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Ports are infallible to the caller.  An adapter that hits a pin error
//! logs it and carries on.

use crate::fsm::context::{BuzzerPattern, DisplayContent, Led};
use crate::timers::{TimerId, TimerMode};

// ───────────────────────────────────────────────────────────────
// Panel port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive LEDs, the
/// seven-segment display and the buzzer.
pub trait PanelPort {
    /// Switch a single indicator LED.
    fn set_led(&mut self, led: Led, on: bool);

    /// Update the seven-segment display.
    fn show(&mut self, content: DisplayContent);

    /// Start a buzzer pattern.  Must not block.
    fn buzz(&mut self, pattern: BuzzerPattern);

    /// LEDs off, display blank, buzzer silent.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Encoder port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the rotary encoder.
pub trait EncoderPort {
    /// Signed steps since the previous read.  Reading consumes them.
    fn read_delta(&mut self) -> i16;
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: domain → timer service)
// ───────────────────────────────────────────────────────────────

/// Arms and cancels the four panel timers.
///
/// Arming an armed timer restarts it.  After `disarm` returns the timer
/// must not deliver its event.
pub trait TimerPort {
    fn arm(&mut self, timer: TimerId, period_ms: u32, mode: TimerMode);
    fn disarm(&mut self, timer: TimerId);

    /// Whether `timer` is counting down.  A one-shot that has fired reads
    /// `false` until it is armed again.
    fn is_armed(&self, timer: TimerId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Timer delegate (decouples timer service from event queue)
// ───────────────────────────────────────────────────────────────

/// Callback trait that a timer service invokes when a timer fires.
///
/// The process implements this by posting [`TimerId::event`] to its
/// queue, but the timer service itself knows nothing about events.
pub trait TimerDelegate {
    fn on_timer_fired(&mut self, timer: TimerId);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
