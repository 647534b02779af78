//! Inbound event set and the ordered event queue.
//!
//! Events are produced by:
//! - GPIO edge handlers (P46/P70/P71 press and release, already debounced)
//! - Encoder edge handler (a turn happened; the delta is read on dispatch)
//! - Timer service (the four lock-panel timers)
//!
//! Events are consumed by the process loop, which hands them to the
//! lock service one at a time in delivery order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button edge │────▶│              │     │              │
//! │ Encoder     │────▶│  EventQueue  │────▶│ LockProcess  │
//! │ Timer fire  │────▶│  (FIFO, 32)  │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Lock-panel events.  Discriminants follow the panel firmware's
/// declaration order so raw event bytes decode unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    /// "No event" sentinel.  Always a no-op.
    None = 0,

    // ── Buttons ───────────────────────────────────────────
    /// Main button pressed: start entry / commit digit.
    P46Pressed = 1,
    P46Released = 2,
    /// Auxiliary button pressed: re-lock when unlocked, aux action in entry.
    P70Pressed = 3,
    P70Released = 4,
    /// Second auxiliary button pressed: aux action in entry.
    P71Pressed = 5,
    P71Released = 6,

    // ── Timers ────────────────────────────────────────────
    /// Entry inactivity timeout (timerUI).
    UiUpdate = 7,
    /// Red/blue heartbeat blink (timerLedBlink).
    LedsBlink = 8,
    /// Yellow entry-in-progress blink (timerYellowLedBlink).
    YellowLedsBlink = 9,
    /// Periodic display refresh (timerUIGeneral).
    UiRefresh = 10,

    // ── Encoder ───────────────────────────────────────────
    /// Encoder moved; the delta is read from the encoder on dispatch.
    EncoderTurn = 11,
}

impl Event {
    /// Number of distinct events, sentinel included.
    pub const COUNT: usize = 12;

    /// Every event in discriminant order.
    pub const ALL: [Event; Event::COUNT] = [
        Event::None,
        Event::P46Pressed,
        Event::P46Released,
        Event::P70Pressed,
        Event::P70Released,
        Event::P71Pressed,
        Event::P71Released,
        Event::UiUpdate,
        Event::LedsBlink,
        Event::YellowLedsBlink,
        Event::UiRefresh,
        Event::EncoderTurn,
    ];

    /// Decode a raw event byte.  Unknown values return `None`.
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Button release events are informational only.
    pub fn is_release(self) -> bool {
        matches!(
            self,
            Event::P46Released | Event::P70Released | Event::P71Released
        )
    }

    /// True for events delivered by the timer service.
    pub fn is_timer(self) -> bool {
        matches!(
            self,
            Event::UiUpdate | Event::LedsBlink | Event::YellowLedsBlink | Event::UiRefresh
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::None => "none",
            Event::P46Pressed => "p46-pressed",
            Event::P46Released => "p46-released",
            Event::P70Pressed => "p70-pressed",
            Event::P70Released => "p70-released",
            Event::P71Pressed => "p71-pressed",
            Event::P71Released => "p71-released",
            Event::UiUpdate => "ui-update",
            Event::LedsBlink => "leds-blink",
            Event::YellowLedsBlink => "yellow-leds-blink",
            Event::UiRefresh => "ui-refresh",
            Event::EncoderTurn => "encoder-turn",
        };
        f.write_str(name)
    }
}

/// Raw byte did not name an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEvent(pub u8);

impl fmt::Display for UnknownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event code {}", self.0)
    }
}

impl TryFrom<u8> for Event {
    type Error = UnknownEvent;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Event::from_u8(raw).ok_or(UnknownEvent(raw))
    }
}

// ── Event queue ───────────────────────────────────────────────
//
// Producers may run in interrupt or timer-task context; the single
// consumer is the process loop.  The channel's critical-section mutex
// makes `push` safe from any of them, and `pop` never blocks.

/// Bounded FIFO of pending events.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Push an event.  Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        if self.channel.try_send(event).is_ok() {
            true
        } else {
            log::warn!("event queue full, dropped {}", event);
            false
        }
    }

    /// Pop the oldest pending event, if any.
    pub fn pop(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending events into a callback, in FIFO order.
    /// Events pushed by the callback itself are drained too.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Discard everything pending.
    pub fn clear(&self) {
        self.channel.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
