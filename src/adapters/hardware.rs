//! Hardware adapter — bridges the panel devices to domain port traits.
//!
//! Owns the six device handles (three LEDs, the seven-segment display,
//! the encoder and the buzzer), exposing them through [`PanelPort`] and
//! [`EncoderPort`].  This is the only module in the system that touches
//! actual pins.
//!
//! Output failures are fire-and-forget: they are logged and counted, and
//! the lock logic carries on.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{EncoderPort, PanelPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::encoder::QuadratureEncoder;
use crate::drivers::led::IndicatorLed;
use crate::drivers::seven_segment::{SegmentBus, SevenSegment};
use crate::error::Result;
use crate::fsm::context::{BuzzerPattern, DisplayContent, Led};

/// Concrete adapter that combines all panel hardware behind port traits.
pub struct PanelHardware<L, S, A, B, Z> {
    leds: [IndicatorLed<L>; Led::COUNT],
    display: SevenSegment<S>,
    encoder: QuadratureEncoder<A, B>,
    buzzer: Buzzer<Z>,
    now_ms: u32,
    io_faults: u32,
}

impl<L, S, A, B, Z> PanelHardware<L, S, A, B, Z>
where
    L: OutputPin,
    S: SegmentBus,
    A: InputPin,
    B: InputPin,
    Z: OutputPin,
{
    /// `leds` in [`Led`] order: red, blue, yellow.
    pub fn new(
        leds: [IndicatorLed<L>; Led::COUNT],
        display: SevenSegment<S>,
        encoder: QuadratureEncoder<A, B>,
        buzzer: Buzzer<Z>,
    ) -> Self {
        Self {
            leds,
            display,
            encoder,
            buzzer,
            now_ms: 0,
            io_faults: 0,
        }
    }

    /// Call from the main loop.  Samples the encoder and advances the
    /// buzzer.  Returns `true` when the encoder moved, so the caller can
    /// post `EncoderTurn`.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        self.now_ms = now_ms;
        let tick = self.buzzer.tick(now_ms);
        self.record("buzzer tick", tick);
        match self.encoder.poll() {
            Ok(step) => step != 0,
            Err(e) => {
                self.record::<i8>("encoder poll", Err(e));
                false
            }
        }
    }

    /// IO failures since construction.
    pub fn io_faults(&self) -> u32 {
        self.io_faults
    }

    pub fn led_is_on(&self, led: Led) -> bool {
        self.leds[led as usize].is_on()
    }

    pub fn display(&self) -> DisplayContent {
        self.display.current()
    }

    pub fn buzzer_active(&self) -> bool {
        self.buzzer.is_active()
    }

    fn record<T>(&mut self, what: &str, result: Result<T>) {
        if let Err(e) = result {
            self.io_faults = self.io_faults.saturating_add(1);
            warn!("{what} failed: {e}");
        }
    }
}

// ── PanelPort implementation ──────────────────────────────────

impl<L, S, A, B, Z> PanelPort for PanelHardware<L, S, A, B, Z>
where
    L: OutputPin,
    S: SegmentBus,
    A: InputPin,
    B: InputPin,
    Z: OutputPin,
{
    fn set_led(&mut self, led: Led, on: bool) {
        let result = self.leds[led as usize].set(on);
        self.record("led write", result);
    }

    fn show(&mut self, content: DisplayContent) {
        let result = self.display.show(content);
        self.record("display write", result);
    }

    fn buzz(&mut self, pattern: BuzzerPattern) {
        let result = self.buzzer.start(pattern, self.now_ms);
        self.record("buzzer start", result);
    }

    fn all_off(&mut self) {
        for led in Led::ALL {
            self.set_led(led, false);
        }
        self.show(DisplayContent::Blank);
        let result = self.buzzer.stop();
        self.record("buzzer stop", result);
    }
}

// ── EncoderPort implementation ────────────────────────────────

impl<L, S, A, B, Z> EncoderPort for PanelHardware<L, S, A, B, Z>
where
    L: OutputPin,
    S: SegmentBus,
    A: InputPin,
    B: InputPin,
    Z: OutputPin,
{
    fn read_delta(&mut self) -> i16 {
        self.encoder.take_delta()
    }
}
