//! Single-digit seven-segment display.
//!
//! Segment byte layout, one bit per segment:
//!
//! ```text
//!    ─a─        bit 0 = a   bit 4 = e
//!   f   b       bit 1 = b   bit 5 = f
//!    ─g─        bit 2 = c   bit 6 = g
//!   e   c       bit 3 = d   bit 7 = dp
//!    ─d─  .dp
//! ```

use embedded_hal::digital::OutputPin;

use crate::error::{IoFault, Result};
use crate::fsm::context::{DisplayContent, Glyph};

pub const SEG_A: u8 = 1 << 0;
pub const SEG_B: u8 = 1 << 1;
pub const SEG_C: u8 = 1 << 2;
pub const SEG_D: u8 = 1 << 3;
pub const SEG_E: u8 = 1 << 4;
pub const SEG_F: u8 = 1 << 5;
pub const SEG_G: u8 = 1 << 6;
pub const SEG_DP: u8 = 1 << 7;

const DIGITS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,         // 0
    SEG_B | SEG_C,                                         // 1
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,                 // 2
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,                 // 3
    SEG_B | SEG_C | SEG_F | SEG_G,                         // 4
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,                 // 5
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,         // 6
    SEG_A | SEG_B | SEG_C,                                 // 7
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G, // 8
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,         // 9
];

/// Segment pattern for `content`.  Out-of-range digits render blank.
pub fn glyph_segments(content: DisplayContent) -> u8 {
    match content {
        DisplayContent::Blank => 0,
        DisplayContent::Digit(d) => DIGITS.get(usize::from(d)).copied().unwrap_or(0),
        DisplayContent::Glyph(Glyph::Dash) => SEG_G,
        DisplayContent::Glyph(Glyph::Locked) => SEG_D | SEG_E | SEG_F,
        DisplayContent::Glyph(Glyph::Unlocked) => SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    }
}

/// Anything that can latch a segment byte: eight GPIOs, a shift register,
/// an I/O expander.
pub trait SegmentBus {
    fn write_segments(&mut self, segments: u8) -> Result<()>;
}

/// Eight GPIOs, one per segment, in bit order a..g, dp.
pub struct PinSegmentBus<P> {
    pins: [P; 8],
    /// Common-anode displays light a segment by pulling it low.
    common_anode: bool,
}

impl<P: OutputPin> PinSegmentBus<P> {
    pub fn new(pins: [P; 8], common_anode: bool) -> Self {
        Self { pins, common_anode }
    }
}

impl<P: OutputPin> SegmentBus for PinSegmentBus<P> {
    fn write_segments(&mut self, segments: u8) -> Result<()> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let lit = segments & (1 << bit) != 0;
            let result = if lit != self.common_anode {
                pin.set_high()
            } else {
                pin.set_low()
            };
            result.map_err(|_| IoFault::PinWrite)?;
        }
        Ok(())
    }
}

/// Display driver remembering what it last showed.
pub struct SevenSegment<B> {
    bus: B,
    current: DisplayContent,
}

impl<B: SegmentBus> SevenSegment<B> {
    /// Take the bus and blank the display.
    pub fn new(bus: B) -> Result<Self> {
        let mut display = Self {
            bus,
            current: DisplayContent::Blank,
        };
        display.bus.write_segments(0)?;
        Ok(display)
    }

    pub fn show(&mut self, content: DisplayContent) -> Result<()> {
        self.bus.write_segments(glyph_segments(content))?;
        self.current = content;
        Ok(())
    }

    pub fn current(&self) -> DisplayContent {
        self.current
    }
}
