//! Polled quadrature rotary encoder.
//!
//! Channels A and B are sampled on every [`poll`](QuadratureEncoder::poll)
//! and decoded with a Gray-code transition table.  Each valid transition
//! is one quarter-step; a transition where both channels changed at once
//! is contact bounce or a missed sample and counts as zero.
//!
//! Steps accumulate until [`take_delta`](QuadratureEncoder::take_delta)
//! hands them to the lock logic.  How many steps make one digit is a
//! configuration matter, not the driver's.

use embedded_hal::digital::InputPin;

use crate::error::{IoFault, Result};

/// Indexed by `(previous << 2) | current`, where a state is `(A << 1) | B`.
/// Clockwise runs 00 → 01 → 11 → 10 → 00.
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0, //
];

pub struct QuadratureEncoder<A, B> {
    a: A,
    b: B,
    state: u8,
    pending: i16,
}

impl<A: InputPin, B: InputPin> QuadratureEncoder<A, B> {
    /// Take both channels and latch their current levels.
    pub fn new(a: A, b: B) -> Result<Self> {
        let mut encoder = Self {
            a,
            b,
            state: 0,
            pending: 0,
        };
        encoder.state = encoder.sample()?;
        Ok(encoder)
    }

    /// Sample both channels.  Returns the step just decoded (-1, 0 or +1).
    pub fn poll(&mut self) -> Result<i8> {
        let current = self.sample()?;
        let step = TRANSITIONS[usize::from((self.state << 2) | current)];
        self.state = current;
        self.pending = self.pending.saturating_add(i16::from(step));
        Ok(step)
    }

    /// Steps since the previous call.
    pub fn take_delta(&mut self) -> i16 {
        core::mem::take(&mut self.pending)
    }

    fn sample(&mut self) -> Result<u8> {
        let a = self.a.is_high().map_err(|_| IoFault::PinRead)?;
        let b = self.b.is_high().map_err(|_| IoFault::PinRead)?;
        Ok((u8::from(a) << 1) | u8::from(b))
    }
}
