//! Discrete indicator LED on a GPIO pin.
//!
//! The pin can be wired active-high (default) or active-low.  The logical
//! level is only updated after the pin write succeeds, so [`is_on`]
//! always reflects what the hardware was last told.
//!
//! [`is_on`]: IndicatorLed::is_on

use embedded_hal::digital::OutputPin;

use crate::error::{IoFault, Result};

pub struct IndicatorLed<P> {
    pin: P,
    /// If true, LED on = pin LOW
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> IndicatorLed<P> {
    /// Take ownership of `pin` and drive the LED off.
    pub fn new(pin: P, active_low: bool) -> Result<Self> {
        let mut led = Self {
            pin,
            active_low,
            on: true,
        };
        led.set(false)?;
        Ok(led)
    }

    pub fn new_active_high(pin: P) -> Result<Self> {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Result<Self> {
        Self::new(pin, true)
    }

    pub fn set(&mut self, on: bool) -> Result<()> {
        let result = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| IoFault::PinWrite)?;
        self.on = on;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<()> {
        self.set(!self.on)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}
