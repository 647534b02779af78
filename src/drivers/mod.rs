//! Device IO drivers over `embedded-hal` pins.

pub mod buzzer;
pub mod encoder;
pub mod led;
pub mod seven_segment;
