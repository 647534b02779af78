//! EncoderLock panel library.
//!
//! Rotary-encoder password lock with LED, seven-segment and buzzer
//! feedback.  The lock logic (`fsm`, `feedback`, `app`) is pure and
//! driven through port traits; `drivers` and `adapters` connect it to
//! `embedded-hal` pins or to the host simulator.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod feedback;
pub mod fsm;
pub mod process;
pub mod shared;
pub mod timers;
