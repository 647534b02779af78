//! Adapters — concrete implementations of the port traits.

pub mod console;
pub mod hardware;
pub mod log_sink;
