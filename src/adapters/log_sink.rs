//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (serial console on the panel, stderr in the
//! simulator).  A telemetry or host-link adapter would implement the same
//! trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::EntryProgress { index } => {
                info!("ENTRY | digit {} committed", index);
            }
            AppEvent::Accepted => {
                info!("ENTRY | accepted");
            }
            AppEvent::Rejected {
                consecutive_failures,
            } => {
                warn!("ENTRY | rejected, consecutive_failures={}", consecutive_failures);
            }
            AppEvent::EntryTimedOut => {
                info!("ENTRY | timed out");
            }
            AppEvent::InvariantReset(what) => {
                error!("RESET | {}", what);
            }
            AppEvent::Stopped => {
                info!("STOP");
            }
        }
    }
}
