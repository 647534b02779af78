//! Fuzz target: arbitrary event streams through a `LockProcess`
//!
//! Decodes the input as a script of events, encoder turns and elapsed
//! time, runs it against a process on software timers, and checks:
//! - No panics under arbitrary byte inputs
//! - `password_index < max_digits` after every step
//! - The digit under edit stays within 0–9
//! - Teardown leaves no timer armed
//!
//! cargo fuzz run fuzz_event_stream

#![no_main]

use libfuzzer_sys::fuzz_target;

use encoderlock::app::events::AppEvent;
use encoderlock::app::ports::{EncoderPort, EventSink, PanelPort};
use encoderlock::config::LockConfig;
use encoderlock::events::Event;
use encoderlock::fsm::context::{BuzzerPattern, DisplayContent, Led};
use encoderlock::process::LockProcess;
use encoderlock::timers::SoftTimers;

/// Panel whose encoder returns whatever the script last loaded.
#[derive(Default)]
struct ScriptPanel {
    steps: i16,
}

impl PanelPort for ScriptPanel {
    fn set_led(&mut self, _led: Led, _on: bool) {}
    fn show(&mut self, _content: DisplayContent) {}
    fn buzz(&mut self, _pattern: BuzzerPattern) {}
    fn all_off(&mut self) {}
}

impl EncoderPort for ScriptPanel {
    fn read_delta(&mut self) -> i16 {
        core::mem::take(&mut self.steps)
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, event: &AppEvent) {
        assert!(
            !matches!(event, AppEvent::InvariantReset(_)),
            "state machine broke its own invariants: {event:?}"
        );
    }
}

fuzz_target!(|data: &[u8]| {
    let [head, lo, hi, script @ ..] = data else {
        return;
    };

    let max_digits = 1 + *head % 4;
    let limit = 10u16.pow(u32::from(max_digits));
    let config = LockConfig {
        max_digits,
        password: u16::from_le_bytes([*lo, *hi]) % limit,
        encoder_steps_per_digit: 1 + (*head >> 4) % 4,
        ..LockConfig::default()
    };

    let mut process =
        LockProcess::with_sink(ScriptPanel::default(), SoftTimers::new(), config, NullSink)
            .expect("generated config is valid");
    process.init();

    let mut bytes = script.iter().copied();
    while let Some(op) = bytes.next() {
        match op {
            // Elapsed time, in 10 ms units.
            0xF0..=0xFF => {
                let ms = u32::from(bytes.next().unwrap_or(0)) * 10;
                process.advance(ms);
            }
            // Encoder turn with a signed step count.
            0xE0..=0xEF => {
                process.devices_mut().steps = i16::from(bytes.next().unwrap_or(0) as i8);
                process.post(Event::EncoderTurn);
                process.run_pending();
            }
            _ => {
                let event = Event::from_u8(op % Event::COUNT as u8).unwrap_or(Event::None);
                process.post(event);
                process.run_pending();
            }
        }

        let svc = process.service();
        assert!(svc.password_index() < max_digits);
        assert!(svc.digit() <= 9);
    }

    process.deinit();
    assert_eq!(process.timers().armed_count(), 0);
});
