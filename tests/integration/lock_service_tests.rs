//! Integration tests for the LockService → FSM → ports pipeline.
//!
//! Timers are fired by hand through `MockTimers`, so every test controls
//! exactly which timer events reach the service.

use crate::mock_hw::{MockPanel, MockTimers, PanelCall, RecordingSink, TimerCall};

use encoderlock::app::events::AppEvent;
use encoderlock::app::ports::TimerPort;
use encoderlock::app::service::LockService;
use encoderlock::config::{AuxAction, LockConfig};
use encoderlock::error::ConfigError;
use encoderlock::events::Event;
use encoderlock::fsm::LockingState;
use encoderlock::fsm::context::{BuzzerPattern, DisplayContent, Glyph, Led};
use encoderlock::timers::{TimerId, TimerMode};

struct Rig {
    svc: LockService,
    hw: MockPanel,
    timers: MockTimers,
    sink: RecordingSink,
}

impl Rig {
    fn with_config(config: LockConfig) -> Self {
        let mut rig = Self {
            svc: LockService::new(config).expect("valid config"),
            hw: MockPanel::new(),
            timers: MockTimers::new(),
            sink: RecordingSink::new(),
        };
        rig.svc.init(&mut rig.hw, &mut rig.timers, &mut rig.sink);
        rig
    }

    fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    fn send(&mut self, event: Event) {
        self.svc
            .handle_event(event, &mut self.hw, &mut self.timers, &mut self.sink);
    }

    fn turn(&mut self, steps: i16) {
        self.hw.pending_delta = steps;
        self.send(Event::EncoderTurn);
    }

    fn code(&mut self, digits: &[u8]) {
        self.send(Event::P46Pressed);
        for d in digits {
            self.turn(i16::from(*d));
            self.send(Event::P46Pressed);
        }
    }

    fn fire(&mut self, timer: TimerId) {
        self.timers.fire(timer);
        self.send(timer.event());
    }

    fn clear_history(&mut self) {
        self.hw.calls.clear();
        self.timers.calls.clear();
        self.sink.events.clear();
    }
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn init_puts_record_in_idle_and_arms_refresh() {
    let rig = Rig::new();
    assert_eq!(rig.svc.state(), LockingState::Idle);
    assert_eq!(rig.svc.password_index(), 0);
    assert_eq!(rig.svc.unlock_value(), 0);
    assert!(rig.timers.is_armed(TimerId::UiGeneral));
    assert!(rig.timers.calls.contains(&TimerCall::Arm {
        timer: TimerId::UiGeneral,
        period_ms: 1000,
        mode: TimerMode::OneShot,
    }));
    assert_eq!(rig.sink.events, vec![AppEvent::Started(LockingState::Idle)]);
    assert_eq!(rig.hw.shown(), Some(DisplayContent::Glyph(Glyph::Dash)));
}

#[test]
fn deinit_disarms_all_timers_and_drives_outputs_off() {
    let mut rig = Rig::new();
    rig.code(&[1, 2]);
    rig.clear_history();

    rig.svc.deinit(&mut rig.hw, &mut rig.timers, &mut rig.sink);

    for timer in TimerId::ALL {
        assert!(rig.timers.disarmed(timer), "{} not disarmed", timer.name());
        assert!(!rig.timers.is_armed(timer));
    }
    assert_eq!(rig.hw.calls.last(), Some(&PanelCall::AllOff));
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Stopped));
    assert_eq!(rig.svc.state(), LockingState::Idle);
    assert_eq!(rig.svc.password_index(), 0);
}

#[test]
fn invalid_config_rejected_at_construction() {
    for max_digits in [0u8, 10] {
        let config = LockConfig {
            max_digits,
            password: 0,
            ..LockConfig::default()
        };
        assert!(
            matches!(
                LockService::new(config),
                Err(ConfigError::ValidationFailed(_))
            ),
            "max_digits={max_digits} accepted"
        );
    }
}

#[test]
fn reinit_after_deinit_starts_fresh() {
    let mut rig = Rig::new();
    rig.code(&[9, 9, 9, 9]);
    assert_eq!(rig.svc.state(), LockingState::Locked);
    rig.svc.deinit(&mut rig.hw, &mut rig.timers, &mut rig.sink);
    rig.svc.init(&mut rig.hw, &mut rig.timers, &mut rig.sink);

    assert_eq!(rig.svc.state(), LockingState::Idle);
    assert_eq!(rig.svc.consecutive_failures(), 0);
    assert!(rig.timers.is_armed(TimerId::UiGeneral));
}

// ── Password entry ────────────────────────────────────────────

#[test]
fn correct_unlock() {
    let mut rig = Rig::new();
    rig.code(&[1, 2, 3, 4]);

    assert_eq!(rig.svc.state(), LockingState::Unlocked);
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::Short), 1);
    assert!(rig.hw.led(Led::Blue));
    assert!(!rig.hw.led(Led::Yellow));
    assert_eq!(rig.hw.shown(), Some(DisplayContent::Glyph(Glyph::Unlocked)));
    assert_eq!(rig.sink.count(&AppEvent::Accepted), 1);
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: LockingState::EnteringPassword,
        to: LockingState::Unlocked,
    }));
    assert!(!rig.timers.is_armed(TimerId::UiTimeout));
    assert!(!rig.timers.is_armed(TimerId::YellowLedBlink));
}

#[test]
fn incorrect_unlock_double_pulses_once() {
    let mut rig = Rig::new();
    rig.code(&[1, 2, 3, 5]);

    assert_eq!(rig.svc.state(), LockingState::Locked);
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::DoublePulse), 1);
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::Short), 0);
    assert!(rig.timers.is_armed(TimerId::LedBlink));
    assert_eq!(
        rig.sink.count(&AppEvent::Rejected {
            consecutive_failures: 1
        }),
        1
    );
}

#[test]
fn entry_progress_reported_per_digit() {
    let mut rig = Rig::new();
    rig.code(&[5, 5, 5]);
    let progress: Vec<u8> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::EntryProgress { index } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![1, 2, 3]);
}

#[test]
fn entry_timeout_returns_to_idle() {
    let mut rig = Rig::new();
    rig.send(Event::P46Pressed);
    rig.turn(5);
    rig.send(Event::P46Pressed);
    assert_eq!(rig.svc.password_index(), 1);

    rig.fire(TimerId::UiTimeout);

    assert_eq!(rig.svc.state(), LockingState::Idle);
    assert_eq!(rig.svc.unlock_value(), 0);
    assert_eq!(rig.svc.password_index(), 0);
    assert!(!rig.timers.is_armed(TimerId::YellowLedBlink));
    assert!(!rig.hw.led(Led::Yellow));
    assert_eq!(rig.sink.count(&AppEvent::EntryTimedOut), 1);
}

#[test]
fn activity_rearms_entry_timeout() {
    let mut rig = Rig::new();
    rig.send(Event::P46Pressed);
    rig.timers.calls.clear();
    rig.turn(1);
    assert!(rig.timers.calls.contains(&TimerCall::Arm {
        timer: TimerId::UiTimeout,
        period_ms: 10_000,
        mode: TimerMode::OneShot,
    }));
}

#[test]
fn repeated_failures_escalate_to_long_tone() {
    let config = LockConfig {
        escalate_after_failures: 2,
        ..LockConfig::default()
    };
    let mut rig = Rig::with_config(config);

    rig.code(&[0, 0, 0, 0]);
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::DoublePulse), 1);
    rig.code(&[0, 0, 0, 0]);
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::Long), 1);
    assert_eq!(rig.svc.consecutive_failures(), 2);

    rig.code(&[1, 2, 3, 4]);
    assert_eq!(rig.svc.state(), LockingState::Unlocked);
    assert_eq!(rig.svc.consecutive_failures(), 0);
}

#[test]
fn p70_relocks() {
    let mut rig = Rig::new();
    rig.code(&[1, 2, 3, 4]);
    rig.clear_history();

    rig.send(Event::P70Pressed);
    assert_eq!(rig.svc.state(), LockingState::Locked);
    assert!(rig.timers.is_armed(TimerId::LedBlink));
    assert!(rig.hw.led(Led::Red));
    assert_eq!(rig.hw.buzz_count(BuzzerPattern::DoublePulse), 0);
}

#[test]
fn aux_restart_entry() {
    let mut rig = Rig::new();
    rig.send(Event::P46Pressed);
    rig.turn(1);
    rig.send(Event::P46Pressed);
    rig.turn(4);

    rig.send(Event::P71Pressed);
    assert_eq!(rig.svc.state(), LockingState::EnteringPassword);
    assert_eq!(rig.svc.password_index(), 0);
    assert_eq!(rig.svc.digit(), 0);
    assert_eq!(rig.hw.shown(), Some(DisplayContent::Digit(0)));
}

#[test]
fn aux_buttons_can_be_disabled() {
    let mut config = LockConfig::default();
    config.aux.p70 = AuxAction::Ignore;
    config.aux.p71 = AuxAction::Ignore;
    let mut rig = Rig::with_config(config);
    rig.send(Event::P46Pressed);
    rig.turn(3);
    rig.clear_history();

    rig.send(Event::P70Pressed);
    rig.send(Event::P71Pressed);
    assert_eq!(rig.svc.digit(), 3);
    assert!(rig.hw.calls.is_empty());
    assert!(rig.timers.calls.is_empty());
}

// ── Timer-driven feedback ─────────────────────────────────────

#[test]
fn heartbeat_toggles_once_per_firing() {
    let mut rig = Rig::new();
    rig.code(&[9, 9, 9, 9]);
    let initial_red = rig.hw.led(Led::Red);
    rig.clear_history();

    for n in 1..=7usize {
        rig.fire(TimerId::LedBlink);
        assert_eq!(rig.hw.led_writes(Led::Red), n);
        assert_eq!(rig.hw.led(Led::Red), initial_red ^ (n % 2 == 1));
        assert_eq!(rig.hw.led(Led::Blue), !rig.hw.led(Led::Red));
        assert!(rig.timers.is_armed(TimerId::LedBlink));
    }
}

#[test]
fn refresh_redraws_current_mode() {
    let mut rig = Rig::new();
    rig.code(&[9, 9, 9, 9]);
    rig.clear_history();
    rig.fire(TimerId::UiGeneral);
    assert_eq!(rig.hw.shown(), Some(DisplayContent::Glyph(Glyph::Locked)));
    assert!(rig.timers.is_armed(TimerId::UiGeneral));
}

// ── Ignored input ─────────────────────────────────────────────

#[test]
fn spurious_encoder_ignored_outside_entry() {
    for code in [&[][..], &[1, 2, 3, 4][..], &[9, 9, 9, 9][..]] {
        let mut rig = Rig::new();
        if !code.is_empty() {
            rig.code(code);
        }
        let state = rig.svc.state();
        assert_ne!(state, LockingState::EnteringPassword);
        rig.clear_history();
        let reads = rig.hw.encoder_reads;

        rig.turn(3);

        assert_eq!(rig.svc.state(), state);
        assert_eq!(rig.svc.digit(), 0);
        assert!(rig.hw.calls.is_empty(), "{state}: panel touched");
        assert!(rig.timers.calls.is_empty(), "{state}: timers touched");
        assert_eq!(rig.hw.encoder_reads, reads, "{state}: encoder read");
    }
}

#[test]
fn turns_before_entry_do_not_count() {
    let mut rig = Rig::new();
    rig.hw.pending_delta = 6;
    rig.send(Event::P46Pressed);
    assert_eq!(rig.svc.digit(), 0);
    rig.turn(2);
    assert_eq!(rig.svc.digit(), 2);
}

#[test]
fn release_events_change_nothing() {
    let mut rig = Rig::new();
    rig.send(Event::P46Pressed);
    rig.turn(7);
    rig.clear_history();
    let before = (rig.svc.state(), rig.svc.password_index(), rig.svc.digit());

    for event in [Event::P46Released, Event::P70Released, Event::P71Released, Event::None] {
        rig.send(event);
    }

    assert_eq!(
        (rig.svc.state(), rig.svc.password_index(), rig.svc.digit()),
        before
    );
    assert!(rig.hw.calls.is_empty());
    assert!(rig.timers.calls.is_empty());
    assert!(rig.sink.events.is_empty());
}

#[test]
fn stale_timeout_after_unlock_is_ignored() {
    let mut rig = Rig::new();
    rig.code(&[1, 2, 3, 4]);
    rig.clear_history();
    rig.send(Event::UiUpdate);
    assert_eq!(rig.svc.state(), LockingState::Unlocked);
    assert!(rig.hw.calls.is_empty());
}

#[test]
fn timeout_fired_before_activity_does_not_abort_entry() {
    let mut rig = Rig::new();
    rig.send(Event::P46Pressed);

    // The timeout expires, but a turn is handled before its event.
    rig.timers.fire(TimerId::UiTimeout);
    rig.turn(3);
    rig.send(Event::UiUpdate);

    assert_eq!(rig.svc.state(), LockingState::EnteringPassword);
    assert_eq!(rig.svc.digit(), 3);
    assert!(rig.timers.is_armed(TimerId::UiTimeout));
    assert_eq!(rig.sink.count(&AppEvent::EntryTimedOut), 0);

    // The re-armed countdown still ends the entry.
    rig.fire(TimerId::UiTimeout);
    assert_eq!(rig.svc.state(), LockingState::Idle);
    assert!(!rig.timers.is_armed(TimerId::UiTimeout));
    assert!(!rig.timers.is_armed(TimerId::YellowLedBlink));
    assert!(rig.timers.is_armed(TimerId::UiGeneral));
    assert_eq!(rig.svc.build_status().armed_timers, 1);
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn status_and_events_never_carry_the_password() {
    let config = LockConfig {
        password: 4711,
        ..LockConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.code(&[4, 7, 1, 1]);
    assert_eq!(rig.svc.state(), LockingState::Unlocked);

    let status = rig.svc.build_status();
    assert_eq!(status.state, LockingState::Unlocked);
    assert_eq!(status.max_digits, 4);
    assert!(!format!("{status:?}").contains("4711"));
    for event in &rig.sink.events {
        assert!(!format!("{event:?}").contains("4711"));
    }
}
