//! Integration tests for LockProcess with the software timer service.
//!
//! Here time is simulated: `advance` lets the soft timers fire and the
//! resulting events flow through the queue into the service.

use crate::mock_hw::{MockPanel, PanelCall, RecordingSink};

use encoderlock::app::events::AppEvent;
use encoderlock::app::ports::TimerPort;
use encoderlock::config::LockConfig;
use encoderlock::events::{EVENT_QUEUE_CAP, Event};
use encoderlock::fsm::LockingState;
use encoderlock::fsm::context::{BuzzerPattern, Led};
use encoderlock::process::LockProcess;
use encoderlock::timers::{SoftTimers, TimerId};

type Proc = LockProcess<MockPanel, SoftTimers, RecordingSink>;

fn make_process() -> Proc {
    let mut process = LockProcess::with_sink(
        MockPanel::new(),
        SoftTimers::new(),
        LockConfig::default(),
        RecordingSink::new(),
    )
    .expect("default config is valid");
    process.init();
    process
}

#[test]
fn process_rejects_password_longer_than_digit_count() {
    let config = LockConfig {
        max_digits: 1,
        ..LockConfig::default()
    };
    let result = LockProcess::with_sink(
        MockPanel::new(),
        SoftTimers::new(),
        config,
        RecordingSink::new(),
    );
    assert!(result.is_err());
}

fn send(process: &mut Proc, event: Event) {
    assert!(process.post(event));
    process.run_pending();
}

fn turn(process: &mut Proc, steps: i16) {
    process.devices_mut().pending_delta = steps;
    send(process, Event::EncoderTurn);
}

fn enter_code(process: &mut Proc, digits: &[u8]) {
    send(process, Event::P46Pressed);
    for d in digits {
        turn(process, i16::from(*d));
        send(process, Event::P46Pressed);
    }
}

#[test]
fn init_arms_refresh_timer() {
    let process = make_process();
    assert!(process.timers().is_armed(TimerId::UiGeneral));
    assert_eq!(process.service().state(), LockingState::Idle);
}

#[test]
fn entry_times_out_after_inactivity() {
    let mut process = make_process();
    send(&mut process, Event::P46Pressed);

    process.advance(9_999);
    assert_eq!(process.service().state(), LockingState::EnteringPassword);

    process.advance(1);
    assert_eq!(process.service().state(), LockingState::Idle);
    assert!(!process.timers().is_armed(TimerId::YellowLedBlink));
    assert!(process.timers().is_armed(TimerId::UiGeneral));
    assert!(
        process
            .sink()
            .events
            .contains(&AppEvent::EntryTimedOut)
    );
}

#[test]
fn activity_keeps_entry_alive() {
    let mut process = make_process();
    send(&mut process, Event::P46Pressed);
    for _ in 0..4 {
        process.advance(5_000);
        turn(&mut process, 1);
    }
    assert_eq!(process.service().state(), LockingState::EnteringPassword);
    assert_eq!(process.service().digit(), 4);
}

#[test]
fn yellow_blinks_at_configured_rate() {
    let mut process = make_process();
    send(&mut process, Event::P46Pressed);
    process.devices_mut().calls.clear();

    process.advance(1_000);
    assert_eq!(process.devices().led_writes(Led::Yellow), 4);
}

#[test]
fn locked_heartbeat_runs_on_soft_timers() {
    let mut process = make_process();
    enter_code(&mut process, &[1, 2, 3, 5]);
    assert_eq!(process.service().state(), LockingState::Locked);
    assert_eq!(process.devices().buzz_count(BuzzerPattern::DoublePulse), 1);
    process.devices_mut().calls.clear();

    let handled = process.advance(2_000);
    assert_eq!(process.devices().led_writes(Led::Red), 4);
    assert_eq!(process.devices().led_writes(Led::Blue), 4);
    // four heartbeats plus two refreshes
    assert_eq!(handled, 6);
}

#[test]
fn unlock_and_relock_through_queue() {
    let mut process = make_process();
    enter_code(&mut process, &[1, 2, 3, 4]);
    assert_eq!(process.service().state(), LockingState::Unlocked);

    process.advance(3_000);
    assert_eq!(process.service().state(), LockingState::Unlocked);
    assert!(!process.timers().is_armed(TimerId::LedBlink));

    send(&mut process, Event::P70Pressed);
    assert_eq!(process.service().state(), LockingState::Locked);
    assert!(process.timers().is_armed(TimerId::LedBlink));
}

#[test]
fn queue_preserves_order() {
    let mut process = make_process();
    process.devices_mut().pending_delta = 0;
    for event in [
        Event::P46Pressed,
        Event::P46Released,
        Event::P70Pressed,
        Event::P70Released,
        Event::P70Pressed,
    ] {
        assert!(process.post(event));
    }
    assert_eq!(process.run_pending(), 5);
    // Default P70 action is DigitUp, applied twice after entry began.
    assert_eq!(process.service().digit(), 2);
}

#[test]
fn full_queue_drops_new_events() {
    let mut process = make_process();
    for _ in 0..EVENT_QUEUE_CAP {
        assert!(process.post(Event::None));
    }
    assert!(!process.post(Event::P46Pressed));
    assert_eq!(process.run_pending(), EVENT_QUEUE_CAP);
    assert_eq!(process.service().state(), LockingState::Idle);
}

#[test]
fn deinit_stops_everything() {
    let mut process = make_process();
    send(&mut process, Event::P46Pressed);
    process.post(Event::P46Pressed);

    process.deinit();

    assert_eq!(process.timers().armed_count(), 0);
    assert_eq!(process.run_pending(), 0);
    assert_eq!(process.devices().calls.last(), Some(&PanelCall::AllOff));
    assert_eq!(process.advance(60_000), 0);
}
