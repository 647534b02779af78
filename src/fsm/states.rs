//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  Every `on_event` handler matches the whole
//! [`Event`] enum so a new event cannot be silently ignored.
//!
//! ```text
//!          P46                       last digit == password
//!  IDLE ─────────▶ ENTERING_PASSWORD ──────────────────────▶ UNLOCKED
//!    ▲                 │    ▲     │                              │
//!    │   entry timeout │    │     │ last digit != password       │ P70
//!    └─────────────────┘    │     ▼                              │
//!                           └─ LOCKED ◀──────────────────────────┘
//!                        P46
//! ```

use super::context::{DisplayContent, EntryOutcome, Glyph, LockContext};
use super::{LockingState, StateDescriptor};
use crate::config::AuxAction;
use crate::events::Event;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; LockingState::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: LockingState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_event: idle_event,
        },
        // Index 1 — EnteringPassword
        StateDescriptor {
            id: LockingState::EnteringPassword,
            name: "EnteringPassword",
            on_enter: Some(entering_enter),
            on_exit: Some(entering_exit),
            on_event: entering_event,
        },
        // Index 2 — Unlocked
        StateDescriptor {
            id: LockingState::Unlocked,
            name: "Unlocked",
            on_enter: Some(unlocked_enter),
            on_exit: None,
            on_event: unlocked_event,
        },
        // Index 3 — Locked
        StateDescriptor {
            id: LockingState::Locked,
            name: "Locked",
            on_enter: Some(locked_enter),
            on_exit: None,
            on_event: locked_event,
        },
    ]
}

/// What the display shows at rest in `state`.
pub fn display_content(state: LockingState, ctx: &LockContext) -> DisplayContent {
    match state {
        LockingState::Idle => DisplayContent::Glyph(Glyph::Dash),
        LockingState::EnteringPassword => DisplayContent::Digit(ctx.digit),
        LockingState::Unlocked => DisplayContent::Glyph(Glyph::Unlocked),
        LockingState::Locked => DisplayContent::Glyph(Glyph::Locked),
    }
}

fn refresh(ctx: &mut LockContext, state: LockingState) {
    let content = display_content(state, ctx);
    ctx.feedback.ui_refresh(&mut ctx.commands, content);
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut LockContext) {
    ctx.clear_entry();
    let content = display_content(LockingState::Idle, ctx);
    ctx.feedback.quiet(&mut ctx.commands, content);
}

fn idle_event(ctx: &mut LockContext, event: Event) -> Option<LockingState> {
    match event {
        Event::P46Pressed => Some(LockingState::EnteringPassword),
        Event::UiRefresh => {
            refresh(ctx, LockingState::Idle);
            None
        }
        Event::EncoderTurn => {
            debug!("Idle: encoder turn ignored");
            None
        }
        Event::None
        | Event::P46Released
        | Event::P70Pressed
        | Event::P70Released
        | Event::P71Pressed
        | Event::P71Released
        | Event::UiUpdate
        | Event::LedsBlink
        | Event::YellowLedsBlink => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENTERING_PASSWORD state
// ═══════════════════════════════════════════════════════════════════════════

fn entering_enter(ctx: &mut LockContext) {
    ctx.clear_entry();
    ctx.feedback.entry_started(&mut ctx.commands, ctx.digit);
    ctx.feedback.restart_entry_timeout(&mut ctx.commands);
}

fn entering_exit(ctx: &mut LockContext) {
    ctx.feedback.end_entry(&mut ctx.commands);
}

fn entering_event(ctx: &mut LockContext, event: Event) -> Option<LockingState> {
    match event {
        Event::EncoderTurn => {
            apply_turn(ctx);
            None
        }
        Event::P46Pressed => commit_digit(ctx),
        Event::P70Pressed => {
            let action = ctx.config.aux.p70;
            apply_aux(ctx, action);
            None
        }
        Event::P71Pressed => {
            let action = ctx.config.aux.p71;
            apply_aux(ctx, action);
            None
        }
        Event::UiUpdate => {
            info!(
                "Entry timed out at digit {}/{}",
                ctx.password_index + 1,
                ctx.config.max_digits
            );
            ctx.outcome = Some(EntryOutcome::TimedOut);
            Some(LockingState::Idle)
        }
        Event::YellowLedsBlink => {
            ctx.feedback.yellow_toggle(&mut ctx.commands);
            None
        }
        Event::UiRefresh => {
            refresh(ctx, LockingState::EnteringPassword);
            None
        }
        Event::None
        | Event::P46Released
        | Event::P70Released
        | Event::P71Released
        | Event::LedsBlink => None,
    }
}

/// Fold the snapshot's encoder delta into the digit under edit.
fn apply_turn(ctx: &mut LockContext) {
    let scale = i32::from(ctx.config.encoder_steps_per_digit.max(1));
    let steps = i32::from(ctx.encoder_residual) + i32::from(ctx.input.encoder_delta);

    // Truncation keeps the residual's sign, so reversing direction
    // cancels pending steps first.
    let whole = steps / scale;
    ctx.encoder_residual = (steps % scale) as i16;

    if whole != 0 {
        let digit = (i32::from(ctx.digit) + whole).rem_euclid(10);
        ctx.digit = digit as u8;
    }

    ctx.feedback.entry_progress(&mut ctx.commands, ctx.digit);
    ctx.feedback.restart_entry_timeout(&mut ctx.commands);
}

/// Commit the digit under edit; on the last position, compare.
fn commit_digit(ctx: &mut LockContext) -> Option<LockingState> {
    let weight = ctx.digit_weight();
    ctx.unlock_value = ctx
        .unlock_value
        .saturating_add(u16::from(ctx.digit).saturating_mul(weight));
    ctx.password_index += 1;

    if ctx.password_index < ctx.config.max_digits {
        debug!(
            "Digit {}/{} committed",
            ctx.password_index, ctx.config.max_digits
        );
        ctx.digit = 0;
        ctx.encoder_residual = 0;
        ctx.feedback.entry_progress(&mut ctx.commands, ctx.digit);
        ctx.feedback.restart_entry_timeout(&mut ctx.commands);
        return None;
    }

    let matched = ctx.unlock_value == ctx.config.password;
    ctx.clear_entry();

    if matched {
        info!("Password accepted");
        ctx.consecutive_failures = 0;
        ctx.outcome = Some(EntryOutcome::Accepted);
        Some(LockingState::Unlocked)
    } else {
        ctx.consecutive_failures = ctx.consecutive_failures.saturating_add(1);
        warn!(
            "Password rejected ({} consecutive)",
            ctx.consecutive_failures
        );
        ctx.outcome = Some(EntryOutcome::Rejected {
            consecutive_failures: ctx.consecutive_failures,
        });
        Some(LockingState::Locked)
    }
}

fn apply_aux(ctx: &mut LockContext, action: AuxAction) {
    match action {
        AuxAction::DigitUp => ctx.digit = (ctx.digit + 1) % 10,
        AuxAction::DigitDown => ctx.digit = (ctx.digit + 9) % 10,
        AuxAction::RestartEntry => {
            info!("Entry restarted");
            ctx.clear_entry();
        }
        AuxAction::Ignore => return,
    }
    ctx.feedback.entry_progress(&mut ctx.commands, ctx.digit);
    ctx.feedback.restart_entry_timeout(&mut ctx.commands);
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKED state
// ═══════════════════════════════════════════════════════════════════════════

fn unlocked_enter(ctx: &mut LockContext) {
    let content = display_content(LockingState::Unlocked, ctx);
    ctx.feedback.accepted(&mut ctx.commands, content);
}

fn unlocked_event(ctx: &mut LockContext, event: Event) -> Option<LockingState> {
    match event {
        Event::P70Pressed => {
            info!("Re-locked by P70");
            Some(LockingState::Locked)
        }
        Event::UiRefresh => {
            refresh(ctx, LockingState::Unlocked);
            None
        }
        Event::EncoderTurn => {
            debug!("Unlocked: encoder turn ignored");
            None
        }
        Event::None
        | Event::P46Pressed
        | Event::P46Released
        | Event::P70Released
        | Event::P71Pressed
        | Event::P71Released
        | Event::UiUpdate
        | Event::LedsBlink
        | Event::YellowLedsBlink => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKED state
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut LockContext) {
    let content = display_content(LockingState::Locked, ctx);
    match ctx.outcome {
        Some(EntryOutcome::Rejected {
            consecutive_failures,
        }) => {
            let escalated = consecutive_failures >= ctx.config.escalate_after_failures;
            ctx.feedback
                .rejected(&mut ctx.commands, escalated, content);
        }
        _ => ctx.feedback.locked_heartbeat(&mut ctx.commands, content),
    }
}

fn locked_event(ctx: &mut LockContext, event: Event) -> Option<LockingState> {
    match event {
        Event::P46Pressed => Some(LockingState::EnteringPassword),
        Event::LedsBlink => {
            ctx.feedback.heartbeat_toggle(&mut ctx.commands);
            None
        }
        Event::UiRefresh => {
            refresh(ctx, LockingState::Locked);
            None
        }
        Event::EncoderTurn => {
            debug!("Locked: encoder turn ignored");
            None
        }
        Event::None
        | Event::P46Released
        | Event::P70Pressed
        | Event::P70Released
        | Event::P71Pressed
        | Event::P71Released
        | Event::UiUpdate
        | Event::YellowLedsBlink => None,
    }
}
