//! EncoderLock host simulator.
//!
//! Drives one [`LockProcess`] with a console panel and software timers.
//! Commands are read from stdin, one per line:
//!
//! ```text
//! press 46 | release 70 | turn -2 | wait 500 | state | quit
//! ```
//!
//! The first argument, if given, is a JSON `LockConfig`.  The log level
//! comes from `ENCODERLOCK_LOG` (default `info`); logs go to stderr.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use log::info;
use tracing_subscriber::EnvFilter;

use encoderlock::adapters::console::ConsolePanel;
use encoderlock::config::LockConfig;
use encoderlock::events::Event;
use encoderlock::process::LockProcess;
use encoderlock::timers::SoftTimers;

type SimProcess = LockProcess<ConsolePanel, SoftTimers>;

/// Environment variable holding the log filter, e.g. `debug` or
/// `encoderlock::fsm=trace`.
const LOG_ENV: &str = "ENCODERLOCK_LOG";

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// One parsed stdin line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Post(Event),
    Turn(i16),
    Wait(u32),
    State,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let cmd = match verb {
        "press" | "release" => {
            let pressed = verb == "press";
            let event = match (arg, pressed) {
                (Some("46"), true) => Event::P46Pressed,
                (Some("46"), false) => Event::P46Released,
                (Some("70"), true) => Event::P70Pressed,
                (Some("70"), false) => Event::P70Released,
                (Some("71"), true) => Event::P71Pressed,
                (Some("71"), false) => Event::P71Released,
                _ => bail!("expected button 46, 70 or 71"),
            };
            Command::Post(event)
        }
        "turn" => Command::Turn(
            arg.context("turn needs a step count")?
                .parse()
                .context("step count must be an integer")?,
        ),
        "wait" => Command::Wait(
            arg.context("wait needs milliseconds")?
                .parse()
                .context("milliseconds must be a non-negative integer")?,
        ),
        "state" => Command::State,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(cmd))
}

fn load_config() -> Result<LockConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(LockConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = LockConfig::from_json(&text).with_context(|| format!("loading {path}"))?;
    info!("Config loaded from {path}");
    Ok(config)
}

fn report(process: &mut SimProcess, out: &mut impl Write) -> Result<()> {
    let panel = process.devices_mut();
    for pattern in panel.take_buzzes() {
        writeln!(out, "buzz {pattern:?}")?;
    }
    if panel.take_changed() {
        writeln!(out, "{panel}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the panel status on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    info!("EncoderLock simulator v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let mut process = LockProcess::new(ConsolePanel::new(), SoftTimers::new(), config)
        .context("starting lock process")?;
    process.init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report(&mut process, &mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                continue;
            }
        };

        match cmd {
            Command::Post(event) => {
                process.post(event);
                process.run_pending();
            }
            Command::Turn(steps) => {
                process.devices_mut().turn(steps);
                process.post(Event::EncoderTurn);
                process.run_pending();
            }
            Command::Wait(ms) => {
                process.advance(ms);
            }
            Command::State => {
                let status = process.service().build_status();
                writeln!(
                    out,
                    "state={} digit={}/{} failures={} timers={}",
                    status.state,
                    status.password_index + 1,
                    status.max_digits,
                    status.consecutive_failures,
                    status.armed_timers
                )?;
            }
            Command::Quit => break,
        }
        report(&mut process, &mut out)?;
    }

    process.deinit();
    report(&mut process, &mut out)?;
    Ok(())
}
