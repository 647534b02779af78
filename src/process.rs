//! Process shell — lifecycle hooks plus queue and timer wiring.
//!
//! A [`LockProcess`] is what the surrounding framework schedules.  It owns
//! the device handles, the timer service, the event queue and the
//! [`LockService`], and is built by an ordinary constructor.
//!
//! ```text
//!  ISR / timers ──push──▶ EventQueue ──pop──▶ LockService ──▶ ports
//! ```

use log::{debug, info};

use crate::adapters::log_sink::LogEventSink;
use crate::app::ports::{EncoderPort, EventSink, PanelPort, TimerDelegate, TimerPort};
use crate::app::service::LockService;
use crate::config::LockConfig;
use crate::error::ConfigError;
use crate::events::{Event, EventQueue};
use crate::timers::{SoftTimers, TimerId};

/// One lock panel process.
///
/// `P` bundles the six device handles, `T` is the timer service and `S`
/// receives application events.
pub struct LockProcess<P, T, S = LogEventSink> {
    service: LockService,
    devices: P,
    timers: T,
    sink: S,
    queue: EventQueue,
}

impl<P, T> LockProcess<P, T, LogEventSink>
where
    P: PanelPort + EncoderPort,
    T: TimerPort,
{
    /// Build a process that reports through the log.
    pub fn new(devices: P, timers: T, config: LockConfig) -> Result<Self, ConfigError> {
        Self::with_sink(devices, timers, config, LogEventSink::new())
    }
}

impl<P, T, S> LockProcess<P, T, S>
where
    P: PanelPort + EncoderPort,
    T: TimerPort,
    S: EventSink,
{
    /// Fails if `config` does not validate.
    pub fn with_sink(
        devices: P,
        timers: T,
        config: LockConfig,
        sink: S,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            service: LockService::new(config)?,
            devices,
            timers,
            sink,
            queue: EventQueue::new(),
        })
    }

    // ── Lifecycle hooks ───────────────────────────────────────

    pub fn init(&mut self) {
        info!("lock process init");
        self.service
            .init(&mut self.devices, &mut self.timers, &mut self.sink);
    }

    /// Tear down: queued events are discarded, timers disarmed, outputs off.
    pub fn deinit(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            debug!("deinit discarded {dropped} queued events");
        }
        self.service
            .deinit(&mut self.devices, &mut self.timers, &mut self.sink);
    }

    // ── Event flow ────────────────────────────────────────────

    /// Queue an event.  Returns `false` if the queue was full.
    pub fn post(&self, event: Event) -> bool {
        self.queue.push(event)
    }

    /// Handle queued events in FIFO order until the queue is empty.
    pub fn run_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            self.service
                .handle_event(event, &mut self.devices, &mut self.timers, &mut self.sink);
            handled += 1;
        }
        handled
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Producer handle for interrupt or timer context.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn service(&self) -> &LockService {
        &self.service
    }

    pub fn devices(&self) -> &P {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut P {
        &mut self.devices
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<P, S> LockProcess<P, SoftTimers, S>
where
    P: PanelPort + EncoderPort,
    S: EventSink,
{
    /// Let `elapsed_ms` pass on the software timer service.
    ///
    /// Time advances expiry by expiry, and each fired event is handled
    /// before the clock moves on, so a handler that re-arms its timer sees
    /// it fire again within the same window.  Returns the number of events
    /// handled, including any that were already queued.
    pub fn advance(&mut self, elapsed_ms: u32) -> usize {
        let mut handled = self.run_pending();
        let mut budget = elapsed_ms;

        loop {
            let step = match self.timers.next_due_ms() {
                Some(due) if due <= budget => due,
                _ => budget,
            };
            budget -= step;

            let mut forward = QueueDelegate(&self.queue);
            let fired = self.timers.tick(step, &mut forward);
            handled += self.run_pending();

            if fired == 0 && budget == 0 {
                break;
            }
        }
        handled
    }
}

/// Forwards timer firings into the process queue.
struct QueueDelegate<'a>(&'a EventQueue);

impl TimerDelegate for QueueDelegate<'_> {
    fn on_timer_fired(&mut self, timer: TimerId) {
        self.0.push(timer.event());
    }
}
