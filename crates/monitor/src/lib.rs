//! Power monitor actor for `plugwatch`.
//!
//! Owns the unplug-detection state machine and wires together its inputs:
//! - a repeating poll of the platform power source
//! - forwarded OS sleep/wake notifications
//! - user actions from the presentation adapter
//! - the deferred grace-period alarm check
//!
//! All state lives on one task; inputs from other contexts arrive as typed
//! [`MonitorEvent`]s over a channel, so "adapter reconnected" and "grace
//! period elapsed" can never race on stale state.

pub mod engine;

pub use engine::{Action, Engine, GRACE_PERIOD, POLL_INTERVAL};

use plugwatch_core::{MonitorEvent, PowerSnapshot, PowerStatus, Result};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Platform power reading. Implementations must be fail-safe: when nothing
/// can be read, report disconnected rather than erroring, so the monitor
/// prompts instead of staying silent.
pub trait PowerSource: Send + 'static {
    fn snapshot(&mut self) -> PowerSnapshot;
}

/// Alarm playback. `play` while playing and `stop` while stopped are no-ops.
pub trait AlarmSink: Send + 'static {
    fn play(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Cloneable handle to a running monitor task.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    events: mpsc::Sender<MonitorEvent>,
    status: watch::Receiver<PowerStatus>,
}

impl MonitorHandle {
    /// Subscribe to published status updates.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<PowerStatus> {
        self.status.clone()
    }

    /// Forward an event to the monitor task. Dropped silently if the task
    /// has already shut down.
    pub async fn send(&self, event: MonitorEvent) {
        if self.events.send(event).await.is_err() {
            debug!("monitor task is gone; dropping {event:?}");
        }
    }

    /// User confirmed the unplug was intentional.
    pub async fn confirm_intentional(&self) {
        self.send(MonitorEvent::ConfirmIntentional).await;
    }

    /// Manually start alarm playback (independent of escalation).
    pub async fn play_alarm(&self) {
        self.send(MonitorEvent::PlayAlarm).await;
    }

    /// Manually stop alarm playback.
    pub async fn stop_alarm(&self) {
        self.send(MonitorEvent::StopAlarm).await;
    }

    /// Ask the monitor task to exit. Playback is silenced on the way out.
    pub async fn shutdown(&self) {
        self.send(MonitorEvent::Shutdown).await;
    }
}

/// Spawn the monitor task: one immediate poll, then a repeating poll every
/// [`POLL_INTERVAL`] plus whatever events arrive in between.
///
/// The task stops on [`MonitorEvent::Shutdown`] or when every handle is
/// dropped.
pub fn spawn<P, A>(source: P, alarm: A) -> MonitorHandle
where
    P: PowerSource,
    A: AlarmSink,
{
    let (event_tx, event_rx) = mpsc::channel(16);
    let (status_tx, status_rx) = watch::channel(PowerStatus::default());

    tokio::spawn(run_loop(source, alarm, event_rx, status_tx));

    MonitorHandle {
        events: event_tx,
        status: status_rx,
    }
}

async fn run_loop<P, A>(
    mut source: P,
    mut alarm: A,
    mut events: mpsc::Receiver<MonitorEvent>,
    status: watch::Sender<PowerStatus>,
) where
    P: PowerSource,
    A: AlarmSink,
{
    let mut engine = Engine::new();
    let mut poll = time::interval(POLL_INTERVAL);
    // After a suspend the missed ticks are stale; one fresh read is enough.
    poll.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        let deadline = engine.alarm_deadline();

        tokio::select! {
            // First tick fires immediately — that is the startup poll.
            _ = poll.tick() => {
                let action = engine.observe(source.snapshot(), Instant::now());
                apply(action, &mut alarm);
            }

            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let action = engine.grace_elapsed();
                apply(action, &mut alarm);
            }

            event = events.recv() => match event {
                Some(MonitorEvent::Poll) => {
                    let action = engine.observe(source.snapshot(), Instant::now());
                    apply(action, &mut alarm);
                }
                Some(ev @ (MonitorEvent::WillSleep | MonitorEvent::Woke)) => {
                    debug!("re-reading power state on {ev:?}");
                    let action = engine.observe(source.snapshot(), Instant::now());
                    apply(action, &mut alarm);
                }
                Some(MonitorEvent::ConfirmIntentional) => {
                    info!("unplug confirmed as intentional");
                    let action = engine.confirm_intentional();
                    apply(action, &mut alarm);
                }
                // Manual toggling bypasses the engine: the poll loop only
                // silences playback the engine itself started.
                Some(MonitorEvent::PlayAlarm) => {
                    if let Err(e) = alarm.play() {
                        warn!("alarm playback failed: {e}");
                    }
                }
                Some(MonitorEvent::StopAlarm) => alarm.stop(),
                Some(MonitorEvent::Shutdown) | None => break,
            },
        }

        publish(&status, &engine);
    }

    alarm.stop();
    debug!("monitor task exiting");
}

fn apply<A: AlarmSink>(action: Option<Action>, alarm: &mut A) {
    match action {
        Some(Action::StartAlarm) => {
            // A failed playback start must not wedge the state machine.
            if let Err(e) = alarm.play() {
                warn!("alarm playback failed: {e}");
            }
        }
        Some(Action::StopAlarm) => alarm.stop(),
        None => {}
    }
}

/// Push the engine state into the watch channel, but only when something
/// other than the timestamp changed.
fn publish(status: &watch::Sender<PowerStatus>, engine: &Engine) {
    status.send_if_modified(|current| {
        let next = engine.status();
        if current.same_shape(&next) {
            return false;
        }

        if next.awaiting_confirmation && !current.awaiting_confirmation {
            warn!(
                "power adapter disconnected — alarm in {}s unless confirmed",
                GRACE_PERIOD.as_secs()
            );
        }
        if next.alarming && !current.alarming {
            warn!("grace period elapsed without confirmation — alarm on");
        }
        if next.adapter_connected && !current.adapter_connected {
            info!("power adapter reconnected");
        }

        *current = next;
        true
    });
}
