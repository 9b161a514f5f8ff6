use chrono::Local;
use plugwatch_core::state::{PowerSnapshot, PowerStatus};
use std::time::Duration;
use tokio::time::Instant;

/// How often the platform power state is re-read.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Delay between an unexpected disconnection and alarm escalation, during
/// which the user can confirm the unplug was intentional.
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Side effect the caller must carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartAlarm,
    StopAlarm,
}

/// Pure unplug-detection state machine.
///
/// Owns all monitor state; the async loop in [`crate::spawn`] feeds it
/// snapshots and clock readings and executes the [`Action`]s it returns.
/// Per disconnection episode:
///
/// ```text
/// CONNECTED ─(adapter lost)→ AWAITING_CONFIRMATION ─(grace elapses)→ ALARMING
///                                 │                                     │
///                          (user confirms)                      (adapter returns)
///                                 ↓                                     ↓
///                         CONFIRMED_UNPLUGGED ─(adapter returns)→ CONNECTED
/// ```
///
/// There is no edge from ALARMING back to AWAITING_CONFIRMATION; only a
/// connected reading ends an alarm episode.
#[derive(Debug)]
pub struct Engine {
    snapshot: PowerSnapshot,
    awaiting_confirmation: bool,
    unplugged_intentionally: bool,
    alarm_deadline: Option<Instant>,
    alarming: bool,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Optimistic default: assume connected until the first real poll.
            snapshot: PowerSnapshot::default(),
            awaiting_confirmation: false,
            unplugged_intentionally: false,
            alarm_deadline: None,
            alarming: false,
        }
    }

    /// Fold a fresh power snapshot into the state machine.
    ///
    /// Only `adapter_connected` drives the decision; `cable_connected` is
    /// carried for display. Repeated disconnected readings are idempotent
    /// and never schedule a second grace deadline.
    pub fn observe(&mut self, snapshot: PowerSnapshot, now: Instant) -> Option<Action> {
        self.snapshot = snapshot;

        if !snapshot.adapter_connected && !self.unplugged_intentionally {
            // While the alarm is sounding the prompt stays dismissed; only a
            // connected reading ends the episode.
            if !self.alarming {
                self.awaiting_confirmation = true;
                if self.alarm_deadline.is_none() {
                    self.alarm_deadline = Some(now + GRACE_PERIOD);
                }
            }
            None
        } else {
            self.awaiting_confirmation = false;
            self.alarm_deadline = None;
            if snapshot.adapter_connected {
                // Reconnection ends a confirmed-unplug episode, so the next
                // disconnection prompts again.
                self.unplugged_intentionally = false;
            }
            if self.alarming {
                self.alarming = false;
                Some(Action::StopAlarm)
            } else {
                None
            }
        }
    }

    /// The deferred grace-period check. Re-reads the flags at fire time:
    /// a confirmation or reconnection that happened since scheduling leaves
    /// this inert.
    pub fn grace_elapsed(&mut self) -> Option<Action> {
        self.alarm_deadline = None;
        if self.awaiting_confirmation && !self.unplugged_intentionally {
            // The prompt is dismissed the moment the alarm starts.
            self.awaiting_confirmation = false;
            self.alarming = true;
            Some(Action::StartAlarm)
        } else {
            None
        }
    }

    /// The user confirmed the unplug was intentional. Suppresses escalation
    /// until the adapter reconnects.
    pub fn confirm_intentional(&mut self) -> Option<Action> {
        self.unplugged_intentionally = true;
        self.awaiting_confirmation = false;
        self.alarm_deadline = None;
        if self.alarming {
            self.alarming = false;
            Some(Action::StopAlarm)
        } else {
            None
        }
    }

    /// Deadline of the pending grace-period check, if one is scheduled.
    #[must_use]
    pub fn alarm_deadline(&self) -> Option<Instant> {
        self.alarm_deadline
    }

    #[must_use]
    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    #[must_use]
    pub fn alarming(&self) -> bool {
        self.alarming
    }

    /// Publishable view of the current state.
    #[must_use]
    pub fn status(&self) -> PowerStatus {
        PowerStatus {
            adapter_connected: self.snapshot.adapter_connected,
            cable_connected: self.snapshot.cable_connected,
            awaiting_confirmation: self.awaiting_confirmation,
            alarming: self.alarming,
            changed_at: Local::now(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTED: PowerSnapshot = PowerSnapshot {
        cable_connected: true,
        adapter_connected: true,
    };
    const UNPLUGGED: PowerSnapshot = PowerSnapshot {
        cable_connected: false,
        adapter_connected: false,
    };

    #[test]
    fn disconnect_raises_confirmation_and_schedules_one_check() {
        let mut engine = Engine::new();
        let t0 = Instant::now();

        assert_eq!(engine.observe(CONNECTED, t0), None);
        assert_eq!(engine.observe(CONNECTED, t0), None);
        assert!(!engine.awaiting_confirmation());

        assert_eq!(engine.observe(UNPLUGGED, t0), None);
        assert!(engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), Some(t0 + GRACE_PERIOD));

        // Repeated disconnected readings must not move the deadline.
        assert_eq!(engine.observe(UNPLUGGED, t0 + POLL_INTERVAL), None);
        assert_eq!(engine.alarm_deadline(), Some(t0 + GRACE_PERIOD));
    }

    #[test]
    fn grace_elapsing_unconfirmed_starts_alarm_and_dismisses_prompt() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);

        assert_eq!(engine.grace_elapsed(), Some(Action::StartAlarm));
        assert!(engine.alarming());
        assert!(!engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), None);
    }

    #[test]
    fn confirming_suppresses_the_pending_alarm() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);

        assert_eq!(engine.confirm_intentional(), None);
        assert!(!engine.awaiting_confirmation());

        // The deferred check fires anyway but must stay inert.
        assert_eq!(engine.grace_elapsed(), None);
        assert!(!engine.alarming());

        // Still unplugged on the next poll: no new prompt, no new deadline.
        assert_eq!(engine.observe(UNPLUGGED, t0 + POLL_INTERVAL), None);
        assert!(!engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), None);
    }

    #[test]
    fn reconnecting_while_awaiting_clears_and_prevents_alarm() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);
        assert!(engine.awaiting_confirmation());

        assert_eq!(engine.observe(CONNECTED, t0 + POLL_INTERVAL), None);
        assert!(!engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), None);

        assert_eq!(engine.grace_elapsed(), None);
        assert!(!engine.alarming());
    }

    #[test]
    fn reconnecting_while_alarming_stops_the_alarm() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);
        engine.grace_elapsed();
        assert!(engine.alarming());

        assert_eq!(engine.observe(CONNECTED, t0 + GRACE_PERIOD), Some(Action::StopAlarm));
        assert!(!engine.alarming());
    }

    #[test]
    fn alarming_episode_never_reraises_the_prompt() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);
        engine.grace_elapsed();

        // Polls keep reporting disconnected while the alarm sounds.
        let t1 = t0 + GRACE_PERIOD + POLL_INTERVAL;
        assert_eq!(engine.observe(UNPLUGGED, t1), None);
        assert!(!engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), None);
        assert!(engine.alarming());
    }

    #[test]
    fn confirming_while_alarming_silences_it() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);
        engine.grace_elapsed();

        assert_eq!(engine.confirm_intentional(), Some(Action::StopAlarm));
        assert!(!engine.alarming());
    }

    #[test]
    fn reconnection_resets_confirmed_unplug_for_the_next_episode() {
        let mut engine = Engine::new();
        let t0 = Instant::now();
        engine.observe(UNPLUGGED, t0);
        engine.confirm_intentional();

        // Adapter comes back, then goes away again: a fresh episode must
        // prompt again.
        engine.observe(CONNECTED, t0 + GRACE_PERIOD);
        let t1 = t0 + GRACE_PERIOD + POLL_INTERVAL;
        engine.observe(UNPLUGGED, t1);
        assert!(engine.awaiting_confirmation());
        assert_eq!(engine.alarm_deadline(), Some(t1 + GRACE_PERIOD));
    }

    #[test]
    fn charging_state_does_not_drive_the_decision() {
        let mut engine = Engine::new();
        let t0 = Instant::now();

        // Adapter attached but not charging (battery full threshold etc.):
        // no prompt.
        let idle = PowerSnapshot {
            cable_connected: false,
            adapter_connected: true,
        };
        assert_eq!(engine.observe(idle, t0), None);
        assert!(!engine.awaiting_confirmation());
        assert!(!engine.status().cable_connected);
    }
}
