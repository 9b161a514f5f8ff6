//! Alarm playback through an external player process.
//!
//! One child runs for as long as the alarm sounds (`mpv --loop=inf`), so
//! "playing" is simply "the child is alive". Start and stop are idempotent.

use plugwatch_core::{PlugwatchError, Result};
use plugwatch_monitor::AlarmSink;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Freedesktop sound theme alarm, present on most desktop installs.
const DEFAULT_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga";

/// Override the alarm sound file.
const SOUND_ENV: &str = "PLUGWATCH_SOUND";

#[derive(Debug)]
pub struct CommandAlarm {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandAlarm {
    /// Looping playback of the configured alarm sound via `mpv`.
    ///
    /// A missing sound file disables playback (warn once) instead of
    /// failing the monitor.
    #[must_use]
    pub fn new() -> Self {
        let sound = std::env::var(SOUND_ENV).unwrap_or_else(|_| DEFAULT_SOUND.to_string());
        if !Path::new(&sound).exists() {
            warn!("alarm sound '{sound}' not found; alarm playback disabled");
            return Self::disabled();
        }

        Self::with_command(
            "mpv",
            ["--loop=inf", "--really-quiet", "--no-video", sound.as_str()],
        )
    }

    /// Play by running `program args…`; stopping kills the child.
    #[must_use]
    pub fn with_command<'a>(program: &str, args: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(str::to_string).collect(),
            child: None,
        }
    }

    /// An alarm that never sounds, used when no sound asset is available.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            child: None,
        }
    }

    /// Forget a child that already exited on its own.
    fn reap(&mut self) {
        if let Some(child) = &mut self.child {
            if matches!(child.try_wait(), Ok(Some(_))) {
                self.child = None;
            }
        }
    }
}

impl Default for CommandAlarm {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmSink for CommandAlarm {
    fn play(&mut self) -> Result<()> {
        self.reap();
        if self.child.is_some() {
            return Ok(()); // already playing
        }
        if self.program.is_empty() {
            debug!("alarm playback disabled; skipping");
            return Ok(());
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlugwatchError::Audio(format!("cannot spawn {}: {e}", self.program)))?;

        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("alarm player already gone: {e}");
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.child.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn play_and_stop_are_idempotent() {
        // A harmless long-running child stands in for the player.
        let mut alarm = CommandAlarm::with_command("sleep", ["60"]);
        assert!(!alarm.is_playing());

        alarm.play().unwrap();
        assert!(alarm.is_playing());
        alarm.play().unwrap(); // no-op while playing
        assert!(alarm.is_playing());

        alarm.stop();
        assert!(!alarm.is_playing());
        alarm.stop(); // no-op while stopped
        assert!(!alarm.is_playing());
    }

    #[tokio::test]
    async fn disabled_alarm_is_a_silent_no_op() {
        let mut alarm = CommandAlarm::disabled();
        alarm.play().unwrap();
        assert!(!alarm.is_playing());
        alarm.stop();
    }

    #[tokio::test]
    async fn missing_player_reports_an_audio_error() {
        let mut alarm = CommandAlarm::with_command("plugwatch-no-such-player", []);
        let err = alarm.play().unwrap_err();
        assert!(matches!(err, PlugwatchError::Audio(_)));
        assert!(!alarm.is_playing());
    }
}
