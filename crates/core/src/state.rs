use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A point-in-time read of the platform power supplies.
///
/// Rebuilt from scratch on every poll; never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSnapshot {
    /// A battery reports `Charging` or `Full`.
    pub cable_connected: bool,
    /// A mains/USB power supply reports itself online.
    pub adapter_connected: bool,
}

impl PowerSnapshot {
    /// Fail-safe reading used when the platform reports no power sources at
    /// all: treat everything as disconnected so the monitor prompts rather
    /// than staying silent.
    pub const DISCONNECTED: Self = Self {
        cable_connected: false,
        adapter_connected: false,
    };
}

impl Default for PowerSnapshot {
    /// Optimistic startup default: assume the adapter is attached until the
    /// first real poll says otherwise.
    fn default() -> Self {
        Self {
            cable_connected: true,
            adapter_connected: true,
        }
    }
}

/// Published monitor status — the presentation adapter reads from this
/// snapshot and never writes back.
#[derive(Debug, Clone)]
pub struct PowerStatus {
    pub adapter_connected: bool,
    /// Charging state; informational only, never part of the alarm decision.
    pub cable_connected: bool,
    /// An unexpected disconnection is waiting for the user to confirm it.
    pub awaiting_confirmation: bool,
    /// The grace period elapsed unconfirmed and the alarm is sounding.
    pub alarming: bool,
    /// When any of the above last changed.
    pub changed_at: DateTime<Local>,
}

impl PowerStatus {
    /// Field-wise comparison ignoring the timestamp, used to decide whether
    /// a status update is worth publishing.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.adapter_connected == other.adapter_connected
            && self.cable_connected == other.cable_connected
            && self.awaiting_confirmation == other.awaiting_confirmation
            && self.alarming == other.alarming
    }
}

impl Default for PowerStatus {
    fn default() -> Self {
        let snap = PowerSnapshot::default();
        Self {
            adapter_connected: snap.adapter_connected,
            cable_connected: snap.cable_connected,
            awaiting_confirmation: false,
            alarming: false,
            changed_at: Local::now(),
        }
    }
}
