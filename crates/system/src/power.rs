use plugwatch_core::PowerSnapshot;
use plugwatch_monitor::PowerSource;
use std::path::{Path, PathBuf};

const SYSFS_POWER_SUPPLY: &str = "/sys/class/power_supply";

/// Reads power state from the Linux sysfs power-supply interface.
///
/// Fail-safe: a missing directory or unreadable attribute contributes a
/// "disconnected" reading, never an error, so the monitor prompts rather
/// than staying silent on a broken platform.
#[derive(Debug)]
pub struct SysfsPowerSource {
    root: PathBuf,
}

impl SysfsPowerSource {
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(SYSFS_POWER_SUPPLY)
    }

    /// Read from an alternative sysfs root (tests).
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsPowerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for SysfsPowerSource {
    fn snapshot(&mut self) -> PowerSnapshot {
        snapshot_from_dir(&self.root)
    }
}

/// Scan every supply under `root` and fold it into one snapshot.
///
/// `adapter_connected` — any mains/USB supply reporting `online == 1`.
/// `cable_connected`   — any battery reporting `Charging` or `Full`.
fn snapshot_from_dir(root: &Path) -> PowerSnapshot {
    let Ok(entries) = std::fs::read_dir(root) else {
        return PowerSnapshot::DISCONNECTED;
    };

    let mut snapshot = PowerSnapshot::DISCONNECTED;
    for entry in entries.flatten() {
        let supply = entry.path();
        let Some(kind) = read_trimmed(&supply.join("type")) else {
            continue;
        };

        if kind == "Battery" {
            if let Some(status) = read_trimmed(&supply.join("status")) {
                snapshot.cable_connected |= is_charging_status(&status);
            }
        } else if is_adapter_type(&kind) {
            if let Some(online) = read_trimmed(&supply.join("online")) {
                snapshot.adapter_connected |= online == "1";
            }
        }
    }
    snapshot
}

/// Supply types that count as an external power adapter.
fn is_adapter_type(kind: &str) -> bool {
    matches!(kind, "Mains" | "USB" | "Wireless")
}

fn is_charging_status(status: &str) -> bool {
    matches!(status, "Charging" | "Full")
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}
