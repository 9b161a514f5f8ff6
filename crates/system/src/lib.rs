//! Platform adapters for `plugwatch`: sysfs power reading, logind
//! sleep/wake signals, and alarm playback through an external player.

pub mod audio;
pub mod power;
pub mod sleep;

pub use audio::CommandAlarm;
pub use power::SysfsPowerSource;
pub use sleep::spawn_sleep_watcher;
