pub mod error;
pub mod event;
pub mod state;

pub use error::{PlugwatchError, Result};
pub use event::MonitorEvent;
pub use state::{PowerSnapshot, PowerStatus};
