use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum PlugwatchError {
    #[error("power source error: {0}")]
    Power(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("D-Bus error: {0}")]
    Dbus(String),

    #[error("monitor error: {0}")]
    Monitor(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = PlugwatchError> = std::result::Result<T, E>;
