//! Forward logind suspend/resume signals into the monitor.
//!
//! logind broadcasts `PrepareForSleep(true)` right before suspend and
//! `PrepareForSleep(false)` on resume. Both trigger an immediate power
//! re-read: the adapter may have been unplugged while the machine slept.

use futures::StreamExt;
use plugwatch_core::{MonitorEvent, PlugwatchError, Result};
use plugwatch_monitor::MonitorHandle;
use tracing::{debug, warn};

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1",
    gen_blocking = false
)]
trait LoginManager {
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

/// Spawn the sleep/wake forwarding task.
///
/// If the system bus is unavailable (container, no logind) the task logs a
/// warning and exits — the monitor then runs on polling alone.
pub fn spawn_sleep_watcher(handle: MonitorHandle) {
    tokio::spawn(async move {
        if let Err(e) = forward(handle).await {
            warn!("sleep/wake signals unavailable ({e}); relying on polling only");
        }
    });
}

async fn forward(handle: MonitorHandle) -> Result<()> {
    let connection = zbus::Connection::system().await.map_err(dbus_err)?;
    let proxy = LoginManagerProxy::new(&connection).await.map_err(dbus_err)?;
    let mut stream = proxy.receive_prepare_for_sleep().await.map_err(dbus_err)?;

    while let Some(signal) = stream.next().await {
        let Ok(args) = signal.args() else {
            debug!("malformed PrepareForSleep signal; ignoring");
            continue;
        };

        let event = if *args.start() {
            MonitorEvent::WillSleep
        } else {
            MonitorEvent::Woke
        };
        debug!("logind PrepareForSleep → {event:?}");
        handle.send(event).await;
    }

    debug!("logind signal stream ended");
    Ok(())
}

fn dbus_err(e: zbus::Error) -> PlugwatchError {
    PlugwatchError::Dbus(e.to_string())
}
