//! plugwatch — sounds an alarm when the charger is unplugged without
//! user confirmation.
//!
//! Run with:  `RUST_LOG=info plugwatch`

use anyhow::Result;
use plugwatch_core::PowerStatus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("plugwatch v{} starting", env!("CARGO_PKG_VERSION"));

    let handle = plugwatch_monitor::spawn(
        plugwatch_system::SysfsPowerSource::new(),
        plugwatch_system::CommandAlarm::new(),
    );
    plugwatch_system::spawn_sleep_watcher(handle.clone());

    tokio::spawn(render_status(handle.status()));

    // Terminal presentation: one-letter commands on stdin.
    println!("commands: y = confirm intentional unplug, p = play alarm, s = stop alarm, q = quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => match line.trim() {
                    "y" | "yes" => handle.confirm_intentional().await,
                    "p" => handle.play_alarm().await,
                    "s" => handle.stop_alarm().await,
                    "q" => break,
                    "" => {}
                    other => println!("unknown command '{other}'"),
                },
                None => break, // stdin closed
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Print every status transition as it is published.
async fn render_status(mut status: watch::Receiver<PowerStatus>) {
    loop {
        println!("{}", render(&status.borrow_and_update()));
        if status.changed().await.is_err() {
            break; // monitor gone
        }
    }
}

fn render(status: &PowerStatus) -> String {
    if status.alarming {
        return "ALARM — power adapter unplugged and unconfirmed".to_string();
    }
    if status.awaiting_confirmation {
        return "Power adapter unplugged — intentional? (y to confirm)".to_string();
    }
    if status.adapter_connected {
        if status.cable_connected {
            "Power adapter connected (charging)".to_string()
        } else {
            "Power adapter connected".to_string()
        }
    } else {
        "Power adapter disconnected (confirmed)".to_string()
    }
}
