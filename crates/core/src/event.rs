/// All messages (events) that can flow into the power monitor.
///
/// Sources:
/// - logind D-Bus watcher  → `WillSleep`, `Woke`
/// - Presentation adapter  → `ConfirmIntentional`, `PlayAlarm`, `StopAlarm`
/// - Internal / tests      → `Poll`, `Shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Force an immediate power-state poll outside the regular cadence.
    Poll,

    // ── OS sleep/wake ─────────────────────────────────────────────────────────
    /// System is about to suspend — re-read power state before it does.
    WillSleep,
    /// System resumed from suspend — the adapter may have been unplugged
    /// while asleep, so re-read immediately.
    Woke,

    // ── User actions ──────────────────────────────────────────────────────────
    /// User confirmed the unplug was intentional — suppress escalation until
    /// the adapter reconnects.
    ConfirmIntentional,
    /// Manually start alarm playback, independent of the automatic escalation.
    PlayAlarm,
    /// Manually stop alarm playback.
    StopAlarm,

    // ── Internal ──────────────────────────────────────────────────────────────
    /// Graceful shutdown requested.
    Shutdown,
}
