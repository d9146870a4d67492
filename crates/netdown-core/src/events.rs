//! Observability events emitted by the scheduler.
//!
//! Timestamps are monotonic milliseconds since monitor start; the
//! presentation layer attaches wall-clock time when it renders a line.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Edge-triggered reachability report (also carries the initial state).
    ConnectivityChanged { connected: bool, at_ms: u64 },
    /// Deadline armed after a loss, or an initial disconnected state.
    TimerArmed { deadline_ms: u64 },
    /// Activity observed while armed: the full grace period restarts.
    TimerReset { deadline_ms: u64 },
    /// Armed countdown heartbeat. No state change.
    StatusTick { remaining_secs: u64, idle_secs: u64 },
    /// Shutdown action fired. At most once per process lifetime.
    ShutdownFired { at_ms: u64 },
    /// Operator interrupt; the monitor stopped without firing.
    Terminated { at_ms: u64 },
}
