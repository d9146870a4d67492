//! Shutdown deadline state machine.
//!
//! Owns the only copy of the pending deadline. Two states — armed
//! (deadline present) and disarmed — driven by edge-triggered connectivity
//! reports and a fixed-cadence tick. Pure and clock-free: callers pass
//! monotonic milliseconds, so every transition is deterministic under test.

use crate::config::MonitorConfig;
use crate::events::MonitorEvent;

// ─── Tick Outcome ────────────────────────────────────────────────

/// What the run loop should do after evaluating one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Disarmed, or already fired: nothing to do.
    Idle,
    /// Activity while armed: the grace window restarted from now.
    Reset { deadline_ms: u64 },
    /// Deadline reached: perform the shutdown action and stop.
    Fire,
    /// Armed, counting down.
    Status { remaining_secs: u64, idle_secs: u64 },
}

// ─── Scheduler ───────────────────────────────────────────────────

/// Single authority over *if* and *when* the shutdown action executes.
///
/// The deadline is a private field mutated only through `on_connectivity`
/// and `on_tick`; nothing else in the process can touch it.
#[derive(Debug)]
pub struct ShutdownScheduler {
    grace_ms: u64,
    /// Activity threshold: idle below one tick interval means activity
    /// happened since the previous tick.
    tick_interval_ms: u64,
    deadline_ms: Option<u64>,
    /// Latched once the shutdown action has been handed to the caller.
    fired: bool,
}

impl ShutdownScheduler {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            grace_ms: config.grace_ms(),
            tick_interval_ms: config.tick_interval_ms,
            deadline_ms: None,
            fired: false,
        }
    }

    /// Pending deadline, if armed.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Apply an edge-triggered connectivity report.
    ///
    /// A loss arms the deadline at `now + grace` (no-op if already armed);
    /// a restore disarms unconditionally, however close to expiry. Returns
    /// the events to surface, in order.
    pub fn on_connectivity(&mut self, connected: bool, now_ms: u64) -> Vec<MonitorEvent> {
        if self.fired {
            return Vec::new();
        }
        let mut events = vec![MonitorEvent::ConnectivityChanged {
            connected,
            at_ms: now_ms,
        }];
        if connected {
            self.deadline_ms = None;
        } else if self.deadline_ms.is_none() {
            let deadline_ms = now_ms + self.grace_ms;
            self.deadline_ms = Some(deadline_ms);
            events.push(MonitorEvent::TimerArmed { deadline_ms });
        }
        events
    }

    /// Evaluate one tick. Meaningful only while armed.
    ///
    /// Recent activity restarts the full grace window — never a partial
    /// extension: the goal is an *uninterrupted* idle span. Expiry fires at
    /// most once; the deadline is consumed and the scheduler goes inert.
    pub fn on_tick(&mut self, idle_secs: f64, now_ms: u64) -> TickOutcome {
        if self.fired {
            return TickOutcome::Idle;
        }
        let Some(deadline_ms) = self.deadline_ms else {
            return TickOutcome::Idle;
        };
        if idle_secs < self.tick_interval_ms as f64 / 1_000.0 {
            let deadline_ms = now_ms + self.grace_ms;
            self.deadline_ms = Some(deadline_ms);
            return TickOutcome::Reset { deadline_ms };
        }
        if now_ms >= deadline_ms {
            self.fired = true;
            self.deadline_ms = None;
            return TickOutcome::Fire;
        }
        TickOutcome::Status {
            remaining_secs: (deadline_ms - now_ms) / 1_000,
            idle_secs: idle_secs as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE_MS: u64 = 120_000;

    fn scheduler() -> ShutdownScheduler {
        ShutdownScheduler::new(&MonitorConfig::default())
    }

    /// Arm via a loss report at `now_ms` and discard the events.
    fn armed_at(now_ms: u64) -> ShutdownScheduler {
        let mut s = scheduler();
        s.on_connectivity(false, now_ms);
        s
    }

    // ── 1. Arming and disarming ──────────────────────────────────

    #[test]
    fn loss_arms_deadline() {
        let mut s = scheduler();
        assert!(!s.is_armed());
        let events = s.on_connectivity(false, 0);
        assert!(s.is_armed());
        assert_eq!(s.deadline_ms(), Some(GRACE_MS));
        assert_eq!(
            events,
            vec![
                MonitorEvent::ConnectivityChanged {
                    connected: false,
                    at_ms: 0
                },
                MonitorEvent::TimerArmed {
                    deadline_ms: GRACE_MS
                },
            ]
        );
    }

    #[test]
    fn repeated_loss_is_idempotent() {
        let mut s = armed_at(0);
        let events = s.on_connectivity(false, 30_000);
        // Deadline untouched, no second arm event.
        assert_eq!(s.deadline_ms(), Some(GRACE_MS));
        assert_eq!(
            events,
            vec![MonitorEvent::ConnectivityChanged {
                connected: false,
                at_ms: 30_000
            }]
        );
    }

    #[test]
    fn restore_disarms_unconditionally() {
        let mut s = armed_at(0);
        s.on_connectivity(true, GRACE_MS - 1);
        assert_eq!(s.deadline_ms(), None);
    }

    #[test]
    fn repeated_restore_is_idempotent() {
        let mut s = armed_at(0);
        s.on_connectivity(true, 10_000);
        s.on_connectivity(true, 11_000);
        assert_eq!(s.deadline_ms(), None);
    }

    #[test]
    fn startup_disconnected_equals_connected_then_lost() {
        let mut direct = scheduler();
        direct.on_connectivity(false, 0);

        let mut via_transition = scheduler();
        via_transition.on_connectivity(true, 0);
        via_transition.on_connectivity(false, 0);

        assert_eq!(direct.deadline_ms(), via_transition.deadline_ms());
    }

    // ── 2. Tick evaluation ───────────────────────────────────────

    #[test]
    fn tick_while_disarmed_is_idle() {
        let mut s = scheduler();
        assert_eq!(s.on_tick(500.0, 1_000_000), TickOutcome::Idle);
        assert_eq!(s.deadline_ms(), None);
    }

    #[test]
    fn activity_restarts_full_grace_window() {
        let mut s = armed_at(0);
        let outcome = s.on_tick(0.2, 90_000);
        // Full reset from now, strictly later than the original deadline.
        assert_eq!(
            outcome,
            TickOutcome::Reset {
                deadline_ms: 90_000 + GRACE_MS
            }
        );
        assert_eq!(s.deadline_ms(), Some(210_000));
    }

    #[test]
    fn threshold_follows_tick_interval() {
        let config = MonitorConfig {
            tick_interval_ms: 2_000,
            ..Default::default()
        };
        let mut s = ShutdownScheduler::new(&config);
        s.on_connectivity(false, 0);
        // 1.5s idle is below a 2s tick interval: counts as activity.
        assert!(matches!(s.on_tick(1.5, 10_000), TickOutcome::Reset { .. }));
    }

    #[test]
    fn status_reports_remaining_and_idle() {
        let mut s = armed_at(0);
        let outcome = s.on_tick(119.0, 119_000);
        assert_eq!(
            outcome,
            TickOutcome::Status {
                remaining_secs: 1,
                idle_secs: 119
            }
        );
        assert_eq!(s.deadline_ms(), Some(GRACE_MS));
    }

    // ── 3. Firing ────────────────────────────────────────────────

    #[test]
    fn fires_at_most_once() {
        let mut s = armed_at(0);
        assert_eq!(s.on_tick(121.0, 121_000), TickOutcome::Fire);
        // Further ticks and reports are inert.
        assert_eq!(s.on_tick(122.0, 122_000), TickOutcome::Idle);
        assert_eq!(s.on_connectivity(false, 123_000), Vec::new());
        assert_eq!(s.on_tick(300.0, 300_000), TickOutcome::Idle);
    }

    #[test]
    fn fires_exactly_at_deadline() {
        let mut s = armed_at(0);
        assert_eq!(s.on_tick(120.0, GRACE_MS), TickOutcome::Fire);
    }

    // ── 4. End-to-end scenarios ──────────────────────────────────

    #[test]
    fn scenario_no_activity_fires_after_grace() {
        // Lost at t=0, no activity: status at 119s, fire at 121s.
        let mut s = armed_at(0);
        assert!(matches!(
            s.on_tick(119.0, 119_000),
            TickOutcome::Status { .. }
        ));
        assert_eq!(s.on_tick(121.0, 121_000), TickOutcome::Fire);
    }

    #[test]
    fn scenario_activity_postpones_fire() {
        // Lost at t=0; activity at 90s resets the deadline to 210s.
        let mut s = armed_at(0);
        assert_eq!(
            s.on_tick(0.5, 90_000),
            TickOutcome::Reset {
                deadline_ms: 210_000
            }
        );
        assert!(matches!(
            s.on_tick(110.0, 200_000),
            TickOutcome::Status { .. }
        ));
        assert_eq!(s.on_tick(121.0, 211_000), TickOutcome::Fire);
    }

    #[test]
    fn scenario_restore_cancels_permanently() {
        // Lost at t=0, restored at 50s: a tick at 1000s is a no-op.
        let mut s = armed_at(0);
        s.on_connectivity(true, 50_000);
        assert_eq!(s.on_tick(1_000.0, 1_000_000), TickOutcome::Idle);
    }
}
