//! Decision loop: fuses the sensor signals into the shutdown deadline.
//!
//! One serialized loop owns the scheduler. Connectivity reports and ticks
//! are never processed concurrently, so the deadline has exactly one
//! writer and a report is always applied before the next tick runs.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant, interval_at};

use netdown_core::{EdgeDetector, MonitorConfig, MonitorEvent, ShutdownScheduler, TickOutcome};
use netdown_platform::{
    PowerController, ReachabilityProbe, SystemExecutor, SystemPower, TcpProbe, default_input_probe,
};

use crate::sensors::{
    ActivityHandle, sample_blocking, spawn_activity_sampler, spawn_connectivity_sampler,
};
use crate::status::Renderer;

/// Why the monitor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Deadline expired and the shutdown command was issued.
    ShutdownFired,
    /// Operator interrupt before any firing.
    Terminated,
}

/// Build the real sensors and run until shutdown fires or the operator
/// interrupts.
pub async fn run_monitor(config: MonitorConfig, renderer: Renderer) -> anyhow::Result<MonitorOutcome> {
    let origin = Instant::now();
    let activity = ActivityHandle::new();
    let (stop_tx, stop_rx) = watch::channel(false);
    let (conn_tx, conn_rx) = mpsc::channel(8);

    let probe: Arc<dyn ReachabilityProbe> = Arc::new(TcpProbe::new(
        config.probe_addrs.clone(),
        Duration::from_millis(config.probe_timeout_ms),
    ));

    // The initial state is consulted before the first tick: probe once up
    // front and route the report through the same channel as transitions,
    // so starting disconnected behaves exactly like losing connectivity.
    let mut detector = EdgeDetector::new();
    let initial = sample_blocking(Arc::clone(&probe)).await;
    if let Some(connected) = detector.observe(initial) {
        let _ = conn_tx.send(connected).await;
    } else {
        tracing::warn!("initial reachability probe inconclusive");
    }

    let activity_task = spawn_activity_sampler(
        default_input_probe(),
        activity.clone(),
        config.activity_poll_ms,
        stop_rx.clone(),
    );
    let conn_task = spawn_connectivity_sampler(
        Arc::clone(&probe),
        detector,
        conn_tx,
        config.net_poll_ms,
        stop_rx,
    );

    let (int_tx, int_rx) = watch::channel(false);
    tokio::spawn(wait_for_interrupt(int_tx));

    let power = SystemPower::new(SystemExecutor);
    let outcome =
        run_decision_loop(config, origin, activity, conn_rx, power, renderer, int_rx).await;

    // Stop the samplers; each exits within one poll interval.
    let _ = stop_tx.send(true);
    let _ = tokio::join!(activity_task, conn_task);

    outcome
}

/// Resolve on ctrl-c or SIGTERM, then flip the interrupt flag.
async fn wait_for_interrupt(tx: watch::Sender<bool>) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("received ctrl-c, stopping monitor"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM, stopping monitor"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c, stopping monitor");
    }

    let _ = tx.send(true);
}

/// The serialized decision loop. Generic over the power seam so tests can
/// observe firing without shutting the host down.
pub(crate) async fn run_decision_loop<P: PowerController>(
    config: MonitorConfig,
    origin: Instant,
    activity: ActivityHandle,
    mut conn_rx: mpsc::Receiver<bool>,
    power: P,
    renderer: Renderer,
    mut interrupt: watch::Receiver<bool>,
) -> anyhow::Result<MonitorOutcome> {
    let mut scheduler = ShutdownScheduler::new(&config);
    // First tick one full interval from now; the initial connectivity
    // report is already queued and must be applied first anyway.
    let period = Duration::from_millis(config.tick_interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    let mut conn_open = true;

    loop {
        tokio::select! {
            // A pending connectivity report must win over a due tick, so a
            // tick never observes a half-applied deadline change.
            biased;

            report = conn_rx.recv(), if conn_open => {
                match report {
                    Some(connected) => {
                        for event in scheduler.on_connectivity(connected, now_ms(origin)) {
                            if let MonitorEvent::TimerArmed { deadline_ms } = event {
                                tracing::info!(deadline_ms, "shutdown timer armed");
                            }
                            renderer.emit(&event);
                        }
                    }
                    None => {
                        conn_open = false;
                        tracing::warn!("connectivity sampler channel closed");
                    }
                }
            }
            _ = interrupt.changed() => {
                renderer.emit(&MonitorEvent::Terminated { at_ms: now_ms(origin) });
                return Ok(MonitorOutcome::Terminated);
            }
            _ = ticker.tick() => {
                match scheduler.on_tick(activity.idle_seconds(), now_ms(origin)) {
                    TickOutcome::Idle => {}
                    TickOutcome::Reset { deadline_ms } => {
                        tracing::debug!(deadline_ms, "activity observed, timer reset");
                        renderer.emit(&MonitorEvent::TimerReset { deadline_ms });
                    }
                    TickOutcome::Status { remaining_secs, idle_secs } => {
                        renderer.emit(&MonitorEvent::StatusTick { remaining_secs, idle_secs });
                    }
                    TickOutcome::Fire => {
                        renderer.emit(&MonitorEvent::ShutdownFired { at_ms: now_ms(origin) });
                        tracing::info!("grace period expired, executing shutdown command");
                        if let Err(e) = power.shutdown() {
                            tracing::error!("shutdown command failed: {e}");
                            return Err(anyhow::Error::new(e).context("shutdown command failed"));
                        }
                        return Ok(MonitorOutcome::ShutdownFired);
                    }
                }
            }
        }
    }
}

fn now_ms(origin: Instant) -> u64 {
    Instant::now().saturating_duration_since(origin).as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use netdown_platform::PlatformError;

    #[derive(Clone)]
    struct MockPower {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MockPower {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    fail,
                },
                calls,
            )
        }
    }

    impl PowerController for MockPower {
        fn shutdown(&self) -> Result<(), PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PlatformError::CommandFailed("denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        conn_tx: mpsc::Sender<bool>,
        int_tx: watch::Sender<bool>,
        activity: ActivityHandle,
        calls: Arc<AtomicUsize>,
        task: tokio::task::JoinHandle<anyhow::Result<MonitorOutcome>>,
    }

    fn start(fail: bool) -> Harness {
        let config = MonitorConfig::default();
        let activity = ActivityHandle::new();
        let (conn_tx, conn_rx) = mpsc::channel(8);
        let (int_tx, int_rx) = watch::channel(false);
        let (power, calls) = MockPower::new(fail);
        let task = tokio::spawn(run_decision_loop(
            config,
            Instant::now(),
            activity.clone(),
            conn_rx,
            power,
            Renderer::new(true),
            int_rx,
        ));
        Harness {
            conn_tx,
            int_tx,
            activity,
            calls,
            task,
        }
    }

    // ── 1. Full countdown fires exactly once ─────────────────────

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_grace_expires() {
        let h = start(false);
        h.conn_tx.send(false).await.expect("send");

        let outcome = h.task.await.expect("join").expect("loop");
        assert_eq!(outcome, MonitorOutcome::ShutdownFired);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    // ── 2. Restore cancels, however close to expiry ──────────────

    #[tokio::test(start_paused = true)]
    async fn restore_cancels_countdown() {
        let h = start(false);
        h.conn_tx.send(false).await.expect("send");

        tokio::time::sleep(Duration::from_secs(50)).await;
        h.conn_tx.send(true).await.expect("send");

        // Far past the original deadline: nothing fires.
        tokio::time::sleep(Duration::from_secs(1_000)).await;
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(!h.task.is_finished());

        h.int_tx.send(true).expect("interrupt");
        let outcome = h.task.await.expect("join").expect("loop");
        assert_eq!(outcome, MonitorOutcome::Terminated);
    }

    // ── 3. Activity restarts the full grace window ───────────────

    #[tokio::test(start_paused = true)]
    async fn activity_postpones_firing() {
        let h = start(false);
        h.conn_tx.send(false).await.expect("send");

        // Activity at ~90.5s resets the deadline to ~211s.
        tokio::time::sleep(Duration::from_millis(90_500)).await;
        h.activity.mark_active();

        // The original 120s deadline passes without firing.
        tokio::time::sleep(Duration::from_millis(114_000)).await;
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(!h.task.is_finished());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let outcome = h.task.await.expect("join").expect("loop");
        assert_eq!(outcome, MonitorOutcome::ShutdownFired);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    // ── 4. Interrupt stops cleanly without firing ────────────────

    #[tokio::test(start_paused = true)]
    async fn interrupt_never_fires() {
        let h = start(false);
        h.conn_tx.send(false).await.expect("send");

        tokio::time::sleep(Duration::from_secs(30)).await;
        h.int_tx.send(true).expect("interrupt");

        let outcome = h.task.await.expect("join").expect("loop");
        assert_eq!(outcome, MonitorOutcome::Terminated);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    // ── 5. A failed shutdown command is fatal, not retried ───────

    #[tokio::test(start_paused = true)]
    async fn action_failure_terminates_run() {
        let h = start(true);
        h.conn_tx.send(false).await.expect("send");

        let result = h.task.await.expect("join");
        assert!(result.is_err());
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    // ── 6. Connected start never arms ────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn connected_start_stays_disarmed() {
        let h = start(false);
        h.conn_tx.send(true).await.expect("send");

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(!h.task.is_finished());

        h.int_tx.send(true).expect("interrupt");
        let outcome = h.task.await.expect("join").expect("loop");
        assert_eq!(outcome, MonitorOutcome::Terminated);
    }
}
