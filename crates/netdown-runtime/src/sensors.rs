//! Sampling loops: input activity and network reachability.
//!
//! Each sensor runs as a tokio task that sleeps its poll interval between
//! samples and exits within one interval of the stop signal. Sensors never
//! touch scheduler state; they communicate through the activity handle and
//! the connectivity channel only.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant, interval};

use netdown_core::{EdgeDetector, Reachability};
use netdown_platform::{InputProbe, ReachabilityProbe};

// ─── Activity ────────────────────────────────────────────────────

/// Shared view of the last observed input activity.
///
/// Single writer (the sampler task), any number of readers. Readers
/// tolerate staleness up to one poll interval.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    started: Instant,
    last_activity: Arc<Mutex<Option<Instant>>>,
}

impl ActivityHandle {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_activity: Arc::new(Mutex::new(None)),
        }
    }

    /// Seconds since the last detected activity, measured from sensor
    /// start while nothing has been observed yet.
    pub fn idle_seconds(&self) -> f64 {
        let last = *self
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let origin = last.unwrap_or(self.started);
        Instant::now().saturating_duration_since(origin).as_secs_f64()
    }

    /// Record activity at the current instant. `Instant::now()` never goes
    /// backward, so the stored value is monotonically non-decreasing.
    pub fn mark_active(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
    }
}

impl Default for ActivityHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the input sampler: polls the probe and stamps the handle.
pub fn spawn_activity_sampler(
    mut probe: Box<dyn InputProbe>,
    handle: ActivityHandle,
    poll_ms: u64,
    mut stop: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(poll_ms));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if probe.poll_activity() {
                        handle.mark_active();
                    }
                }
                _ = stop.changed() => break,
            }
        }
        tracing::debug!("activity sampler stopped");
    })
}

// ─── Connectivity ────────────────────────────────────────────────

/// Run one reachability sample off the async threads.
///
/// A panicking probe counts as a failed probe: `Unknown`, no transition.
pub async fn sample_blocking(probe: Arc<dyn ReachabilityProbe>) -> Reachability {
    tokio::task::spawn_blocking(move || probe.probe())
        .await
        .unwrap_or(Reachability::Unknown)
}

/// Spawn the reachability sampler: probes on an interval, edge-detects,
/// and forwards transitions over the channel.
pub fn spawn_connectivity_sampler(
    probe: Arc<dyn ReachabilityProbe>,
    mut detector: EdgeDetector,
    tx: mpsc::Sender<bool>,
    poll_ms: u64,
    mut stop: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(poll_ms));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // A slow probe must not outlive the stop signal; the
                    // blocking thread is left to finish on its own.
                    let sample = tokio::select! {
                        sample = sample_blocking(Arc::clone(&probe)) => sample,
                        _ = stop.changed() => break,
                    };
                    if let Some(connected) = detector.observe(sample) {
                        tracing::debug!(connected, "reachability transition");
                        if tx.send(connected).await.is_err() {
                            // Decision loop is gone; nothing left to notify.
                            break;
                        }
                    }
                }
                _ = stop.changed() => break,
            }
        }
        tracing::debug!("connectivity sampler stopped");
    })
}
