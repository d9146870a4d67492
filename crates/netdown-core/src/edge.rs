//! Reachability edge detection.
//!
//! Samples are compared against the last *reported* state; the consumer is
//! notified only on a transition, never on steady state. A failed probe is
//! `Unknown` and produces no notification — probe errors must not
//! masquerade as connectivity changes.

use serde::{Deserialize, Serialize};

/// Tri-state probe outcome. `Unknown` means the probe itself could not be
/// evaluated and carries no connectivity information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Online,
    Offline,
    Unknown,
}

impl Reachability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

/// Edge detector over reachability samples.
///
/// The first definite sample is always reported, so the consumer starts
/// with an initial state assumption.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    last_reported: Option<bool>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one probe sample. Returns `Some(connected)` iff the consumer
    /// should be notified.
    pub fn observe(&mut self, sample: Reachability) -> Option<bool> {
        let connected = match sample {
            Reachability::Online => true,
            Reachability::Offline => false,
            Reachability::Unknown => return None,
        };
        if self.last_reported == Some(connected) {
            return None;
        }
        self.last_reported = Some(connected);
        Some(connected)
    }

    /// Last state delivered to the consumer, if any.
    pub fn last_reported(&self) -> Option<bool> {
        self.last_reported
    }
}
