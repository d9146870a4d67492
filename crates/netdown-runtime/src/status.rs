//! Console presentation of monitor events.
//!
//! Human mode mirrors the classic console layout: timestamped lines for
//! transitions and an in-place countdown while armed. JSON mode emits one
//! serialized event per line for machine consumption.

use std::cell::Cell;
use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use netdown_core::{MonitorConfig, MonitorEvent};

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock wrapper for JSON output; events themselves carry only
/// monotonic offsets.
#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a MonitorEvent,
}

pub struct Renderer {
    json: bool,
    /// True while the last write was the in-place countdown line.
    inline: Cell<bool>,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            inline: Cell::new(false),
        }
    }

    /// Print the startup banner. Suppressed in JSON mode.
    pub fn banner(&self, config: &MonitorConfig) {
        if self.json {
            return;
        }
        println!("===== netdown monitor started =====");
        println!(
            "the host will shut down after {} minute(s) of disconnected idle time",
            config.grace_minutes
        );
        println!("===================================");
    }

    pub fn emit(&self, event: &MonitorEvent) {
        if self.json {
            let line = JsonLine {
                ts: Local::now().to_rfc3339(),
                event,
            };
            match serde_json::to_string(&line) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!("failed to serialize event: {e}"),
            }
            return;
        }

        let line = format_event(event, Local::now());
        if let MonitorEvent::StatusTick { .. } = event {
            print!("\r{line}");
            let _ = std::io::stdout().flush();
            self.inline.set(true);
        } else {
            // Finish the countdown line before starting a fresh one.
            if self.inline.replace(false) {
                println!();
            }
            println!("{line}");
        }
    }
}

/// Human-readable line for an event, stamped with the given wall time.
pub fn format_event(event: &MonitorEvent, now: DateTime<Local>) -> String {
    let ts = now.format(STAMP_FORMAT);
    match event {
        MonitorEvent::ConnectivityChanged {
            connected: true, ..
        } => format!("[{ts}] network connected"),
        MonitorEvent::ConnectivityChanged {
            connected: false, ..
        } => format!("[{ts}] network disconnected"),
        MonitorEvent::TimerArmed { .. } => format!("[{ts}] shutdown timer armed"),
        MonitorEvent::TimerReset { .. } => {
            format!("[{ts}] user activity detected, shutdown timer reset")
        }
        MonitorEvent::StatusTick {
            remaining_secs,
            idle_secs,
        } => format!("[{ts}] shutdown in {remaining_secs}s | idle {idle_secs}s"),
        MonitorEvent::ShutdownFired { .. } => format!("[{ts}] executing shutdown command"),
        MonitorEvent::Terminated { .. } => format!("[{ts}] monitor terminated by operator"),
    }
}
