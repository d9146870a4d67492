//! CLI definition using clap derive.

use clap::Parser;
use netdown_core::MonitorConfig;

#[derive(Parser, Debug)]
#[command(
    name = "netdown",
    version,
    about = "Shut the host down after a period of disconnected idle time"
)]
pub struct Cli {
    /// Minutes of disconnected idle time before shutdown
    #[arg(
        short = 'i',
        long,
        default_value = "2",
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub grace_minutes: u32,

    /// Register the boot-time startup task and exit
    #[arg(short = 't', long)]
    pub install_task: bool,

    /// Remove the startup task and exit
    #[arg(long, conflicts_with = "install_task")]
    pub remove_task: bool,

    /// Decision tick cadence in milliseconds
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub tick_interval_ms: u64,

    /// Input sampling cadence in milliseconds
    #[arg(long, default_value = "100", value_name = "MS")]
    pub activity_poll_ms: u64,

    /// Reachability sampling cadence in milliseconds
    #[arg(long, default_value = "500", value_name = "MS")]
    pub net_poll_ms: u64,

    /// Reachability probe target, repeatable (default: 1.1.1.1:53, 8.8.8.8:53)
    #[arg(long = "probe-addr", value_name = "HOST:PORT")]
    pub probe_addrs: Vec<String>,

    /// Per-probe TCP connect timeout in milliseconds
    #[arg(long, default_value = "1500", value_name = "MS")]
    pub probe_timeout_ms: u64,

    /// Emit events as JSON lines instead of human-readable output
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn monitor_config(&self) -> MonitorConfig {
        let defaults = MonitorConfig::default();
        MonitorConfig {
            grace_minutes: self.grace_minutes,
            tick_interval_ms: self.tick_interval_ms,
            activity_poll_ms: self.activity_poll_ms,
            net_poll_ms: self.net_poll_ms,
            probe_addrs: if self.probe_addrs.is_empty() {
                defaults.probe_addrs
            } else {
                self.probe_addrs.clone()
            },
            probe_timeout_ms: self.probe_timeout_ms,
        }
    }
}
