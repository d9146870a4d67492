//! Reachability probing via TCP connect.
//!
//! A connect to any configured target within the timeout means online; all
//! targets failing means offline. If no target can even be resolved the
//! sample is `Unknown`, which the edge detector swallows.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use netdown_core::Reachability;

/// Trait seam for reachability sampling. Implementations may block; the
/// runtime polls them off the async threads.
pub trait ReachabilityProbe: Send + Sync {
    fn probe(&self) -> Reachability;
}

/// Probes by opening a TCP connection to each target until one succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    targets: Vec<String>,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(targets: Vec<String>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }

    fn resolve(target: &str) -> Vec<SocketAddr> {
        target
            .to_socket_addrs()
            .map(|addrs| addrs.collect())
            .unwrap_or_default()
    }
}

impl ReachabilityProbe for TcpProbe {
    fn probe(&self) -> Reachability {
        let mut resolved_any = false;
        for target in &self.targets {
            for addr in Self::resolve(target) {
                resolved_any = true;
                if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                    return Reachability::Online;
                }
            }
        }
        if resolved_any {
            Reachability::Offline
        } else {
            Reachability::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn local_listener_is_online() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let probe = TcpProbe::new(vec![addr.to_string()], Duration::from_millis(500));
        assert_eq!(probe.probe(), Reachability::Online);
    }

    #[test]
    fn closed_port_is_offline() {
        // Bind to grab an ephemeral port, then free it before probing.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr")
        };
        let probe = TcpProbe::new(vec![addr.to_string()], Duration::from_millis(500));
        assert_eq!(probe.probe(), Reachability::Offline);
    }

    #[test]
    fn unresolvable_target_is_unknown() {
        let probe = TcpProbe::new(
            vec!["no-such-host.invalid:53".to_string()],
            Duration::from_millis(500),
        );
        assert_eq!(probe.probe(), Reachability::Unknown);
    }
}
