//! netdown-platform: OS boundary for the shutdown monitor.
//! Subprocess execution, input/reachability probes, power control, and
//! startup-task provisioning. No decision logic — pure IO boundary.

pub mod error;
pub mod executor;
pub mod input;
pub mod net;
pub mod power;
pub mod startup;

pub use error::PlatformError;
pub use executor::{CommandRunner, SystemExecutor};
pub use input::{InputProbe, NullInputProbe, default_input_probe};
pub use net::{ReachabilityProbe, TcpProbe};
pub use power::{PowerController, SystemPower};
pub use startup::{TASK_NAME, install_startup_task, remove_startup_task};
