//! One-shot system shutdown action.

use crate::error::PlatformError;
use crate::executor::CommandRunner;

/// Trait seam for the shutdown side effect.
pub trait PowerController: Send {
    /// Fire-and-forget shutdown request. Callers invoke this at most once.
    fn shutdown(&self) -> Result<(), PlatformError>;
}

#[cfg(windows)]
const SHUTDOWN_CMD: (&str, &[&str]) = ("shutdown", &["/s", "/t", "0"]);
#[cfg(not(windows))]
const SHUTDOWN_CMD: (&str, &[&str]) = ("shutdown", &["-h", "now"]);

/// Issues the platform shutdown command through a `CommandRunner`.
#[derive(Debug, Clone)]
pub struct SystemPower<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SystemPower<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner + Send> PowerController for SystemPower<R> {
    fn shutdown(&self) -> Result<(), PlatformError> {
        let (program, args) = SHUTDOWN_CMD;
        self.runner.run(program, args).map(|_| ())
    }
}
