//! CommandRunner trait and SystemExecutor (sync subprocess wrapper).
//! The trait seam enables mock injection for testing.

use crate::error::PlatformError;

/// Trait for executing external commands.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, PlatformError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, PlatformError> {
        (**self).run(program, args)
    }
}

/// Real executor using `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandRunner for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, PlatformError> {
        let output = std::process::Command::new(program)
            .args(args)
            .output()
            .map_err(PlatformError::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlatformError::CommandFailed(format!(
                "{program} exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
