//! Startup-task provisioning via the Windows task scheduler.
//!
//! Registers the monitor binary to run at boot with the configured grace
//! period. Provisioning is a separate program mode and never touches the
//! monitoring core.

use std::path::Path;

use crate::error::PlatformError;
use crate::executor::CommandRunner;

/// Name of the scheduled task owned by this program.
pub const TASK_NAME: &str = "netdown-auto-shutdown";

/// Register the startup task, replacing any stale definition.
pub fn install_startup_task<R: CommandRunner>(
    runner: &R,
    executable: &Path,
    grace_minutes: u32,
) -> Result<(), PlatformError> {
    if !cfg!(windows) {
        return Err(PlatformError::Unsupported {
            feature: "startup task registration",
        });
    }
    install_with(runner, executable, grace_minutes)
}

/// Delete the startup task. Returns whether a task was actually removed.
pub fn remove_startup_task<R: CommandRunner>(runner: &R) -> Result<bool, PlatformError> {
    if !cfg!(windows) {
        return Err(PlatformError::Unsupported {
            feature: "startup task removal",
        });
    }
    remove_with(runner)
}

fn install_with<R: CommandRunner>(
    runner: &R,
    executable: &Path,
    grace_minutes: u32,
) -> Result<(), PlatformError> {
    // A stale task with the same name would shadow the new definition.
    let _ = remove_with(runner);

    let task_command = format!("\"{}\" --grace-minutes {}", executable.display(), grace_minutes);
    runner.run(
        "schtasks",
        &[
            "/Create",
            "/TN",
            TASK_NAME,
            "/SC",
            "ONSTART",
            "/TR",
            &task_command,
            "/RU",
            "SYSTEM",
            "/RL",
            "HIGHEST",
            "/F",
        ],
    )?;
    Ok(())
}

fn remove_with<R: CommandRunner>(runner: &R) -> Result<bool, PlatformError> {
    match runner.run("schtasks", &["/Delete", "/TN", TASK_NAME, "/F"]) {
        Ok(_) => Ok(true),
        // schtasks exits non-zero when the task does not exist.
        Err(PlatformError::CommandFailed(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
