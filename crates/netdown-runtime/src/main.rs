//! netdown: unattended disconnect-idle shutdown trigger.
//! Single-process binary: two sampling loops plus one decision loop.

use clap::Parser;

mod cli;
mod monitor;
mod sensors;
mod status;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("NETDOWN_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if args.install_task || args.remove_task {
        return provision(&args);
    }

    let config = args.monitor_config();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let renderer = status::Renderer::new(args.json);
    renderer.banner(&config);

    tracing::info!(grace_minutes = config.grace_minutes, "netdown monitor starting");
    let outcome = monitor::run_monitor(config, renderer).await?;
    tracing::info!(?outcome, "netdown monitor stopped");
    Ok(())
}

/// Startup-task provisioning modes. Exits this program mode only; the
/// monitoring core is never started.
fn provision(args: &cli::Cli) -> anyhow::Result<()> {
    use netdown_platform::{SystemExecutor, TASK_NAME, install_startup_task, remove_startup_task};

    let executor = SystemExecutor;

    if args.remove_task {
        match remove_startup_task(&executor) {
            Ok(true) => println!("startup task {TASK_NAME} removed"),
            Ok(false) => println!("no startup task to remove"),
            Err(e) => return Err(anyhow::Error::new(e).context("failed to remove startup task")),
        }
        return Ok(());
    }

    let executable = std::env::current_exe()?;
    match install_startup_task(&executor, &executable, args.grace_minutes) {
        Ok(()) => {
            println!(
                "startup task {TASK_NAME} registered: runs at boot with a {} minute grace period",
                args.grace_minutes
            );
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(
            "failed to register startup task; creating a system task requires an elevated (administrator) prompt",
        )),
    }
}
