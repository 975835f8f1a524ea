use anyhow::{Context, Result};
use buildhost::cli::commands::{HostCommand, HostsCommand, RunCommand};
use buildhost::cli::output::*;
use buildhost::cli::{user_hosts_path, Cli, Command};
use buildhost::core::HostRegistry;
use buildhost::device::AdbBridge;
use buildhost::execution::{RunRequest, StepKind, StepRunner};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG overrides --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let registry = load_registry(cli.hosts.as_deref())?;

    match &cli.command {
        Command::Run(cmd) => run_step(cmd, registry).await?,
        Command::Host(cmd) => show_host(cmd, &registry)?,
        Command::Hosts(cmd) => list_hosts(cmd, &registry)?,
        Command::Steps => list_steps(),
    }

    Ok(())
}

/// Explicit table, then the per-user table, then the built-in one
fn load_registry(explicit: Option<&Path>) -> Result<HostRegistry> {
    if let Some(path) = explicit {
        debug!("Loading host table from {}", path.display());
        return HostRegistry::from_file(path).context("Failed to load host table");
    }

    if let Some(path) = user_hosts_path().filter(|path| path.is_file()) {
        debug!("Loading host table from {}", path.display());
        return HostRegistry::from_file(&path).context("Failed to load per-user host table");
    }

    debug!("Using built-in host table");
    HostRegistry::builtin().context("Failed to load built-in host table")
}

async fn run_step(cmd: &RunCommand, registry: HostRegistry) -> Result<()> {
    let bridge = Arc::new(AdbBridge::new(cmd.to_device_config()));

    let spinner = create_spinner(format!("{} on {}", cmd.step, cmd.host));
    let printer = spinner.clone();
    let runner = StepRunner::new(Arc::new(registry), bridge)
        .with_timeouts(cmd.to_timeouts())
        .with_event_handler(move |event| {
            printer.println(format_execution_event(&event));
        });

    let request = RunRequest::new(&cmd.host, &cmd.step, cmd.to_params());
    let outcome = runner.run(&request).await;
    spinner.finish_and_clear();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("\n{}", format_outcome(&outcome));
    }

    if !outcome.is_success() {
        if let Some(e) = outcome.error() {
            error!("{}", e);
        }
        std::process::exit(outcome.exit_code());
    }

    Ok(())
}

fn show_host(cmd: &HostCommand, registry: &HostRegistry) -> Result<()> {
    let host = registry.resolve(&cmd.hostname);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&host)?);
    } else {
        println!("{}", format_host(&host, registry.is_known(&cmd.hostname)));
    }

    Ok(())
}

fn list_hosts(cmd: &HostsCommand, registry: &HostRegistry) -> Result<()> {
    if cmd.json {
        println!("{}", registry.to_json()?);
        return Ok(());
    }
    if cmd.yaml {
        print!("{}", registry.to_yaml()?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("{} No hosts registered", INFO);
        return Ok(());
    }

    println!("{} Registered hosts ({}):", INFO, style(registry.len()).cyan());
    for host in registry.hosts() {
        println!("{}", format_host_summary(host));
        if cmd.with_workers {
            for worker in &host.workers {
                println!("      [{}] {}", style(&worker.index).dim(), worker.name);
            }
        }
    }

    Ok(())
}

fn list_steps() {
    println!("{} Available steps:", INFO);
    for kind in StepKind::ALL {
        println!("{}", format_step_kind(kind));
    }
}
