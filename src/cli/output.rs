//! CLI output formatting

use crate::{
    core::{HostConfig, StepOutcome, StepState},
    execution::{ExecutionEvent, StepKind},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner shown while a step runs
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Created => style("CREATED").dim().to_string(),
        StepState::Validated { .. } => style("VALIDATED").cyan().to_string(),
        StepState::Executing { .. } => style("EXECUTING").yellow().to_string(),
        StepState::Succeeded { .. } => style("SUCCEEDED").green().to_string(),
        StepState::Failed { kind, .. } => style(format!("FAILED ({})", kind)).red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::HostResolved {
            hostname,
            known,
            workers,
        } => {
            if *known {
                format!(
                    "{} Host {} ({} workers)",
                    INFO,
                    style(hostname).bold(),
                    style(workers).cyan()
                )
            } else {
                format!(
                    "{} Host {} is not registered, using the default configuration",
                    WARN,
                    style(hostname).bold()
                )
            }
        }
        ExecutionEvent::StepStarted {
            run_id,
            step,
            worker,
        } => format!(
            "{} Starting {} as {} ({})",
            ROCKET,
            style(step).bold(),
            style(worker).cyan(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepSucceeded { step, .. } => {
            format!("{} {}", CHECK, style(step).green())
        }
        ExecutionEvent::StepFailed {
            step, kind, error, ..
        } => format!(
            "{} {} [{}]: {}",
            CROSS,
            style(step).red(),
            kind,
            style(error).dim()
        ),
    }
}

/// Format the final outcome of a run
pub fn format_outcome(outcome: &StepOutcome) -> String {
    let icon = if outcome.is_success() { CHECK } else { CROSS };
    let worker = outcome.worker.as_deref().unwrap_or("-");
    let mut out = format!(
        "{} {} on {} as {} - {}",
        icon,
        style(&outcome.step).bold(),
        style(&outcome.hostname).bold(),
        style(worker).cyan(),
        format_step_state(&outcome.state)
    );

    if let Some(error) = outcome.error() {
        out.push_str(&format!("\n  {}", style(error).red()));
    }

    if let (Some(first), Some(last)) = (outcome.transitions.first(), outcome.transitions.last()) {
        if let Ok(elapsed) = last.at.signed_duration_since(first.at).to_std() {
            out.push_str(&format!("\n  Duration: {}", style(format_duration(elapsed)).dim()));
        }
    }

    out
}

/// Format one host's topology, one field per line
pub fn format_host(host: &HostConfig, known: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}{}",
        INFO,
        style(&host.hostname).bold(),
        if known {
            String::new()
        } else {
            style(" (default configuration)").yellow().to_string()
        }
    ));

    if host.workers.is_empty() {
        lines.push(format!("  Workers: {}", style("none provisioned").dim()));
    } else {
        lines.push("  Workers:".to_string());
        for worker in &host.workers {
            lines.push(format!(
                "    [{}] {}{}",
                style(&worker.index).dim(),
                style(&worker.name).cyan(),
                if worker.elevated_install {
                    style(" (elevated install)").dim().to_string()
                } else {
                    String::new()
                }
            ));
        }
    }

    match &host.copies {
        Some(copies) => {
            lines.push("  Copies:".to_string());
            for copy in copies {
                lines.push(format!("    {} -> {}", copy.source, copy.destination));
            }
        }
        None => lines.push(format!("  Copies: {}", style("none").dim())),
    }

    lines.push(format!("  IP: {}", host.network));
    lines.push(format!("  KVM: {}", host.kvm));
    lines.push(format!(
        "  Automation root: {}",
        host.automation_root
            .as_ref()
            .map(|segments| segments.join("/"))
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!("  Launch script: {}", host.launch_script_path().display()));

    lines.join("\n")
}

/// One-line summary of a host for listings
pub fn format_host_summary(host: &HostConfig) -> String {
    if host.is_unprovisioned() {
        format!("  {} {}", style(&host.hostname).bold(), style("(unprovisioned)").dim())
    } else {
        format!(
            "  {} ({} workers)",
            style(&host.hostname).bold(),
            style(host.workers.len()).cyan()
        )
    }
}

/// One line per catalogued step
pub fn format_step_kind(kind: StepKind) -> String {
    format!("  {} - {}", style(kind.name()).bold(), kind.description())
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
