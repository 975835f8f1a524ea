//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{HostCommand, HostsCommand, RunCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Build host registry and device step runner
#[derive(Debug, Parser, Clone)]
#[command(name = "buildhost")]
#[command(version = "0.1.0")]
#[command(about = "Resolve build hosts and run device build steps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Host table file (defaults to the per-user table, then the built-in one)
    #[arg(long, global = true, env = "BUILDHOST_HOSTS")]
    pub hosts: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a build step against a worker
    Run(RunCommand),

    /// Show the resolved configuration of one host
    Host(HostCommand),

    /// List registered hosts
    Hosts(HostsCommand),

    /// List available build steps
    Steps,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

/// Per-user host table location, `<config_dir>/buildhost/hosts.yaml`
pub fn user_hosts_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("buildhost").join("hosts.yaml"))
}
