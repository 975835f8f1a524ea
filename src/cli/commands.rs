//! CLI command definitions

use crate::core::{StepParams, StepTimeouts};
use crate::device::DeviceClientConfig;
use clap::builder::NonEmptyStringValueParser;
use clap::Args;
use std::path::PathBuf;

/// Run a build step
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Step name (see `buildhost steps`)
    pub step: String,

    /// Host the step runs on
    #[arg(long, env = "HOSTNAME", value_parser = NonEmptyStringValueParser::new())]
    pub host: String,

    /// Worker to act as, by name or index
    #[arg(short, long)]
    pub worker: Option<String>,

    /// Build configuration (Release or Debug)
    #[arg(short, long)]
    pub configuration: String,

    /// Serial of the target device
    #[arg(short, long, env = "ANDROID_SERIAL")]
    pub serial: Option<String>,

    /// Revision being built
    #[arg(long)]
    pub revision: Option<String>,

    /// Revision actually checked out
    #[arg(long)]
    pub got_revision: Option<String>,

    /// Seconds to wait for the target to answer
    #[arg(long, default_value_t = 30)]
    pub validate_timeout: u64,

    /// Seconds to wait for the install to finish
    #[arg(long, default_value_t = 600)]
    pub install_timeout: u64,

    /// Path to the adb executable
    #[arg(long, env = "ADB")]
    pub adb: Option<String>,

    /// Directory holding per-configuration APK directories
    #[arg(long, default_value = "out")]
    pub apk_dir: PathBuf,

    /// Application APK file name
    #[arg(long, default_value = "app.apk")]
    pub apk_name: String,

    /// Launcher APK file name
    #[arg(long, default_value = "launcher.apk")]
    pub launcher_apk_name: String,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub fn to_params(&self) -> StepParams {
        StepParams {
            configuration: self.configuration.clone(),
            device_serial: self.serial.clone(),
            revision: self.revision.clone(),
            got_revision: self.got_revision.clone(),
            worker: self.worker.clone(),
        }
    }

    pub fn to_timeouts(&self) -> StepTimeouts {
        StepTimeouts::from_secs(self.validate_timeout, self.install_timeout)
    }

    pub fn to_device_config(&self) -> DeviceClientConfig {
        let mut config = DeviceClientConfig::new().with_apk_dir(self.apk_dir.clone());
        if let Some(adb) = &self.adb {
            config = config.with_adb_path(adb.clone());
        }
        config.apk_name = self.apk_name.clone();
        config.launcher_apk_name = self.launcher_apk_name.clone();
        // The step timeouts are the real limit; adb itself only needs a backstop
        config.with_timeout(self.validate_timeout.max(self.install_timeout) + 60)
    }
}

/// Show one host
#[derive(Debug, Args, Clone)]
pub struct HostCommand {
    /// Hostname to resolve
    #[arg(env = "HOSTNAME", value_parser = NonEmptyStringValueParser::new())]
    pub hostname: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List registered hosts
#[derive(Debug, Args, Clone)]
pub struct HostsCommand {
    /// Dump the full table as JSON
    #[arg(long, conflicts_with = "yaml")]
    pub json: bool,

    /// Dump the full table as YAML
    #[arg(long)]
    pub yaml: bool,

    /// Show each host's workers
    #[arg(long)]
    pub with_workers: bool,
}
