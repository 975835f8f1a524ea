//! Host and worker domain model

use crate::core::error::StepError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source file for the standard provisioning rule
pub const BOT_PASSWORD_SOURCE: &str = ".bot_password";

/// Destination of the standard provisioning rule
pub const BOT_PASSWORD_DESTINATION: &str = "build/site_config";

/// Worker index given to the single worker of a synthesized host
pub const DEFAULT_WORKER_INDEX: &str = "0";

/// One logical build-worker identity hosted on a machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Worker name, as known to the build master
    pub name: String,

    /// Opaque worker index; never parsed, gaps carry no meaning
    pub index: String,

    /// Whether installs for this worker need elevated device privileges
    pub elevated_install: bool,
}

impl WorkerSpec {
    pub fn new(name: impl Into<String>, index: impl Into<String>, elevated_install: bool) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
            elevated_install,
        }
    }
}

/// A file placement needed before a worker can operate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    pub source: String,
    pub destination: String,
}

impl CopyRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// The provisioning set every ordinary build checkout receives
    pub fn standard_set() -> Vec<CopyRule> {
        vec![CopyRule::new(BOT_PASSWORD_SOURCE, BOT_PASSWORD_DESTINATION)]
    }
}

/// Network address of a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkAddress {
    /// Host has a fixed address
    Static(String),
    /// Host is known to have no static address
    NoStatic,
    /// Nothing is known (synthesized configuration)
    Unknown,
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkAddress::Static(addr) => write!(f, "{}", addr),
            NetworkAddress::NoStatic => write!(f, "(no static IP)"),
            NetworkAddress::Unknown => write!(f, "unknown"),
        }
    }
}

/// Physical KVM switch attachment of a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KvmAttachment {
    Attached { switch: String, port: String },
    NotAttached,
    Unknown,
}

impl fmt::Display for KvmAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvmAttachment::Attached { switch, port } => write!(f, "{} / {}", switch, port),
            KvmAttachment::NotAttached => write!(f, "(not on KVM)"),
            KvmAttachment::Unknown => write!(f, "not present"),
        }
    }
}

/// Operating system family a host boots its worker launcher on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPlatform {
    Unix,
    Windows,
}

impl LaunchPlatform {
    /// Platform of the machine this process runs on
    pub fn current() -> Self {
        if cfg!(windows) {
            LaunchPlatform::Windows
        } else {
            LaunchPlatform::Unix
        }
    }

    /// Path segments of the boot-time launch script, relative to the automation root
    pub fn launch_script(&self) -> Vec<String> {
        let script = match self {
            LaunchPlatform::Unix => "skiabot-slave-start-on-boot.sh",
            LaunchPlatform::Windows => "skiabot-slave-start-on-boot.bat",
        };
        vec!["scripts".to_string(), script.to_string()]
    }
}

/// Full topology of one build host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host name (registry key, never empty)
    pub hostname: String,

    /// Workers hosted on this machine, in declaration order
    pub workers: Vec<WorkerSpec>,

    /// Provisioning copy rules; `None` when not applicable to this host
    pub copies: Option<Vec<CopyRule>>,

    pub network: NetworkAddress,

    pub kvm: KvmAttachment,

    /// Path segments of the build-automation checkout; `None` when the host has none
    pub automation_root: Option<Vec<String>>,

    /// Path segments of the launch script
    pub launch_script: Vec<String>,
}

impl HostConfig {
    /// Look up a worker by name
    pub fn worker(&self, name: &str) -> Option<&WorkerSpec> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// Look up a worker by its index
    pub fn worker_by_index(&self, index: &str) -> Option<&WorkerSpec> {
        self.workers.iter().find(|w| w.index == index)
    }

    /// Choose the worker a run should act as.
    ///
    /// A selector matches a worker name first, then an index. Without a
    /// selector the worker named after the host wins, else the first one.
    pub fn select_worker(&self, selector: Option<&str>) -> Result<&WorkerSpec, StepError> {
        if self.workers.is_empty() {
            return Err(StepError::Configuration(format!(
                "host '{}' has no provisioned workers",
                self.hostname
            )));
        }

        match selector {
            Some(selector) => self
                .worker(selector)
                .or_else(|| self.worker_by_index(selector))
                .ok_or_else(|| {
                    StepError::Configuration(format!(
                        "host '{}' has no worker named or indexed '{}'",
                        self.hostname, selector
                    ))
                }),
            None => Ok(self
                .worker(&self.hostname)
                .unwrap_or(&self.workers[0])),
        }
    }

    /// Whether this host is reserved but carries no workers yet
    pub fn is_unprovisioned(&self) -> bool {
        self.workers.is_empty()
    }

    /// Launch script joined with the platform separator
    pub fn launch_script_path(&self) -> std::path::PathBuf {
        self.launch_script.iter().collect()
    }
}
