//! Step parameters

use crate::core::error::StepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Build configuration an artifact was produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildConfiguration {
    Release,
    Debug,
}

impl BuildConfiguration {
    pub const ALL: [BuildConfiguration; 2] = [BuildConfiguration::Release, BuildConfiguration::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Release => "Release",
            BuildConfiguration::Debug => "Debug",
        }
    }

    pub fn is_release(&self) -> bool {
        matches!(self, BuildConfiguration::Release)
    }
}

impl FromStr for BuildConfiguration {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildConfiguration::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                StepError::Configuration(format!(
                    "unrecognized build configuration '{}' (expected Release or Debug)",
                    s
                ))
            })
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied parameters for one step run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParams {
    /// Build configuration name, checked when the step runs
    pub configuration: String,

    /// Serial of the targeted device
    pub device_serial: Option<String>,

    /// Revision being built
    pub revision: Option<String>,

    /// Revision actually checked out, when it differs from the requested one
    pub got_revision: Option<String>,

    /// Worker to act as, by name or index
    pub worker: Option<String>,
}

impl StepParams {
    pub fn new(configuration: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            ..Self::default()
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.device_serial = Some(serial.into());
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_worker(mut self, worker: impl Into<String>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Parse the configuration name into the closed set
    pub fn build_configuration(&self) -> Result<BuildConfiguration, StepError> {
        self.configuration.parse()
    }
}

/// Time limits on the blocking device calls of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimeouts {
    pub validate: Duration,
    pub install: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            validate: Duration::from_secs(30),
            install: Duration::from_secs(600), // 10 minutes
        }
    }
}

impl StepTimeouts {
    pub fn from_secs(validate_secs: u64, install_secs: u64) -> Self {
        Self {
            validate: Duration::from_secs(validate_secs),
            install: Duration::from_secs(install_secs),
        }
    }
}
