//! Step failure taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error types for a build step run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    /// Invalid or unrecognized step parameters, raised before validation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The targeted device or worker could not be addressed
    #[error("Target unreachable: {0}")]
    TargetUnreachable(String),

    /// The install operation reported failure
    #[error("Install failed: {0}")]
    InstallFailure(String),

    /// The install operation did not finish in time
    #[error("Install timed out after {0:?}")]
    InstallTimeout(Duration),
}

impl StepError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StepError::Configuration(_) => FailureKind::Configuration,
            StepError::TargetUnreachable(_) => FailureKind::TargetUnreachable,
            StepError::InstallFailure(_) => FailureKind::InstallFailure,
            StepError::InstallTimeout(_) => FailureKind::InstallTimeout,
        }
    }
}

/// Tag of a failed run, used for reporting and process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    TargetUnreachable,
    InstallFailure,
    InstallTimeout,
}

impl FailureKind {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::Configuration => 2,
            FailureKind::TargetUnreachable => 3,
            FailureKind::InstallFailure => 4,
            FailureKind::InstallTimeout => 5,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Configuration => "ConfigurationError",
            FailureKind::TargetUnreachable => "TargetUnreachable",
            FailureKind::InstallFailure => "InstallFailure",
            FailureKind::InstallTimeout => "InstallTimeout",
        };
        f.write_str(name)
    }
}
