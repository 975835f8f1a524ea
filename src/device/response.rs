//! Device call results and errors

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Error types for device transport operations
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Device command exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("Install rejected by device: {0}")]
    Rejected(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Failed to decode device output: {0}")]
    Decode(String),
}

/// Report of a completed install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    /// Packages pushed to the device, in install order
    pub packages: Vec<String>,

    /// Raw transport output
    pub output: String,
}

impl InstallReport {
    pub fn new(packages: Vec<String>, output: String) -> Self {
        Self { packages, output }
    }
}

fn failure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Failure \[([A-Z0-9_]+)(?:[:\s][^\]]*)?\]").expect("failure pattern is valid")
    })
}

/// Check `adb install` output for a failure marker.
///
/// adb can exit 0 while printing `Failure [REASON]`, so the output decides.
pub fn check_install_output(output: &str) -> Result<(), DeviceError> {
    if let Some(captures) = failure_pattern().captures(output) {
        return Err(DeviceError::Rejected(captures[1].to_string()));
    }
    if output.contains("Failure") {
        return Err(DeviceError::Rejected(output.trim().to_string()));
    }
    Ok(())
}
