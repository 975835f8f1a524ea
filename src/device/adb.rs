//! adb subprocess client

use crate::device::DeviceError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Client for executing adb as a subprocess
#[derive(Debug, Clone)]
pub struct AdbSubprocessClient {
    /// Path to adb executable
    adb_path: String,

    /// Timeout for command execution in seconds
    timeout_secs: u64,
}

impl AdbSubprocessClient {
    /// Create a new subprocess client
    ///
    /// # Arguments
    /// * `adb_path` - Path to adb executable (e.g., "adb", "/opt/sdk/platform-tools/adb")
    /// * `timeout_secs` - Timeout for command execution in seconds
    pub fn new(adb_path: String, timeout_secs: u64) -> Self {
        Self {
            adb_path,
            timeout_secs,
        }
    }

    pub fn adb_path(&self) -> &str {
        &self.adb_path
    }

    /// Run `adb -s <serial> <args..>` and capture stdout.
    ///
    /// # Errors
    /// Returns `DeviceError` if:
    /// - The adb executable cannot be spawned
    /// - adb exits with a non-zero status
    /// - The output is not valid UTF-8
    /// - The command times out
    pub async fn run(&self, serial: &str, args: &[&str]) -> Result<String, DeviceError> {
        debug!("Running {} -s {} {}", self.adb_path, serial, args.join(" "));

        let timeout_duration = Duration::from_secs(self.timeout_secs);

        let result = timeout(
            timeout_duration,
            Command::new(&self.adb_path)
                .arg("-s")
                .arg(serial)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| DeviceError::Timeout(self.timeout_secs))?;

        let output = result.map_err(|e| DeviceError::Spawn {
            program: self.adb_path.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!("adb exited with code {}: {}", code, stderr.trim());
            return Err(DeviceError::CommandFailed {
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        let content = String::from_utf8(output.stdout)
            .map_err(|e| DeviceError::Decode(e.to_string()))?;

        debug!("adb returned {} bytes of output", content.len());

        Ok(content)
    }

    /// Connection state reported by `adb get-state` (e.g. "device", "offline")
    pub async fn get_state(&self, serial: &str) -> Result<String, DeviceError> {
        let state = self.run(serial, &["get-state"]).await?;
        Ok(state.trim().to_string())
    }

    /// Install or replace a package with `adb install -r`
    pub async fn install(&self, serial: &str, apk: &Path) -> Result<String, DeviceError> {
        let apk = apk.to_string_lossy();
        self.run(serial, &["install", "-r", apk.as_ref()]).await
    }
}
