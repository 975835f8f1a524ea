//! Device client configuration

use crate::core::BuildConfiguration;
use std::path::PathBuf;

/// Configuration for the adb-backed device bridge
#[derive(Debug, Clone)]
pub struct DeviceClientConfig {
    /// Path to the adb executable.
    ///
    /// If not provided, defaults to "adb" (assumes it's on PATH).
    pub adb_path: Option<String>,

    /// Directory holding one sub-directory of APKs per build configuration
    pub apk_dir: PathBuf,

    /// File name of the application APK
    pub apk_name: String,

    /// File name of the launcher APK, installed on elevated workers
    pub launcher_apk_name: String,

    /// Hard limit on any single adb invocation, in seconds
    pub timeout_secs: u64,
}

impl Default for DeviceClientConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            apk_dir: PathBuf::from("out"),
            apk_name: "app.apk".to_string(),
            launcher_apk_name: "launcher.apk".to_string(),
            timeout_secs: 3600,
        }
    }
}

impl DeviceClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adb_path(mut self, adb_path: String) -> Self {
        self.adb_path = Some(adb_path);
        self
    }

    pub fn with_apk_dir(mut self, apk_dir: impl Into<PathBuf>) -> Self {
        self.apk_dir = apk_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Location of the application APK for a build configuration
    pub fn apk_path(&self, configuration: BuildConfiguration) -> PathBuf {
        self.apk_dir.join(configuration.as_str()).join(&self.apk_name)
    }

    /// Location of the launcher APK for a build configuration
    pub fn launcher_apk_path(&self, configuration: BuildConfiguration) -> PathBuf {
        self.apk_dir
            .join(configuration.as_str())
            .join(&self.launcher_apk_name)
    }
}
