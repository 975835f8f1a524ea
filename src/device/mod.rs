//! Device transport used by build steps

pub mod adb;
pub mod client;
pub mod response;

use crate::core::BuildConfiguration;
use async_trait::async_trait;
pub use adb::AdbSubprocessClient;
pub use client::DeviceClientConfig;
pub use response::{check_install_output, DeviceError, InstallReport};
use tracing::{debug, info};

/// Trait for device communication - allows for different implementations
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// Whether the device answers and is ready for commands
    async fn is_reachable(&self, serial: &str) -> Result<bool, DeviceError>;

    /// Place the built artifact for the given configuration onto the device
    async fn install(
        &self,
        serial: &str,
        release: bool,
        install_launcher: bool,
    ) -> Result<InstallReport, DeviceError>;
}

/// Device bridge that drives adb as a subprocess
#[derive(Debug, Clone)]
pub struct AdbBridge {
    client: AdbSubprocessClient,
    config: DeviceClientConfig,
}

impl AdbBridge {
    /// Create a new adb bridge
    ///
    /// The `config.adb_path` field is used as the path to the adb executable.
    /// If not provided, defaults to "adb" (assuming it's on PATH).
    pub fn new(config: DeviceClientConfig) -> Self {
        let adb_path = config.adb_path.clone().unwrap_or_else(|| "adb".to_string());
        let client = AdbSubprocessClient::new(adb_path, config.timeout_secs);
        Self { client, config }
    }

    pub fn config(&self) -> &DeviceClientConfig {
        &self.config
    }
}

#[async_trait]
impl DeviceBridge for AdbBridge {
    async fn is_reachable(&self, serial: &str) -> Result<bool, DeviceError> {
        match self.client.get_state(serial).await {
            Ok(state) => {
                debug!("Device {} state: {}", serial, state);
                Ok(state == "device")
            }
            // adb exits non-zero when the serial is not attached
            Err(DeviceError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn install(
        &self,
        serial: &str,
        release: bool,
        install_launcher: bool,
    ) -> Result<InstallReport, DeviceError> {
        let configuration = if release {
            BuildConfiguration::Release
        } else {
            BuildConfiguration::Debug
        };

        let mut apks = vec![self.config.apk_path(configuration)];
        if install_launcher {
            apks.push(self.config.launcher_apk_path(configuration));
        }

        let mut packages = Vec::new();
        let mut output = String::new();
        for apk in apks {
            info!("Installing {} on {}", apk.display(), serial);
            let result = self.client.install(serial, &apk).await?;
            check_install_output(&result)?;
            output.push_str(&result);
            packages.push(apk.display().to_string());
        }

        Ok(InstallReport::new(packages, output))
    }
}
