//! Android capabilities and the install-to-Android step

use crate::{
    core::{StepContext, StepError},
    device::{DeviceBridge, DeviceError, InstallReport},
    execution::{
        capability::{InstallRequest, Installer, PlatformTargeted},
        step::InstallStep,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Step name of [`AndroidInstall`]
pub const ANDROID_INSTALL: &str = "android_install";

/// An Android device addressed by serial
pub struct AndroidTarget {
    serial: String,
    has_root: bool,
    bridge: Arc<dyn DeviceBridge>,
}

impl AndroidTarget {
    /// Address the device named in the context.
    ///
    /// The elevated flag is taken from the selected worker, never from caller input.
    pub fn from_context(ctx: &StepContext, bridge: Arc<dyn DeviceBridge>) -> Result<Self, StepError> {
        Ok(Self {
            serial: ctx.device_serial()?.to_string(),
            has_root: ctx.requires_elevated_install(),
            bridge,
        })
    }
}

#[async_trait]
impl PlatformTargeted for AndroidTarget {
    fn platform(&self) -> &str {
        "android"
    }

    fn device_serial(&self) -> &str {
        &self.serial
    }

    fn requires_elevated_install(&self) -> bool {
        self.has_root
    }

    async fn validate_target(&self) -> Result<(), StepError> {
        match self.bridge.is_reachable(&self.serial).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StepError::TargetUnreachable(format!(
                "device {} is not attached",
                self.serial
            ))),
            Err(e) => {
                warn!("Could not query device {}: {}", self.serial, e);
                Err(StepError::TargetUnreachable(format!(
                    "device {}: {}",
                    self.serial, e
                )))
            }
        }
    }
}

/// Installs APKs through the device bridge
pub struct ApkInstaller {
    bridge: Arc<dyn DeviceBridge>,
}

impl ApkInstaller {
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Installer for ApkInstaller {
    async fn install(&self, request: &InstallRequest) -> Result<InstallReport, StepError> {
        self.bridge
            .install(
                &request.serial,
                request.configuration.is_release(),
                request.install_launcher,
            )
            .await
            .map_err(|e| match e {
                DeviceError::Timeout(secs) => StepError::InstallTimeout(Duration::from_secs(secs)),
                other => StepError::InstallFailure(other.to_string()),
            })
    }
}

/// Install the built APK onto an attached Android device
pub type AndroidInstall = InstallStep<AndroidTarget, ApkInstaller>;

impl InstallStep<AndroidTarget, ApkInstaller> {
    pub fn from_context(ctx: &StepContext, bridge: Arc<dyn DeviceBridge>) -> Result<Self, StepError> {
        let target = AndroidTarget::from_context(ctx, bridge.clone())?;
        Ok(InstallStep::new(ANDROID_INSTALL, target, ApkInstaller::new(bridge)))
    }
}
