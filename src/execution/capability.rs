//! Capabilities that concrete build steps are composed from
//!
//! Each capability is an independent trait. A step holds one implementation
//! of every capability it needs and sequences their calls itself, so no
//! capability is ever a special case of another.

use crate::core::{BuildConfiguration, StepError};
use crate::device::InstallReport;
use async_trait::async_trait;

/// Addresses a device on some platform and checks it before work starts
#[async_trait]
pub trait PlatformTargeted: Send + Sync {
    /// Platform name, e.g. "android"
    fn platform(&self) -> &str;

    /// Serial of the targeted device
    fn device_serial(&self) -> &str;

    /// Whether work on this target needs elevated device privileges
    fn requires_elevated_install(&self) -> bool;

    /// Check the device is present and addressable.
    ///
    /// Failures are reported as [`StepError::TargetUnreachable`].
    async fn validate_target(&self) -> Result<(), StepError>;
}

/// Everything an installer needs to place an artifact on a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub serial: String,
    pub configuration: BuildConfiguration,
    /// Also install the launcher; set for elevated workers only
    pub install_launcher: bool,
}

/// Places a built artifact onto a target
#[async_trait]
pub trait Installer: Send + Sync {
    /// Perform the install.
    ///
    /// Failures are reported as [`StepError::InstallFailure`] or
    /// [`StepError::InstallTimeout`].
    async fn install(&self, request: &InstallRequest) -> Result<InstallReport, StepError>;
}
