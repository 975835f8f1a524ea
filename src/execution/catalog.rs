//! Known build steps

use crate::{
    core::{StepContext, StepError},
    device::DeviceBridge,
    execution::{
        android::{AndroidInstall, ANDROID_INSTALL},
        step::BuildStep,
    },
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Steps that can be selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    AndroidInstall,
}

impl StepKind {
    pub const ALL: [StepKind; 1] = [StepKind::AndroidInstall];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::AndroidInstall => ANDROID_INSTALL,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepKind::AndroidInstall => "Install the built APK onto an attached Android device",
        }
    }

    /// Build the step for one run
    pub fn instantiate(
        &self,
        ctx: &StepContext,
        bridge: Arc<dyn DeviceBridge>,
    ) -> Result<Box<dyn BuildStep>, StepError> {
        match self {
            StepKind::AndroidInstall => Ok(Box::new(AndroidInstall::from_context(ctx, bridge)?)),
        }
    }
}

impl FromStr for StepKind {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| StepError::Configuration(format!("unknown step '{}'", s)))
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
