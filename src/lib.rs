//! buildhost - build host registry and device build steps

pub mod cli;
pub mod core;
pub mod device;
pub mod execution;

// Re-export commonly used types
pub use core::{HostConfig, HostRegistry, StepContext, StepError, StepOutcome, StepState, WorkerSpec};
pub use device::{AdbBridge, DeviceBridge, DeviceError};
pub use execution::{AndroidInstall, BuildStep, ExecutionEvent, RunRequest, StepRunner};
