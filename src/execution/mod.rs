//! Build step execution

pub mod android;
pub mod capability;
pub mod catalog;
pub mod engine;
pub mod step;

pub use android::{AndroidInstall, AndroidTarget, ApkInstaller, ANDROID_INSTALL};
pub use capability::{InstallRequest, Installer, PlatformTargeted};
pub use catalog::StepKind;
pub use engine::{EventHandler, ExecutionEvent, RunRequest, StepRunner};
pub use step::{run_to_completion, BuildStep, InstallStep};
