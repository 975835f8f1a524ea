//! Test: Android install - the happy path and each failure kind

use crate::helpers::*;
use buildhost::core::{FailureKind, StepParams};
use buildhost::device::DeviceError;
use buildhost::execution::ExecutionEvent;

/// A Release install on an attached device succeeds and installs the launcher for elevated workers
#[tokio::test]
async fn test_release_install_succeeds() {
    let device = MockDevice::healthy();

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", release_params()).await;

    assert_succeeded(&outcome);
    assert_transitions(&outcome, &["Validated", "Executing", "Succeeded"]);
    assert_eq!(outcome.worker.as_deref(), Some("skia-android-canary"));
    assert_eq!(device.reachable_count(), 1);
    assert_eq!(
        device.installs(),
        vec![InstallCall {
            serial: "emulator-5554".to_string(),
            release: true,
            install_launcher: true,
        }]
    );
}

/// Debug builds select the Debug artifacts
#[tokio::test]
async fn test_debug_install_uses_debug_artifacts() {
    let device = MockDevice::healthy();
    let params = StepParams::new("Debug").with_serial("emulator-5554");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_succeeded(&outcome);
    assert!(!device.installs()[0].release);
}

/// A detached device fails validation and the installer is never invoked
#[tokio::test]
async fn test_unreachable_device_never_installs() {
    let device = MockDevice::detached();

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", release_params()).await;

    assert_failed_with(&outcome, FailureKind::TargetUnreachable);
    assert_transitions(&outcome, &["Failed"]);
    assert_eq!(device.reachable_count(), 1);
    assert!(device.installs().is_empty());
}

/// A bridge that cannot even query the device counts as unreachable
#[tokio::test]
async fn test_bridge_error_during_validation_is_unreachable() {
    let device = MockDevice::healthy().with_reachable(Err(DeviceError::CommandFailed {
        code: 1,
        stderr: "error: no devices/emulators found".to_string(),
    }));

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", release_params()).await;

    assert_failed_with(&outcome, FailureKind::TargetUnreachable);
    assert!(device.installs().is_empty());
}

/// An unrecognised configuration fails before the device is contacted
#[tokio::test]
async fn test_unknown_configuration_fails_before_validation() {
    let device = MockDevice::healthy();
    let params = StepParams::new("Nightly").with_serial("emulator-5554");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_transitions(&outcome, &["Failed"]);
    assert_eq!(device.reachable_count(), 0);
    assert!(device.installs().is_empty());
    assert!(outcome.error().unwrap().contains("Nightly"));
}

/// Configuration names are case-sensitive
#[tokio::test]
async fn test_lowercase_configuration_is_rejected() {
    let device = MockDevice::healthy();
    let params = StepParams::new("release").with_serial("emulator-5554");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_eq!(device.reachable_count(), 0);
}

/// A run without a device serial cannot be set up
#[tokio::test]
async fn test_missing_serial_is_configuration_error() {
    let device = MockDevice::healthy();

    let (outcome, _) =
        run_with_device(&device, "skia-vm-014", "android_install", StepParams::new("Release")).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_eq!(device.reachable_count(), 0);
}

/// A rejected install is an install failure after validation succeeded
#[tokio::test]
async fn test_rejected_install_is_install_failure() {
    let device = MockDevice::healthy().with_install_result(Err(DeviceError::Rejected(
        "INSTALL_FAILED_INSUFFICIENT_STORAGE".to_string(),
    )));

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", release_params()).await;

    assert_failed_with(&outcome, FailureKind::InstallFailure);
    assert_transitions(&outcome, &["Validated", "Executing", "Failed"]);
    assert!(outcome.error().unwrap().contains("INSTALL_FAILED_INSUFFICIENT_STORAGE"));
}

/// Unknown step names are configuration errors with no worker selected
#[tokio::test]
async fn test_unknown_step_is_rejected() {
    let device = MockDevice::healthy();

    let (outcome, events) = run_with_device(&device, "skia-vm-014", "ios_install", release_params()).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_eq!(outcome.worker, None);
    assert_eq!(outcome.step, "ios_install");
    assert_eq!(device.reachable_count(), 0);
    assert!(matches!(events.last(), Some(ExecutionEvent::StepFailed { .. })));
}

/// Events are emitted in order for a successful run
#[tokio::test]
async fn test_events_for_successful_run() {
    let device = MockDevice::healthy();

    let (outcome, events) = run_with_device(&device, "skia-vm-014", "android_install", release_params()).await;

    assert_succeeded(&outcome);
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        ExecutionEvent::HostResolved { hostname, known: true, workers: 3 } if hostname == "skia-vm-014"
    ));
    assert!(matches!(
        &events[1],
        ExecutionEvent::StepStarted { worker, .. } if worker == "skia-android-canary"
    ));
    assert!(matches!(
        &events[2],
        ExecutionEvent::StepSucceeded { run_id, .. } if *run_id == outcome.run_id
    ));
}
