//! Test: Host resolution - worker selection and the default configuration

use crate::helpers::*;
use buildhost::core::{FailureKind, StepParams};
use buildhost::execution::ExecutionEvent;

/// Unregistered hosts get one elevated worker named after the host
#[tokio::test]
async fn test_unknown_host_runs_with_default_worker() {
    let device = MockDevice::healthy();

    let (outcome, events) =
        run_with_device(&device, "build-laptop", "android_install", release_params()).await;

    assert_succeeded(&outcome);
    assert_eq!(outcome.worker.as_deref(), Some("build-laptop"));
    assert!(device.installs()[0].install_launcher);
    assert!(matches!(
        &events[0],
        ExecutionEvent::HostResolved { known: false, workers: 1, .. }
    ));
}

/// Non-elevated workers skip the launcher
#[tokio::test]
async fn test_non_elevated_worker_skips_launcher() {
    let device = MockDevice::healthy();
    let params = release_params().with_worker("skia-housekeeper");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_succeeded(&outcome);
    assert_eq!(outcome.worker.as_deref(), Some("skia-housekeeper"));
    assert!(!device.installs()[0].install_launcher);
}

/// Workers can be selected by index
#[tokio::test]
async fn test_worker_selected_by_index() {
    let device = MockDevice::healthy();
    let params = release_params().with_worker("1");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_succeeded(&outcome);
    assert_eq!(outcome.worker.as_deref(), Some("skia-android-build-000"));
}

/// The worker named after the host is preferred over the first one
#[tokio::test]
async fn test_worker_named_after_host_is_default() {
    let device = MockDevice::healthy();

    let (outcome, _) = run_with_device(&device, "skia-vm-001", "android_install", release_params()).await;

    assert_succeeded(&outcome);
    assert_eq!(outcome.worker.as_deref(), Some("skia-vm-001"));
    assert!(!device.installs()[0].install_launcher);
}

/// A selector matching no worker is a configuration error
#[tokio::test]
async fn test_unknown_worker_is_configuration_error() {
    let device = MockDevice::healthy();
    let params = release_params().with_worker("skia-android-build-999");

    let (outcome, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_eq!(outcome.worker, None);
    assert_eq!(device.reachable_count(), 0);
}

/// Hosts reserved without workers cannot run steps
#[tokio::test]
async fn test_zero_worker_host_is_configuration_error() {
    let device = MockDevice::healthy();

    let (outcome, events) =
        run_with_device(&device, "skia-vm-024", "android_install", release_params()).await;

    assert_failed_with(&outcome, FailureKind::Configuration);
    assert_eq!(outcome.worker, None);
    assert_eq!(device.reachable_count(), 0);
    assert!(matches!(
        &events[0],
        ExecutionEvent::HostResolved { known: true, workers: 0, .. }
    ));
}

/// Caller input never overrides the worker's elevated flag
#[tokio::test]
async fn test_elevation_is_not_caller_controlled() {
    let device = MockDevice::healthy();
    let params = StepParams {
        worker: Some("skia-housekeeper".to_string()),
        ..release_params()
    };

    let (_, _) = run_with_device(&device, "skia-vm-014", "android_install", params).await;

    assert!(!device.installs()[0].install_launcher);
}

/// A blank hostname is refused before any worker is synthesized
#[tokio::test]
async fn test_blank_hostname_is_configuration_error() {
    for hostname in ["", "   "] {
        let device = MockDevice::healthy();

        let (outcome, events) =
            run_with_device(&device, hostname, "android_install", release_params()).await;

        assert_failed_with(&outcome, FailureKind::Configuration);
        assert_transitions(&outcome, &["Failed"]);
        assert_eq!(outcome.worker, None);
        assert_eq!(device.reachable_count(), 0);
        assert!(device.installs().is_empty());
        assert!(!events
            .iter()
            .any(|event| matches!(event, ExecutionEvent::HostResolved { .. })));
    }
}
