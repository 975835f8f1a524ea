//! Test utilities for step scenarios

use async_trait::async_trait;
use buildhost::core::config::HostTable;
use buildhost::core::{FailureKind, HostRegistry, StepOutcome, StepParams, StepTimeouts};
use buildhost::device::{DeviceBridge, DeviceError, InstallReport};
use buildhost::execution::{ExecutionEvent, RunRequest, StepRunner};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Arguments of one recorded install call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCall {
    pub serial: String,
    pub release: bool,
    pub install_launcher: bool,
}

/// Mock device bridge with scripted answers and call counters
#[derive(Clone)]
pub struct MockDevice {
    reachable: Result<bool, DeviceError>,
    install_result: Result<Vec<String>, DeviceError>,
    validate_delay: Option<Duration>,
    install_delay: Option<Duration>,
    pub reachable_calls: Arc<AtomicUsize>,
    pub install_calls: Arc<Mutex<Vec<InstallCall>>>,
}

impl MockDevice {
    /// A device that is attached and accepts every install
    pub fn healthy() -> Self {
        Self {
            reachable: Ok(true),
            install_result: Ok(vec!["com.skia".to_string()]),
            validate_delay: None,
            install_delay: None,
            reachable_calls: Arc::new(AtomicUsize::new(0)),
            install_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A device adb does not list
    pub fn detached() -> Self {
        Self {
            reachable: Ok(false),
            ..Self::healthy()
        }
    }

    pub fn with_reachable(mut self, reachable: Result<bool, DeviceError>) -> Self {
        self.reachable = reachable;
        self
    }

    pub fn with_install_result(mut self, result: Result<Vec<String>, DeviceError>) -> Self {
        self.install_result = result;
        self
    }

    pub fn with_validate_delay(mut self, delay: Duration) -> Self {
        self.validate_delay = Some(delay);
        self
    }

    pub fn with_install_delay(mut self, delay: Duration) -> Self {
        self.install_delay = Some(delay);
        self
    }

    pub fn reachable_count(&self) -> usize {
        self.reachable_calls.load(Ordering::SeqCst)
    }

    pub fn installs(&self) -> Vec<InstallCall> {
        self.install_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceBridge for MockDevice {
    async fn is_reachable(&self, _serial: &str) -> Result<bool, DeviceError> {
        self.reachable_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.validate_delay {
            tokio::time::sleep(delay).await;
        }
        self.reachable.clone()
    }

    async fn install(
        &self,
        serial: &str,
        release: bool,
        install_launcher: bool,
    ) -> Result<InstallReport, DeviceError> {
        self.install_calls.lock().unwrap().push(InstallCall {
            serial: serial.to_string(),
            release,
            install_launcher,
        });
        if let Some(delay) = self.install_delay {
            tokio::time::sleep(delay).await;
        }
        self.install_result
            .clone()
            .map(|packages| InstallReport::new(packages, "Success".to_string()))
    }
}

/// Host table used across scenarios
pub const TEST_HOSTS: &str = r#"
hosts:
  skia-vm-014:
    workers:
      - [skia-android-canary, "0", true]
      - [skia-android-build-000, "1", true]
      - [skia-housekeeper, "2", false]
  skia-vm-024:
    workers: []
  skia-vm-001:
    workers:
      - [skia-vm-001, "0", false]
"#;

/// Registry over [`TEST_HOSTS`] with a fixed local root
pub fn test_registry() -> HostRegistry {
    let table = HostTable::from_yaml(TEST_HOSTS).expect("test host table is valid");
    HostRegistry::from_table(table).with_local_root(Path::new("/b/automation"))
}

/// Short limits so timeout scenarios finish quickly
pub fn fast_timeouts() -> StepTimeouts {
    StepTimeouts {
        validate: Duration::from_millis(200),
        install: Duration::from_millis(200),
    }
}

/// Parameters for a Release install on `emulator-5554`
pub fn release_params() -> StepParams {
    StepParams::new("Release").with_serial("emulator-5554")
}

/// Run one step through a fresh runner, collecting the events it emits
pub async fn run_with_device(
    device: &MockDevice,
    hostname: &str,
    step: &str,
    params: StepParams,
) -> (StepOutcome, Vec<ExecutionEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let runner = StepRunner::new(Arc::new(test_registry()), Arc::new(device.clone()))
        .with_timeouts(fast_timeouts())
        .with_event_handler(move |event| sink.lock().unwrap().push(event));

    let outcome = runner.run(&RunRequest::new(hostname, step, params)).await;
    let events = events.lock().unwrap().clone();
    (outcome, events)
}

/// Assert the run succeeded
pub fn assert_succeeded(outcome: &StepOutcome) {
    assert!(
        outcome.is_success(),
        "Expected run to succeed, got {:?} ({:?})",
        outcome.state,
        outcome.error()
    );
    assert_eq!(outcome.exit_code(), 0);
}

/// Assert the run failed with the given kind
pub fn assert_failed_with(outcome: &StepOutcome, kind: FailureKind) {
    assert_eq!(
        outcome.failure_kind(),
        Some(kind),
        "Expected {} failure, got {:?}",
        kind,
        outcome.state
    );
    assert_eq!(outcome.exit_code(), kind.exit_code());
}

/// Assert the recorded state names, in order
pub fn assert_transitions(outcome: &StepOutcome, expected: &[&str]) {
    let actual: Vec<&str> = outcome.transitions.iter().map(|t| t.to.as_str()).collect();
    assert_eq!(actual, expected, "Unexpected lifecycle");
}
