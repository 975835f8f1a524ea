//! Step context - the environment owned by one step run

use crate::core::{
    error::StepError,
    host::{HostConfig, WorkerSpec},
    state::{StateTransition, StepOutcome, StepState},
    step::{BuildConfiguration, StepParams, StepTimeouts},
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Execution context for a single step run.
///
/// Owned by exactly one run and dropped when it ends.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Unique run ID
    pub run_id: Uuid,

    /// Host the run executes on
    pub host: HostConfig,

    /// Worker the run acts as
    pub worker: WorkerSpec,

    /// Caller-supplied parameters
    pub params: StepParams,

    /// Limits on device calls
    pub timeouts: StepTimeouts,

    /// Accumulated step state (key -> value)
    pub metadata: HashMap<String, String>,

    state: StepState,

    transitions: Vec<StateTransition>,
}

impl StepContext {
    /// Create a context in the `Created` state
    pub fn new(host: HostConfig, worker: WorkerSpec, params: StepParams) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            host,
            worker,
            params,
            timeouts: StepTimeouts::default(),
            metadata: HashMap::new(),
            state: StepState::Created,
            transitions: Vec::new(),
        }
    }

    /// Build a context for a host, selecting the worker named in `params`
    pub fn for_host(host: HostConfig, params: StepParams) -> Result<Self, StepError> {
        let worker = host.select_worker(params.worker.as_deref())?.clone();
        Ok(Self::new(host, worker, params))
    }

    pub fn with_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Move to the next lifecycle state.
    ///
    /// Illegal moves are refused and leave the state untouched.
    pub fn advance(&mut self, next: StepState) -> bool {
        if !self.state.can_advance_to(&next) {
            warn!(
                "Run {}: refusing transition {} -> {}",
                self.run_id,
                self.state.name(),
                next.name()
            );
            return false;
        }

        debug!("Run {}: {} -> {}", self.run_id, self.state.name(), next.name());
        self.transitions.push(StateTransition {
            from: self.state.name().to_string(),
            to: next.name().to_string(),
            at: Utc::now(),
        });
        self.state = next;
        true
    }

    pub fn mark_validated(&mut self) -> bool {
        self.advance(StepState::Validated { validated_at: Utc::now() })
    }

    pub fn mark_executing(&mut self) -> bool {
        self.advance(StepState::Executing { started_at: Utc::now() })
    }

    pub fn mark_succeeded(&mut self) -> bool {
        let started_at = match &self.state {
            StepState::Executing { started_at } => *started_at,
            _ => Utc::now(),
        };
        self.advance(StepState::Succeeded {
            started_at,
            completed_at: Utc::now(),
        })
    }

    pub fn mark_failed(&mut self, error: &StepError) -> bool {
        self.advance(StepState::failed(error))
    }

    /// Parsed build configuration
    pub fn build_configuration(&self) -> Result<BuildConfiguration, StepError> {
        self.params.build_configuration()
    }

    /// Serial of the targeted device
    pub fn device_serial(&self) -> Result<&str, StepError> {
        self.params
            .device_serial
            .as_deref()
            .filter(|serial| !serial.is_empty())
            .ok_or_else(|| StepError::Configuration("no target device serial given".to_string()))
    }

    /// Elevated-install flag of the selected worker
    pub fn requires_elevated_install(&self) -> bool {
        self.worker.elevated_install
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }

    /// Close the run and report its outcome
    pub fn into_outcome(self, step: &str) -> StepOutcome {
        StepOutcome {
            run_id: self.run_id,
            step: step.to_string(),
            hostname: self.host.hostname,
            worker: Some(self.worker.name),
            state: self.state,
            transitions: self.transitions,
        }
    }
}
