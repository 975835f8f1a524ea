//! Step lifecycle state

use crate::core::error::{FailureKind, StepError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a single step run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// Step instantiated, nothing checked yet
    Created,
    /// Target passed its pre-run check
    Validated { validated_at: DateTime<Utc> },
    /// Main operation in progress
    Executing { started_at: DateTime<Utc> },
    /// Step finished successfully
    Succeeded {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Step failed; no retry happens at this layer
    Failed {
        kind: FailureKind,
        error: String,
        failed_at: DateTime<Utc>,
    },
}

impl StepState {
    pub fn failed(error: &StepError) -> Self {
        StepState::Failed {
            kind: error.kind(),
            error: error.to_string(),
            failed_at: Utc::now(),
        }
    }

    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepState::Succeeded { .. } | StepState::Failed { .. })
    }

    /// Short state name for logs and output
    pub fn name(&self) -> &'static str {
        match self {
            StepState::Created => "Created",
            StepState::Validated { .. } => "Validated",
            StepState::Executing { .. } => "Executing",
            StepState::Succeeded { .. } => "Succeeded",
            StepState::Failed { .. } => "Failed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_advance_to(&self, next: &StepState) -> bool {
        matches!(
            (self, next),
            (StepState::Created, StepState::Validated { .. })
                | (StepState::Validated { .. }, StepState::Executing { .. })
                | (StepState::Executing { .. }, StepState::Succeeded { .. })
                | (StepState::Created, StepState::Failed { .. })
                | (StepState::Validated { .. }, StepState::Failed { .. })
                | (StepState::Executing { .. }, StepState::Failed { .. })
        )
    }
}

/// A recorded state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: String,
    pub to: String,
    pub at: DateTime<Utc>,
}

/// Final result of a step run, handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Unique run ID
    pub run_id: Uuid,

    /// Name of the step that ran
    pub step: String,

    pub hostname: String,

    /// Worker the step acted as, if one could be selected
    pub worker: Option<String>,

    /// Terminal state of the run
    pub state: StepState,

    /// Every state change, in order
    pub transitions: Vec<StateTransition>,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.state, StepState::Succeeded { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.state {
            StepState::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            StepState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Process exit status: 0 on success, per-kind non-zero on failure
    pub fn exit_code(&self) -> i32 {
        match &self.state {
            StepState::Succeeded { .. } => 0,
            StepState::Failed { kind, .. } => kind.exit_code(),
            // A run is always settled before it is reported
            _ => 1,
        }
    }
}
