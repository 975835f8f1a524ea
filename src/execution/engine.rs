//! Step runner - resolves the host, builds the context and runs one step

use crate::{
    core::{
        FailureKind, HostRegistry, StateTransition, StepContext, StepError, StepOutcome,
        StepParams, StepState, StepTimeouts,
    },
    device::DeviceBridge,
    execution::{catalog::StepKind, step::run_to_completion},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// What the operator asked for
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Host the run executes on
    pub hostname: String,

    /// Step name, e.g. "android_install"
    pub step: String,

    pub params: StepParams,
}

impl RunRequest {
    pub fn new(hostname: impl Into<String>, step: impl Into<String>, params: StepParams) -> Self {
        Self {
            hostname: hostname.into(),
            step: step.into(),
            params,
        }
    }
}

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    HostResolved {
        hostname: String,
        known: bool,
        workers: usize,
    },
    StepStarted {
        run_id: Uuid,
        step: String,
        worker: String,
    },
    StepSucceeded {
        run_id: Uuid,
        step: String,
    },
    StepFailed {
        run_id: Uuid,
        step: String,
        kind: FailureKind,
        error: String,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Runs build steps against workers of registered hosts
pub struct StepRunner {
    registry: Arc<HostRegistry>,
    bridge: Arc<dyn DeviceBridge>,
    timeouts: StepTimeouts,
    event_handlers: Vec<EventHandler>,
}

impl StepRunner {
    pub fn new(registry: Arc<HostRegistry>, bridge: Arc<dyn DeviceBridge>) -> Self {
        Self {
            registry,
            bridge,
            timeouts: StepTimeouts::default(),
            event_handlers: Vec::new(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Run one step to a terminal state.
    ///
    /// Never returns early with an error: every failure is reported in the
    /// outcome's `Failed` state.
    pub async fn run(&self, request: &RunRequest) -> StepOutcome {
        if request.hostname.trim().is_empty() {
            return self.reject(
                request,
                StepError::Configuration("hostname must not be empty".to_string()),
            );
        }

        let host = self.registry.resolve(&request.hostname);
        let known = self.registry.is_known(&request.hostname);
        info!(
            "Resolved host {} ({}, {} workers)",
            host.hostname,
            if known { "registered" } else { "default configuration" },
            host.workers.len()
        );
        self.emit_event(ExecutionEvent::HostResolved {
            hostname: host.hostname.clone(),
            known,
            workers: host.workers.len(),
        });

        let kind: StepKind = match request.step.parse() {
            Ok(kind) => kind,
            Err(e) => return self.reject(request, e),
        };

        let mut ctx = match StepContext::for_host(host, request.params.clone()) {
            Ok(ctx) => ctx.with_timeouts(self.timeouts),
            Err(e) => return self.reject(request, e),
        };

        if let Some(revision) = ctx.params.revision.clone() {
            ctx.set_metadata("revision", revision);
        }
        if let Some(got_revision) = ctx.params.got_revision.clone() {
            ctx.set_metadata("got_revision", got_revision);
        }

        let step = match kind.instantiate(&ctx, self.bridge.clone()) {
            Ok(step) => step,
            Err(e) => {
                error!("Could not set up step {}: {}", kind, e);
                ctx.mark_failed(&e);
                self.emit_failure(ctx.run_id, kind.name(), &e);
                return ctx.into_outcome(kind.name());
            }
        };

        info!(
            "Starting step {} on {} as worker {} (run {})",
            kind, ctx.host.hostname, ctx.worker.name, ctx.run_id
        );
        self.emit_event(ExecutionEvent::StepStarted {
            run_id: ctx.run_id,
            step: kind.name().to_string(),
            worker: ctx.worker.name.clone(),
        });

        match run_to_completion(step.as_ref(), &mut ctx).await {
            Ok(()) => self.emit_event(ExecutionEvent::StepSucceeded {
                run_id: ctx.run_id,
                step: kind.name().to_string(),
            }),
            Err(e) => self.emit_failure(ctx.run_id, kind.name(), &e),
        }

        ctx.into_outcome(kind.name())
    }

    /// Outcome for a run that failed before a context existed
    fn reject(&self, request: &RunRequest, e: StepError) -> StepOutcome {
        error!("Rejecting step {} on {}: {}", request.step, request.hostname, e);
        let run_id = Uuid::new_v4();
        self.emit_failure(run_id, &request.step, &e);

        StepOutcome {
            run_id,
            step: request.step.clone(),
            hostname: request.hostname.clone(),
            worker: None,
            state: StepState::failed(&e),
            transitions: vec![StateTransition {
                from: StepState::Created.name().to_string(),
                to: "Failed".to_string(),
                at: Utc::now(),
            }],
        }
    }

    fn emit_failure(&self, run_id: Uuid, step: &str, e: &StepError) {
        self.emit_event(ExecutionEvent::StepFailed {
            run_id,
            step: step.to_string(),
            kind: e.kind(),
            error: e.to_string(),
        });
    }
}
