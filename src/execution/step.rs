//! Build step contract and capability composition

use crate::{
    core::{StepContext, StepError},
    execution::capability::{InstallRequest, Installer, PlatformTargeted},
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// A named unit of pipeline work.
///
/// Instantiated per run, borrows the run's context while executing, and is
/// discarded afterwards.
#[async_trait]
pub trait BuildStep: Send + Sync {
    /// Step name as used on the command line
    fn name(&self) -> &str;

    /// Execute the step body.
    ///
    /// Implementations advance the context through `Validated` and
    /// `Executing`; the terminal state is settled by [`run_to_completion`].
    async fn run(&self, ctx: &mut StepContext) -> Result<(), StepError>;
}

/// Run a step and settle the context in `Succeeded` or `Failed`
pub async fn run_to_completion(
    step: &dyn BuildStep,
    ctx: &mut StepContext,
) -> Result<(), StepError> {
    let result = step.run(ctx).await;
    match &result {
        Ok(()) => {
            ctx.mark_succeeded();
            info!("Step {} succeeded (run {})", step.name(), ctx.run_id);
        }
        Err(e) => {
            ctx.mark_failed(e);
            error!("Step {} failed (run {}): {}", step.name(), ctx.run_id, e);
        }
    }
    result
}

/// A step that validates a platform target, then installs onto it.
///
/// The order is fixed: the build configuration is checked first, then the
/// target is validated, and only a validated target reaches the installer.
pub struct InstallStep<T, I> {
    name: String,
    target: T,
    installer: I,
}

impl<T: PlatformTargeted, I: Installer> InstallStep<T, I> {
    pub fn new(name: impl Into<String>, target: T, installer: I) -> Self {
        Self {
            name: name.into(),
            target,
            installer,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    async fn validate(&self, ctx: &StepContext) -> Result<(), StepError> {
        let limit = ctx.timeouts.validate;
        match timeout(limit, self.target.validate_target()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ StepError::TargetUnreachable(_))) => Err(e),
            Ok(Err(e)) => Err(StepError::TargetUnreachable(e.to_string())),
            Err(_) => Err(StepError::TargetUnreachable(format!(
                "{} device {} did not answer within {:?}",
                self.target.platform(),
                self.target.device_serial(),
                limit
            ))),
        }
    }
}

#[async_trait]
impl<T: PlatformTargeted, I: Installer> BuildStep for InstallStep<T, I> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &mut StepContext) -> Result<(), StepError> {
        let configuration = ctx.build_configuration()?;

        info!(
            "{}: validating {} device {} for worker {}",
            self.name,
            self.target.platform(),
            self.target.device_serial(),
            ctx.worker.name
        );
        self.validate(ctx).await?;
        ctx.mark_validated();

        let request = InstallRequest {
            serial: self.target.device_serial().to_string(),
            configuration,
            install_launcher: self.target.requires_elevated_install(),
        };

        ctx.mark_executing();
        info!(
            "{}: installing {} build on {} (launcher: {})",
            self.name, configuration, request.serial, request.install_launcher
        );

        let limit = ctx.timeouts.install;
        let report = match timeout(limit, self.installer.install(&request)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e @ (StepError::InstallFailure(_) | StepError::InstallTimeout(_)))) => {
                return Err(e)
            }
            Ok(Err(e)) => return Err(StepError::InstallFailure(e.to_string())),
            Err(_) => return Err(StepError::InstallTimeout(limit)),
        };

        debug!("{}: installed {:?}", self.name, report.packages);
        ctx.set_metadata("installed_packages", report.packages.join(","));
        ctx.set_metadata("configuration", configuration.as_str());

        Ok(())
    }
}
