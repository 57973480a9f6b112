//! Helpers shared by every resource handler: stabilization, fault reporting
//! and tag synchronisation.

use crate::api::QBusinessApi;
use log::{error, info};
use qbusiness_provider_common::{
    Action, BackoffScheduler, CallbackContext, ClassifiedFailure, ErrorClassifier,
    FailureContext, HandlerErrorCode, PollOutcome, ProbeMode, ProgressEvent, ProviderConfig,
    ProviderError, ProviderResult, ResourceRef, ServiceError, StabilizationPolicy,
    StabilizationStep, Stabilizer, StatusProbe, StatusSnapshot, Tag, TagDiff,
};

/// Prefix reserved for tags managed by AWS itself.
const SYSTEM_TAG_PREFIX: &str = "aws:";

/// Why a handler stopped before producing its final model.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Hand back IN_PROGRESS and resume from `context` after `delay_secs`.
    Suspend {
        context: CallbackContext,
        delay_secs: u64,
    },
    Fail(ClassifiedFailure),
}

impl From<ProviderError> for Halt {
    fn from(error: ProviderError) -> Self {
        let code = match error {
            ProviderError::InvalidRequest(_) | ProviderError::Config(_) => {
                HandlerErrorCode::InvalidRequest
            }
            ProviderError::Serialization(_) | ProviderError::Io(_) => {
                HandlerErrorCode::InternalFailure
            }
        };
        Halt::Fail(ClassifiedFailure::new(code, error.to_string()))
    }
}

pub type Step<T> = Result<T, Halt>;

/// Turn the result of a handler's steps into the event returned to CloudFormation.
pub fn conclude<M>(model: M, step: Step<ProgressEvent<M>>) -> ProgressEvent<M> {
    match step {
        Ok(event) => event,
        Err(Halt::Suspend {
            context,
            delay_secs,
        }) => ProgressEvent::in_progress(model, context, delay_secs),
        Err(Halt::Fail(failure)) => ProgressEvent::failed(Some(model), failure),
    }
}

/// A required model property, or an `InvalidRequest` halt naming it.
pub fn required<'m>(value: Option<&'m str>, property: &str) -> Step<&'m str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            Halt::from(ProviderError::invalid_request(format!(
                "{property} is required"
            )))
        })
}

/// One stabilization wait inside a handler.
pub struct Stabilization<'a, Pol: ?Sized> {
    pub type_name: &'static str,
    pub action: Action,
    pub step: StabilizationStep,
    pub default: BackoffScheduler,
    pub mode: ProbeMode,
    pub policy: &'a Pol,
}

/// Dependencies every handler receives: the service client, provider
/// configuration and the fault classifier.
pub struct HandlerContext<'a> {
    pub client: &'a dyn QBusinessApi,
    pub config: &'a ProviderConfig,
    pub classifier: ErrorClassifier,
}

impl<'a> HandlerContext<'a> {
    pub fn new(client: &'a dyn QBusinessApi, config: &'a ProviderConfig) -> Self {
        Self {
            client,
            config,
            classifier: ErrorClassifier,
        }
    }

    /// Classify a service fault, logging it as the request's failure.
    pub fn fail(&self, type_name: &str, identifier: &str, fault: &ServiceError) -> Halt {
        error!("{type_name} [{identifier}] {fault}");
        Halt::Fail(self.classifier.classify(
            fault,
            &FailureContext::new(type_name, identifier, &fault.api),
        ))
    }

    /// Wait for `target` per `wait`, resuming from the callback context when it
    /// holds a checkpoint for the same step.
    pub async fn stabilize<P, Pol>(
        &self,
        probe: &P,
        target: &ResourceRef,
        wait: Stabilization<'_, Pol>,
        callback: &CallbackContext,
    ) -> Step<Option<StatusSnapshot<P::Status>>>
    where
        P: StatusProbe + ?Sized,
        Pol: StabilizationPolicy<P::Status> + ?Sized,
    {
        let scheduler = self
            .config
            .scheduler_for(wait.type_name, wait.action, wait.default);
        let stabilizer =
            Stabilizer::new(scheduler).with_invocation_budget(self.config.invocation_budget());
        let identifier = target.to_string();
        let context = FailureContext::new(wait.type_name, &identifier, "");

        match stabilizer
            .run(probe, target, wait.policy, wait.mode, callback.resume_for(wait.step))
            .await
        {
            PollOutcome::Stable(snapshot) => Ok(snapshot),
            PollOutcome::Failed { message, .. } => {
                error!("{} [{}] failed to stabilize: {}", wait.type_name, identifier, message);
                Err(Halt::Fail(
                    self.classifier.not_stabilized(&context, Some(&message)),
                ))
            }
            PollOutcome::NotStabilized {
                attempts, elapsed, ..
            } => {
                let reason = format!(
                    "Timed out after {attempts} status check(s) over {}s",
                    elapsed.as_secs()
                );
                error!("{} [{}] {}", wait.type_name, identifier, reason);
                Err(Halt::Fail(
                    self.classifier.not_stabilized(&context, Some(&reason)),
                ))
            }
            PollOutcome::Faulted(fault) => Err(self.fail(wait.type_name, &identifier, &fault)),
            PollOutcome::Suspended(checkpoint) => Err(Halt::Suspend {
                context: CallbackContext::suspended(wait.step, checkpoint),
                delay_secs: checkpoint.delay_secs,
            }),
        }
    }

    /// Untag removed keys, then tag new or changed ones. Empty sets send nothing
    /// and never resolve `arn`.
    pub async fn apply_tag_diff(
        &self,
        type_name: &str,
        identifier: &str,
        arn: impl FnOnce() -> ProviderResult<String>,
        diff: &TagDiff,
    ) -> Step<()> {
        if !diff.should_update() {
            return Ok(());
        }
        let arn = arn()?;
        let arn = arn.as_str();

        let to_remove: Vec<String> = diff.to_remove().into_iter().collect();
        if !to_remove.is_empty() {
            info!("{type_name} [{identifier}] removing tags {to_remove:?}");
            self.client
                .untag_resource(arn, to_remove)
                .await
                .map_err(|e| self.fail(type_name, identifier, &e))?;
        }

        let to_add = diff.to_add();
        if !to_add.is_empty() {
            info!(
                "{type_name} [{identifier}] adding tags {:?}",
                to_add.keys().collect::<Vec<_>>()
            );
            self.client
                .tag_resource(arn, to_add)
                .await
                .map_err(|e| self.fail(type_name, identifier, &e))?;
        }
        Ok(())
    }

    /// Tags attached to `arn`, minus AWS-managed ones; `None` when there are none.
    pub async fn read_tags(
        &self,
        type_name: &str,
        identifier: &str,
        arn: &str,
    ) -> Step<Option<Vec<Tag>>> {
        let tags: Vec<Tag> = self
            .client
            .list_tags_for_resource(arn)
            .await
            .map_err(|e| self.fail(type_name, identifier, &e))?
            .into_iter()
            .filter(|tag| !tag.key.starts_with(SYSTEM_TAG_PREFIX))
            .collect();
        Ok((!tags.is_empty()).then_some(tags))
    }
}
