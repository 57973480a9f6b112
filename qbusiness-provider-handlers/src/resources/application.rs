//! `AWS::QBusiness::Application`

use super::rfc3339;
use crate::api::types::{
    ApplicationDetail, ApplicationStatus, CreateApplicationInput, UpdateApplicationInput,
};
use crate::api::QBusinessApi;
use crate::support::{conclude, required, HandlerContext, Stabilization, Step};
use async_trait::async_trait;
use log::info;
use qbusiness_provider_common::arn::ArnScope;
use qbusiness_provider_common::stabilize::failure_reason;
use qbusiness_provider_common::tags::merge_create_tags;
use qbusiness_provider_common::{
    Action, BackoffScheduler, CallbackContext, ProbeMode, ProgressEvent, ResourceHandlerRequest,
    ResourceRef, ServiceError, StabilizationPolicy, StabilizationStep, StatusProbe, StatusSnapshot,
    Tag, TagDiff, Tagged, Verdict,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TYPE_NAME: &str = "AWS::QBusiness::Application";

const DEFAULT_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(30), Duration::from_secs(4 * 60 * 60));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_center_instance_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_center_application_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for ApplicationModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl ApplicationModel {
    fn from_detail(detail: ApplicationDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        Self {
            application_id: Some(detail.application_id),
            application_arn: Some(arn),
            display_name: detail.display_name,
            description: detail.description,
            role_arn: detail.role_arn,
            identity_center_instance_arn: None,
            identity_center_application_arn: detail.identity_center_application_arn,
            status: detail.status.map(|s| s.as_str().to_string()),
            created_at: rfc3339(detail.created_at),
            updated_at: rfc3339(detail.updated_at),
            tags,
        }
    }

    fn identifier(&self) -> String {
        self.application_id.clone().unwrap_or_default()
    }
}

struct ApplicationProbe<'a> {
    client: &'a dyn QBusinessApi,
}

#[async_trait]
impl StatusProbe for ApplicationProbe<'_> {
    type Status = ApplicationStatus;

    async fn probe(
        &self,
        target: &ResourceRef,
    ) -> Result<StatusSnapshot<ApplicationStatus>, ServiceError> {
        let detail = self.client.get_application(target.application_id()).await?;
        let status = detail
            .status
            .unwrap_or_else(|| ApplicationStatus::Unknown(String::new()));
        Ok(StatusSnapshot::new(status).with_error(detail.error_message))
    }
}

/// Create and update both settle on ACTIVE.
struct ConvergePolicy;

impl StabilizationPolicy<ApplicationStatus> for ConvergePolicy {
    fn classify(&self, snapshot: &StatusSnapshot<ApplicationStatus>) -> Verdict {
        match snapshot.status {
            ApplicationStatus::Active => Verdict::Done,
            ApplicationStatus::Failed | ApplicationStatus::Deleting => {
                Verdict::Failed(failure_reason(snapshot))
            }
            ApplicationStatus::Creating
            | ApplicationStatus::Updating
            | ApplicationStatus::Unknown(_) => Verdict::InProgress,
        }
    }
}

/// Deletion completes when the application is gone; FAILED stops the wait.
struct DeletionPolicy;

impl StabilizationPolicy<ApplicationStatus> for DeletionPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<ApplicationStatus>) -> Verdict {
        match snapshot.status {
            ApplicationStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
            _ => Verdict::InProgress,
        }
    }
}

fn wait<'a, Pol: ?Sized>(
    action: Action,
    step: StabilizationStep,
    mode: ProbeMode,
    policy: &'a Pol,
) -> Stabilization<'a, Pol> {
    Stabilization {
        type_name: TYPE_NAME,
        action,
        step,
        default: DEFAULT_BACKOFF,
        mode,
        policy,
    }
}

pub async fn handle(
    ctx: &HandlerContext<'_>,
    action: Action,
    request: ResourceHandlerRequest<ApplicationModel>,
    callback: CallbackContext,
) -> ProgressEvent<ApplicationModel> {
    let mut model = request.desired_resource_state.clone().unwrap_or_default();
    let step = match action {
        Action::Create => create(ctx, &request, &callback, &mut model).await,
        Action::Read => read(ctx, &request, &model).await.map(ProgressEvent::success),
        Action::Update => update(ctx, &request, &callback, &model).await,
        Action::Delete => delete(ctx, &request, &callback, &model).await,
        Action::List => list(ctx, &request).await,
    };
    conclude(model, step)
}

async fn create(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<ApplicationModel>,
    callback: &CallbackContext,
    model: &mut ApplicationModel,
) -> Step<ProgressEvent<ApplicationModel>> {
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}] Entering Create Handler for {}",
            request.stack_id(),
            TYPE_NAME
        );
        let input = CreateApplicationInput {
            display_name: required(model.display_name.as_deref(), "DisplayName")?.to_string(),
            description: model.description.clone(),
            role_arn: model.role_arn.clone(),
            identity_center_instance_arn: model.identity_center_instance_arn.clone(),
            client_token: request.client_request_token.clone(),
            tags: merge_create_tags(request),
        };
        let created = ctx
            .client
            .create_application(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        info!(
            "[StackId: {}, ApplicationId: {}] Application created",
            request.stack_id(),
            created.id
        );
        model.application_id = Some(created.id);
        model.application_arn = created.arn;
    }

    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let probe = ApplicationProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::application(application_id),
        wait(
            Action::Create,
            StabilizationStep::Create,
            ProbeMode::Converge,
            &ConvergePolicy,
        ),
        callback,
    )
    .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn read(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<ApplicationModel>,
    model: &ApplicationModel,
) -> Step<ApplicationModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    info!(
        "[StackId: {}, ApplicationId: {}] Reading {}",
        request.stack_id(),
        application_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_application(application_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let arn = match detail.application_arn.clone() {
        Some(arn) => arn,
        None => ArnScope::from_request(request)?.application_arn(application_id),
    };
    let tags = ctx.read_tags(TYPE_NAME, application_id, &arn).await?;
    Ok(ApplicationModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<ApplicationModel>,
    callback: &CallbackContext,
    model: &ApplicationModel,
) -> Step<ProgressEvent<ApplicationModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}] Entering Update Handler",
            request.stack_id(),
            application_id
        );
        let input = UpdateApplicationInput {
            application_id: application_id.to_string(),
            display_name: model.display_name.clone(),
            description: model.description.clone(),
            role_arn: model.role_arn.clone(),
            identity_center_instance_arn: model.identity_center_instance_arn.clone(),
        };
        ctx.client
            .update_application(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    }

    let probe = ApplicationProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::application(application_id),
        wait(
            Action::Update,
            StabilizationStep::Update,
            ProbeMode::Converge,
            &ConvergePolicy,
        ),
        callback,
    )
    .await?;

    let arn = || {
        ArnScope::from_request(request).map(|scope| scope.application_arn(application_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, application_id, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<ApplicationModel>,
    callback: &CallbackContext,
    model: &ApplicationModel,
) -> Step<ProgressEvent<ApplicationModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}] Entering Delete Handler",
            request.stack_id(),
            application_id
        );
        ctx.client
            .delete_application(application_id)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    }

    let probe = ApplicationProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::application(application_id),
        wait(
            Action::Delete,
            StabilizationStep::Delete,
            ProbeMode::ConfirmDeletion,
            &DeletionPolicy,
        ),
        callback,
    )
    .await?;
    Ok(ProgressEvent::deleted())
}

async fn list(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<ApplicationModel>,
) -> Step<ProgressEvent<ApplicationModel>> {
    let page = ctx
        .client
        .list_applications(request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, "", &e))?;
    let models = page
        .items
        .into_iter()
        .map(|application_id| ApplicationModel {
            application_id: Some(application_id),
            ..ApplicationModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, page.next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ApplicationStatus::Active, Verdict::Done)]
    #[case(ApplicationStatus::Creating, Verdict::InProgress)]
    #[case(ApplicationStatus::Updating, Verdict::InProgress)]
    #[case(ApplicationStatus::Deleting, Verdict::Failed("Resource failed to stabilize".to_string()))]
    #[case(ApplicationStatus::Failed, Verdict::Failed("Resource failed to stabilize".to_string()))]
    fn test_converge_policy(#[case] status: ApplicationStatus, #[case] expected: Verdict) {
        assert_eq!(ConvergePolicy.classify(&StatusSnapshot::new(status)), expected);
    }

    #[test]
    fn test_deletion_policy_waits_until_gone() {
        assert_eq!(
            DeletionPolicy.classify(&StatusSnapshot::new(ApplicationStatus::Deleting)),
            Verdict::InProgress
        );
        let failed = StatusSnapshot::new(ApplicationStatus::Failed)
            .with_error(Some("KMS key disabled".to_string()));
        assert_eq!(
            DeletionPolicy.classify(&failed),
            Verdict::Failed("KMS key disabled".to_string())
        );
    }

    #[test]
    fn test_model_uses_pascal_case_and_skips_unset_fields() {
        let model = ApplicationModel {
            application_id: Some("app-1".to_string()),
            display_name: Some("Search".to_string()),
            tags: Some(vec![Tag::new("team", "search")]),
            ..ApplicationModel::default()
        };
        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({
                "ApplicationId": "app-1",
                "DisplayName": "Search",
                "Tags": [{"Key": "team", "Value": "search"}]
            })
        );
    }
}
