//! `AWS::QBusiness::Index`

use super::rfc3339;
use crate::api::types::{CreateIndexInput, IndexDetail, IndexStatus, UpdateIndexInput};
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

pub const TYPE_NAME: &str = "AWS::QBusiness::Index";

const DEFAULT_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(30), Duration::from_secs(4 * 60 * 60));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexCapacityConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_configuration: Option<IndexCapacityConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for IndexModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl IndexModel {
    fn from_detail(detail: IndexDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        Self {
            application_id: Some(detail.application_id),
            index_id: Some(detail.index_id),
            index_arn: Some(arn),
            display_name: detail.display_name,
            description: detail.description,
            index_type: detail.index_type,
            capacity_configuration: detail
                .capacity_units
                .map(|units| IndexCapacityConfiguration { units: Some(units) }),
            status: detail.status.map(|s| s.as_str().to_string()),
            created_at: rfc3339(detail.created_at),
            updated_at: rfc3339(detail.updated_at),
            tags,
        }
    }

    fn capacity_units(&self) -> Option<i32> {
        self.capacity_configuration.as_ref().and_then(|c| c.units)
    }

    fn identifier(&self) -> String {
        format!(
            "{}|{}",
            self.application_id.as_deref().unwrap_or_default(),
            self.index_id.as_deref().unwrap_or_default()
        )
    }
}

struct IndexProbe<'a> {
    client: &'a dyn QBusinessApi,
}

#[async_trait]
impl StatusProbe for IndexProbe<'_> {
    type Status = IndexStatus;

    async fn probe(&self, target: &ResourceRef) -> Result<StatusSnapshot<IndexStatus>, ServiceError> {
        let detail = self
            .client
            .get_index(target.application_id(), target.resource_id())
            .await?;
        let status = detail
            .status
            .unwrap_or_else(|| IndexStatus::Unknown(String::new()));
        Ok(StatusSnapshot::new(status).with_error(detail.error_message))
    }
}

struct ConvergePolicy;

impl StabilizationPolicy<IndexStatus> for ConvergePolicy {
    fn classify(&self, snapshot: &StatusSnapshot<IndexStatus>) -> Verdict {
        match snapshot.status {
            IndexStatus::Active => Verdict::Done,
            IndexStatus::Failed | IndexStatus::Deleting => Verdict::Failed(failure_reason(snapshot)),
            IndexStatus::Creating | IndexStatus::Updating | IndexStatus::Unknown(_) => {
                Verdict::InProgress
            }
        }
    }
}

struct DeletionPolicy;

impl StabilizationPolicy<IndexStatus> for DeletionPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<IndexStatus>) -> Verdict {
        match snapshot.status {
            IndexStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
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
    request: ResourceHandlerRequest<IndexModel>,
    callback: CallbackContext,
) -> ProgressEvent<IndexModel> {
    let mut model = request.desired_resource_state.clone().unwrap_or_default();
    let step = match action {
        Action::Create => create(ctx, &request, &callback, &mut model).await,
        Action::Read => read(ctx, &request, &model).await.map(ProgressEvent::success),
        Action::Update => update(ctx, &request, &callback, &model).await,
        Action::Delete => delete(ctx, &request, &callback, &model).await,
        Action::List => list(ctx, &request, &model).await,
    };
    conclude(model, step)
}

async fn create(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<IndexModel>,
    callback: &CallbackContext,
    model: &mut IndexModel,
) -> Step<ProgressEvent<IndexModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?.to_string();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}] Entering Create Handler for {}",
            request.stack_id(),
            application_id,
            TYPE_NAME
        );
        let input = CreateIndexInput {
            application_id: application_id.clone(),
            display_name: required(model.display_name.as_deref(), "DisplayName")?.to_string(),
            description: model.description.clone(),
            index_type: model.index_type.clone(),
            capacity_units: model.capacity_units(),
            client_token: request.client_request_token.clone(),
            tags: merge_create_tags(request),
        };
        let created = ctx
            .client
            .create_index(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        model.index_id = Some(created.id);
        model.index_arn = created.arn;
    }

    let index_id = required(model.index_id.as_deref(), "IndexId")?;
    let probe = IndexProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(&application_id, index_id),
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
    request: &ResourceHandlerRequest<IndexModel>,
    model: &IndexModel,
) -> Step<IndexModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let index_id = required(model.index_id.as_deref(), "IndexId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, IndexId: {}] Reading {}",
        request.stack_id(),
        application_id,
        index_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_index(application_id, index_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let arn = match detail.index_arn.clone() {
        Some(arn) => arn,
        None => ArnScope::from_request(request)?.child_arn(application_id, "index", index_id),
    };
    let tags = ctx.read_tags(TYPE_NAME, &identifier, &arn).await?;
    Ok(IndexModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<IndexModel>,
    callback: &CallbackContext,
    model: &IndexModel,
) -> Step<ProgressEvent<IndexModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let index_id = required(model.index_id.as_deref(), "IndexId")?;
    let identifier = model.identifier();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, IndexId: {}] Entering Update Handler",
            request.stack_id(),
            application_id,
            index_id
        );
        let input = UpdateIndexInput {
            application_id: application_id.to_string(),
            index_id: index_id.to_string(),
            display_name: model.display_name.clone(),
            description: model.description.clone(),
            capacity_units: model.capacity_units(),
        };
        ctx.client
            .update_index(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    }

    let probe = IndexProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, index_id),
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
        ArnScope::from_request(request)
            .map(|scope| scope.child_arn(application_id, "index", index_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, &identifier, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<IndexModel>,
    callback: &CallbackContext,
    model: &IndexModel,
) -> Step<ProgressEvent<IndexModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let index_id = required(model.index_id.as_deref(), "IndexId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, IndexId: {}] Entering Delete Handler",
            request.stack_id(),
            application_id,
            index_id
        );
        ctx.client
            .delete_index(application_id, index_id)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    }

    let probe = IndexProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, index_id),
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
    request: &ResourceHandlerRequest<IndexModel>,
    model: &IndexModel,
) -> Step<ProgressEvent<IndexModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let page = ctx
        .client
        .list_indices(application_id, request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let models = page
        .items
        .into_iter()
        .map(|index_id| IndexModel {
            application_id: Some(application_id.to_string()),
            index_id: Some(index_id),
            ..IndexModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, page.next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_converge_policy_surfaces_error_detail() {
        let snapshot = StatusSnapshot::new(IndexStatus::Failed)
            .with_error(Some("Capacity units exceed quota".to_string()));
        assert_eq!(
            ConvergePolicy.classify(&snapshot),
            Verdict::Failed("Capacity units exceed quota".to_string())
        );
        assert_eq!(
            ConvergePolicy.classify(&StatusSnapshot::new(IndexStatus::Updating)),
            Verdict::InProgress
        );
    }

    #[test]
    fn test_model_from_detail() {
        let detail = IndexDetail {
            application_id: "app".to_string(),
            index_id: "idx".to_string(),
            display_name: Some("Docs".to_string()),
            index_type: Some("ENTERPRISE".to_string()),
            capacity_units: Some(2),
            status: Some(IndexStatus::Active),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..IndexDetail::default()
        };
        let model = IndexModel::from_detail(detail, "arn:idx".to_string(), None);
        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({
                "ApplicationId": "app",
                "IndexId": "idx",
                "IndexArn": "arn:idx",
                "DisplayName": "Docs",
                "Type": "ENTERPRISE",
                "CapacityConfiguration": {"Units": 2},
                "Status": "ACTIVE",
                "CreatedAt": "2024-01-02T03:04:05Z"
            })
        );
    }

    #[test]
    fn test_identifier_joins_application_and_index() {
        let model = IndexModel {
            application_id: Some("app".to_string()),
            index_id: Some("idx".to_string()),
            ..IndexModel::default()
        };
        assert_eq!(model.identifier(), "app|idx");
    }
}
