//! `AWS::QBusiness::Retriever`

use super::rfc3339;
use crate::api::types::{
    CreateRetrieverInput, RetrieverConfig, RetrieverDetail, RetrieverStatus, UpdateRetrieverInput,
};
use crate::api::QBusinessApi;
use crate::support::{conclude, required, Halt, HandlerContext, Stabilization, Step};
use async_trait::async_trait;
use log::info;
use qbusiness_provider_common::arn::ArnScope;
use qbusiness_provider_common::stabilize::failure_reason;
use qbusiness_provider_common::tags::merge_create_tags;
use qbusiness_provider_common::{
    Action, BackoffScheduler, CallbackContext, ProbeMode, ProgressEvent, ProviderError,
    ResourceHandlerRequest, ResourceRef, ServiceError, StabilizationPolicy, StabilizationStep,
    StatusProbe, StatusSnapshot, Tag, TagDiff, Tagged, Verdict,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TYPE_NAME: &str = "AWS::QBusiness::Retriever";

const DEFAULT_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(30), Duration::from_secs(4 * 60 * 60));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
}

/// Exactly one of the two members is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrieverConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_index_configuration: Option<IndexReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kendra_index_configuration: Option<IndexReference>,
}

impl RetrieverConfiguration {
    fn to_api(&self) -> Step<RetrieverConfig> {
        let index_id = |reference: &IndexReference, property: &str| {
            required(reference.index_id.as_deref(), property).map(str::to_string)
        };
        match (
            &self.native_index_configuration,
            &self.kendra_index_configuration,
        ) {
            (Some(native), None) => Ok(RetrieverConfig::NativeIndex {
                index_id: index_id(native, "NativeIndexConfiguration.IndexId")?,
            }),
            (None, Some(kendra)) => Ok(RetrieverConfig::KendraIndex {
                index_id: index_id(kendra, "KendraIndexConfiguration.IndexId")?,
            }),
            _ => Err(Halt::from(ProviderError::invalid_request(
                "Configuration must set exactly one of NativeIndexConfiguration or KendraIndexConfiguration",
            ))),
        }
    }

    fn from_api(config: RetrieverConfig) -> Self {
        match config {
            RetrieverConfig::NativeIndex { index_id } => Self {
                native_index_configuration: Some(IndexReference {
                    index_id: Some(index_id),
                }),
                kendra_index_configuration: None,
            },
            RetrieverConfig::KendraIndex { index_id } => Self {
                native_index_configuration: None,
                kendra_index_configuration: Some(IndexReference {
                    index_id: Some(index_id),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrieverModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriever_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriever_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub retriever_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<RetrieverConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for RetrieverModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl RetrieverModel {
    fn from_detail(detail: RetrieverDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        Self {
            application_id: Some(detail.application_id),
            retriever_id: Some(detail.retriever_id),
            retriever_arn: Some(arn),
            display_name: detail.display_name,
            retriever_type: detail.retriever_type,
            configuration: detail.configuration.map(RetrieverConfiguration::from_api),
            role_arn: detail.role_arn,
            status: detail.status.map(|s| s.as_str().to_string()),
            created_at: rfc3339(detail.created_at),
            updated_at: rfc3339(detail.updated_at),
            tags,
        }
    }

    fn identifier(&self) -> String {
        format!(
            "{}|{}",
            self.application_id.as_deref().unwrap_or_default(),
            self.retriever_id.as_deref().unwrap_or_default()
        )
    }
}

struct RetrieverProbe<'a> {
    client: &'a dyn QBusinessApi,
}

#[async_trait]
impl StatusProbe for RetrieverProbe<'_> {
    type Status = RetrieverStatus;

    async fn probe(
        &self,
        target: &ResourceRef,
    ) -> Result<StatusSnapshot<RetrieverStatus>, ServiceError> {
        let detail = self
            .client
            .get_retriever(target.application_id(), target.resource_id())
            .await?;
        Ok(StatusSnapshot::new(
            detail
                .status
                .unwrap_or_else(|| RetrieverStatus::Unknown(String::new())),
        ))
    }
}

struct ConvergePolicy;

impl StabilizationPolicy<RetrieverStatus> for ConvergePolicy {
    fn classify(&self, snapshot: &StatusSnapshot<RetrieverStatus>) -> Verdict {
        match snapshot.status {
            RetrieverStatus::Active => Verdict::Done,
            RetrieverStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
            RetrieverStatus::Creating | RetrieverStatus::Unknown(_) => Verdict::InProgress,
        }
    }
}

struct DeletionPolicy;

impl StabilizationPolicy<RetrieverStatus> for DeletionPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<RetrieverStatus>) -> Verdict {
        match snapshot.status {
            RetrieverStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
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
    request: ResourceHandlerRequest<RetrieverModel>,
    callback: CallbackContext,
) -> ProgressEvent<RetrieverModel> {
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
    request: &ResourceHandlerRequest<RetrieverModel>,
    callback: &CallbackContext,
    model: &mut RetrieverModel,
) -> Step<ProgressEvent<RetrieverModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?.to_string();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}] Entering Create Handler for {}",
            request.stack_id(),
            application_id,
            TYPE_NAME
        );
        let configuration = model
            .configuration
            .as_ref()
            .ok_or_else(|| Halt::from(ProviderError::invalid_request("Configuration is required")))?
            .to_api()?;
        let input = CreateRetrieverInput {
            application_id: application_id.clone(),
            display_name: required(model.display_name.as_deref(), "DisplayName")?.to_string(),
            retriever_type: required(model.retriever_type.as_deref(), "Type")?.to_string(),
            configuration,
            role_arn: model.role_arn.clone(),
            client_token: request.client_request_token.clone(),
            tags: merge_create_tags(request),
        };
        let created = ctx
            .client
            .create_retriever(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        model.retriever_id = Some(created.id);
        model.retriever_arn = created.arn;
    }

    let retriever_id = required(model.retriever_id.as_deref(), "RetrieverId")?;
    let probe = RetrieverProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(&application_id, retriever_id),
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
    request: &ResourceHandlerRequest<RetrieverModel>,
    model: &RetrieverModel,
) -> Step<RetrieverModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let retriever_id = required(model.retriever_id.as_deref(), "RetrieverId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, RetrieverId: {}] Reading {}",
        request.stack_id(),
        application_id,
        retriever_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_retriever(application_id, retriever_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let arn = match detail.retriever_arn.clone() {
        Some(arn) => arn,
        None => {
            ArnScope::from_request(request)?.child_arn(application_id, "retriever", retriever_id)
        }
    };
    let tags = ctx.read_tags(TYPE_NAME, &identifier, &arn).await?;
    Ok(RetrieverModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<RetrieverModel>,
    callback: &CallbackContext,
    model: &RetrieverModel,
) -> Step<ProgressEvent<RetrieverModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let retriever_id = required(model.retriever_id.as_deref(), "RetrieverId")?;
    let identifier = model.identifier();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, RetrieverId: {}] Entering Update Handler",
            request.stack_id(),
            application_id,
            retriever_id
        );
        let input = UpdateRetrieverInput {
            application_id: application_id.to_string(),
            retriever_id: retriever_id.to_string(),
            display_name: model.display_name.clone(),
            configuration: model
                .configuration
                .as_ref()
                .map(RetrieverConfiguration::to_api)
                .transpose()?,
            role_arn: model.role_arn.clone(),
        };
        ctx.client
            .update_retriever(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    }

    let probe = RetrieverProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, retriever_id),
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
            .map(|scope| scope.child_arn(application_id, "retriever", retriever_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, &identifier, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<RetrieverModel>,
    callback: &CallbackContext,
    model: &RetrieverModel,
) -> Step<ProgressEvent<RetrieverModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let retriever_id = required(model.retriever_id.as_deref(), "RetrieverId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, RetrieverId: {}] Entering Delete Handler",
            request.stack_id(),
            application_id,
            retriever_id
        );
        ctx.client
            .delete_retriever(application_id, retriever_id)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    }

    let probe = RetrieverProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, retriever_id),
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
    request: &ResourceHandlerRequest<RetrieverModel>,
    model: &RetrieverModel,
) -> Step<ProgressEvent<RetrieverModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let page = ctx
        .client
        .list_retrievers(application_id, request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let models = page
        .items
        .into_iter()
        .map(|retriever_id| RetrieverModel {
            application_id: Some(application_id.to_string()),
            retriever_id: Some(retriever_id),
            ..RetrieverModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, page.next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_configuration_translation() {
        let configuration: RetrieverConfiguration = serde_json::from_value(json!({
            "NativeIndexConfiguration": {"IndexId": "idx-1"}
        }))
        .unwrap();
        assert_eq!(
            configuration.to_api().unwrap(),
            RetrieverConfig::NativeIndex {
                index_id: "idx-1".to_string()
            }
        );
        assert_eq!(
            RetrieverConfiguration::from_api(configuration.to_api().unwrap()),
            configuration
        );
    }

    #[test]
    fn test_configuration_requires_exactly_one_member() {
        assert!(RetrieverConfiguration::default().to_api().is_err());
        let both = RetrieverConfiguration {
            native_index_configuration: Some(IndexReference::default()),
            kendra_index_configuration: Some(IndexReference::default()),
        };
        assert!(both.to_api().is_err());
    }

    #[test]
    fn test_converge_policy() {
        assert_eq!(
            ConvergePolicy.classify(&StatusSnapshot::new(RetrieverStatus::Creating)),
            Verdict::InProgress
        );
        assert_eq!(
            ConvergePolicy.classify(&StatusSnapshot::new(RetrieverStatus::Active)),
            Verdict::Done
        );
        assert_eq!(
            ConvergePolicy.classify(&StatusSnapshot::new(RetrieverStatus::Failed)),
            Verdict::Failed("Resource failed to stabilize".to_string())
        );
    }
}
