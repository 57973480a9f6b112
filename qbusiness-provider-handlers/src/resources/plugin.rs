//! `AWS::QBusiness::Plugin`
//!
//! Plugins report a build status rather than a lifecycle status. A plugin's
//! `State` (ENABLED/DISABLED) cannot be set at creation, so a create with a
//! `State` issues a follow-up `UpdatePlugin` once the build is READY.

use super::rfc3339;
use crate::api::types::{
    CreatePluginInput, PluginAuth, PluginBuildStatus, PluginDetail, UpdatePluginInput,
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

pub const TYPE_NAME: &str = "AWS::QBusiness::Plugin";

const DEFAULT_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(5), Duration::from_secs(4 * 60 * 60));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoAuthConfiguration {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginAuthConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth_configuration: Option<SecretCredentials>,
    #[serde(
        rename = "OAuth2ClientCredentialConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub oauth2_client_credential_configuration: Option<SecretCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_auth_configuration: Option<NoAuthConfiguration>,
}

impl PluginAuthConfiguration {
    fn to_api(&self) -> Step<PluginAuth> {
        let credentials = |c: &SecretCredentials| -> Step<(String, String)> {
            Ok((
                required(c.secret_arn.as_deref(), "SecretArn")?.to_string(),
                required(c.role_arn.as_deref(), "RoleArn")?.to_string(),
            ))
        };
        match (
            &self.basic_auth_configuration,
            &self.oauth2_client_credential_configuration,
            &self.no_auth_configuration,
        ) {
            (Some(basic), None, None) => {
                let (secret_arn, role_arn) = credentials(basic)?;
                Ok(PluginAuth::Basic {
                    secret_arn,
                    role_arn,
                })
            }
            (None, Some(oauth), None) => {
                let (secret_arn, role_arn) = credentials(oauth)?;
                Ok(PluginAuth::OAuth2 {
                    secret_arn,
                    role_arn,
                })
            }
            (None, None, Some(_)) => Ok(PluginAuth::NoAuth),
            _ => Err(Halt::from(ProviderError::invalid_request(
                "AuthConfiguration must set exactly one authentication method",
            ))),
        }
    }

    fn from_api(auth: PluginAuth) -> Self {
        let credentials = |secret_arn, role_arn| SecretCredentials {
            secret_arn: Some(secret_arn),
            role_arn: Some(role_arn),
        };
        match auth {
            PluginAuth::NoAuth => Self {
                no_auth_configuration: Some(NoAuthConfiguration {}),
                ..Self::default()
            },
            PluginAuth::Basic {
                secret_arn,
                role_arn,
            } => Self {
                basic_auth_configuration: Some(credentials(secret_arn, role_arn)),
                ..Self::default()
            },
            PluginAuth::OAuth2 {
                secret_arn,
                role_arn,
            } => Self {
                oauth2_client_credential_configuration: Some(credentials(secret_arn, role_arn)),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_configuration: Option<PluginAuthConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for PluginModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl PluginModel {
    fn from_detail(detail: PluginDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        Self {
            application_id: Some(detail.application_id),
            plugin_id: Some(detail.plugin_id),
            plugin_arn: Some(arn),
            display_name: detail.display_name,
            plugin_type: detail.plugin_type,
            server_url: detail.server_url,
            auth_configuration: detail.auth.map(PluginAuthConfiguration::from_api),
            state: detail.state,
            build_status: detail.build_status.map(|s| s.as_str().to_string()),
            created_at: rfc3339(detail.created_at),
            updated_at: rfc3339(detail.updated_at),
            tags,
        }
    }

    fn identifier(&self) -> String {
        format!(
            "{}|{}",
            self.application_id.as_deref().unwrap_or_default(),
            self.plugin_id.as_deref().unwrap_or_default()
        )
    }
}

struct PluginProbe<'a> {
    client: &'a dyn QBusinessApi,
}

#[async_trait]
impl StatusProbe for PluginProbe<'_> {
    type Status = PluginBuildStatus;

    async fn probe(
        &self,
        target: &ResourceRef,
    ) -> Result<StatusSnapshot<PluginBuildStatus>, ServiceError> {
        let detail = self
            .client
            .get_plugin(target.application_id(), target.resource_id())
            .await?;
        Ok(StatusSnapshot::new(
            detail
                .build_status
                .unwrap_or_else(|| PluginBuildStatus::Unknown(String::new())),
        ))
    }
}

/// READY is done, `building` is the only status worth waiting on, anything
/// else means the build failed.
struct BuildPolicy {
    building: PluginBuildStatus,
}

impl StabilizationPolicy<PluginBuildStatus> for BuildPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<PluginBuildStatus>) -> Verdict {
        if snapshot.status == PluginBuildStatus::Ready {
            Verdict::Done
        } else if snapshot.status == self.building {
            Verdict::InProgress
        } else {
            Verdict::Failed(failure_reason(snapshot))
        }
    }
}

struct DeletionPolicy;

impl StabilizationPolicy<PluginBuildStatus> for DeletionPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<PluginBuildStatus>) -> Verdict {
        match snapshot.status {
            PluginBuildStatus::DeleteFailed => Verdict::Failed(failure_reason(snapshot)),
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
    request: ResourceHandlerRequest<PluginModel>,
    callback: CallbackContext,
) -> ProgressEvent<PluginModel> {
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
    request: &ResourceHandlerRequest<PluginModel>,
    callback: &CallbackContext,
    model: &mut PluginModel,
) -> Step<ProgressEvent<PluginModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?.to_string();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, PluginId: {}] Entering Create Handler",
            request.stack_id(),
            application_id,
            model.plugin_id.as_deref().unwrap_or_default()
        );
        let auth = model
            .auth_configuration
            .as_ref()
            .ok_or_else(|| {
                Halt::from(ProviderError::invalid_request("AuthConfiguration is required"))
            })?
            .to_api()?;
        let input = CreatePluginInput {
            application_id: application_id.clone(),
            display_name: required(model.display_name.as_deref(), "DisplayName")?.to_string(),
            plugin_type: required(model.plugin_type.as_deref(), "Type")?.to_string(),
            server_url: model.server_url.clone(),
            auth,
            client_token: request.client_request_token.clone(),
            tags: merge_create_tags(request),
        };
        let created = ctx
            .client
            .create_plugin(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        model.plugin_id = Some(created.id);
        model.plugin_arn = created.arn;
    }

    let plugin_id = required(model.plugin_id.as_deref(), "PluginId")?.to_string();
    let probe = PluginProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(&application_id, &plugin_id),
        wait(
            Action::Create,
            StabilizationStep::Create,
            ProbeMode::Converge,
            &BuildPolicy {
                building: PluginBuildStatus::CreateInProgress,
            },
        ),
        callback,
    )
    .await?;

    if let Some(state) = model.state.clone().filter(|s| !s.trim().is_empty()) {
        info!(
            "[StackId: {}, ApplicationId: {}, PluginId: {}] Setting plugin state to {}",
            request.stack_id(),
            application_id,
            plugin_id,
            state
        );
        let input = UpdatePluginInput {
            application_id: application_id.clone(),
            plugin_id: plugin_id.clone(),
            state: Some(state),
            ..UpdatePluginInput::default()
        };
        ctx.client
            .update_plugin(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    }

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn read(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PluginModel>,
    model: &PluginModel,
) -> Step<PluginModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let plugin_id = required(model.plugin_id.as_deref(), "PluginId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, PluginId: {}] Reading {}",
        request.stack_id(),
        application_id,
        plugin_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_plugin(application_id, plugin_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let arn = match detail.plugin_arn.clone() {
        Some(arn) => arn,
        None => ArnScope::from_request(request)?.child_arn(application_id, "plugin", plugin_id),
    };
    let tags = ctx.read_tags(TYPE_NAME, &identifier, &arn).await?;
    Ok(PluginModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PluginModel>,
    callback: &CallbackContext,
    model: &PluginModel,
) -> Step<ProgressEvent<PluginModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let plugin_id = required(model.plugin_id.as_deref(), "PluginId")?;
    let identifier = model.identifier();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, PluginId: {}] Entering Update Handler",
            request.stack_id(),
            application_id,
            plugin_id
        );
        let input = UpdatePluginInput {
            application_id: application_id.to_string(),
            plugin_id: plugin_id.to_string(),
            display_name: model.display_name.clone(),
            state: model.state.clone(),
            server_url: model.server_url.clone(),
            auth: model
                .auth_configuration
                .as_ref()
                .map(PluginAuthConfiguration::to_api)
                .transpose()?,
        };
        ctx.client
            .update_plugin(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    }

    let probe = PluginProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, plugin_id),
        wait(
            Action::Update,
            StabilizationStep::Update,
            ProbeMode::Converge,
            &BuildPolicy {
                building: PluginBuildStatus::UpdateInProgress,
            },
        ),
        callback,
    )
    .await?;

    let arn = || {
        ArnScope::from_request(request)
            .map(|scope| scope.child_arn(application_id, "plugin", plugin_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, &identifier, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PluginModel>,
    callback: &CallbackContext,
    model: &PluginModel,
) -> Step<ProgressEvent<PluginModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let plugin_id = required(model.plugin_id.as_deref(), "PluginId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, PluginId: {}] Entering Delete Handler",
            request.stack_id(),
            application_id,
            plugin_id
        );
        ctx.client
            .delete_plugin(application_id, plugin_id)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    }

    let probe = PluginProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, plugin_id),
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
    request: &ResourceHandlerRequest<PluginModel>,
    model: &PluginModel,
) -> Step<ProgressEvent<PluginModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let page = ctx
        .client
        .list_plugins(application_id, request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let models = page
        .items
        .into_iter()
        .map(|plugin_id| PluginModel {
            application_id: Some(application_id.to_string()),
            plugin_id: Some(plugin_id),
            ..PluginModel::default()
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
    #[case(PluginBuildStatus::Ready, Verdict::Done)]
    #[case(PluginBuildStatus::CreateInProgress, Verdict::InProgress)]
    #[case(PluginBuildStatus::CreateFailed, Verdict::Failed("Resource failed to stabilize".to_string()))]
    #[case(PluginBuildStatus::UpdateInProgress, Verdict::Failed("Resource failed to stabilize".to_string()))]
    fn test_create_build_policy(#[case] status: PluginBuildStatus, #[case] expected: Verdict) {
        let policy = BuildPolicy {
            building: PluginBuildStatus::CreateInProgress,
        };
        assert_eq!(policy.classify(&StatusSnapshot::new(status)), expected);
    }

    #[test]
    fn test_deletion_policy_fails_on_delete_failed() {
        assert!(matches!(
            DeletionPolicy.classify(&StatusSnapshot::new(PluginBuildStatus::DeleteFailed)),
            Verdict::Failed(_)
        ));
        assert_eq!(
            DeletionPolicy.classify(&StatusSnapshot::new(PluginBuildStatus::DeleteInProgress)),
            Verdict::InProgress
        );
    }

    #[test]
    fn test_auth_configuration_translation() {
        let auth: PluginAuthConfiguration = serde_json::from_value(json!({
            "OAuth2ClientCredentialConfiguration": {
                "SecretArn": "arn:secret",
                "RoleArn": "arn:role"
            }
        }))
        .unwrap();
        assert_eq!(
            auth.to_api().unwrap(),
            PluginAuth::OAuth2 {
                secret_arn: "arn:secret".to_string(),
                role_arn: "arn:role".to_string()
            }
        );

        let no_auth: PluginAuthConfiguration =
            serde_json::from_value(json!({"NoAuthConfiguration": {}})).unwrap();
        assert_eq!(no_auth.to_api().unwrap(), PluginAuth::NoAuth);
        assert_eq!(
            serde_json::to_value(PluginAuthConfiguration::from_api(PluginAuth::NoAuth)).unwrap(),
            json!({"NoAuthConfiguration": {}})
        );
    }

    #[test]
    fn test_basic_auth_requires_secret() {
        let auth = PluginAuthConfiguration {
            basic_auth_configuration: Some(SecretCredentials {
                secret_arn: None,
                role_arn: Some("arn:role".to_string()),
            }),
            ..PluginAuthConfiguration::default()
        };
        assert!(auth.to_api().is_err());
    }
}
