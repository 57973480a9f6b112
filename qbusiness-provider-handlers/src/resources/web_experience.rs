//! `AWS::QBusiness::WebExperience`
//!
//! A web experience created without a role sits in PENDING_AUTH_CONFIG, which
//! counts as settled after an update. An identity provider configuration is
//! sent with the create call itself. Legacy SAML metadata in
//! `AuthenticationConfiguration` can only be attached by a follow-up
//! `UpdateWebExperience`, after which create waits again, this time for
//! ACTIVE only.

use super::rfc3339;
use crate::api::types::{
    CreateWebExperienceInput, IdentityProvider, SamlAuth, UpdateWebExperienceInput,
    WebExperienceDetail, WebExperienceStatus,
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

pub const TYPE_NAME: &str = "AWS::QBusiness::WebExperience";

const CREATE_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(2 * 60), Duration::from_secs(4 * 60 * 60));
const UPDATE_BACKOFF: BackoffScheduler =
    BackoffScheduler::constant(Duration::from_secs(5), Duration::from_secs(2 * 60 * 60));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SamlConfiguration {
    #[serde(rename = "MetadataXML", skip_serializing_if = "Option::is_none")]
    pub metadata_xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_group_attribute: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saml_configuration: Option<SamlConfiguration>,
}

impl AuthenticationConfiguration {
    /// `None` when no SAML block is present.
    fn to_api(&self) -> Step<Option<SamlAuth>> {
        let Some(saml) = &self.saml_configuration else {
            return Ok(None);
        };
        Ok(Some(SamlAuth {
            metadata_xml: required(saml.metadata_xml.as_deref(), "MetadataXML")?.to_string(),
            role_arn: required(saml.role_arn.as_deref(), "RoleArn")?.to_string(),
            user_id_attribute: required(saml.user_id_attribute.as_deref(), "UserIdAttribute")?
                .to_string(),
            user_group_attribute: saml.user_group_attribute.clone(),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SamlProviderConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpenIdConnectProviderConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityProviderConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saml_configuration: Option<SamlProviderConfiguration>,
    #[serde(
        rename = "OpenIDConnectConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub open_id_connect_configuration: Option<OpenIdConnectProviderConfiguration>,
}

impl IdentityProviderConfiguration {
    fn to_api(&self) -> Step<IdentityProvider> {
        match (&self.saml_configuration, &self.open_id_connect_configuration) {
            (Some(saml), None) => Ok(IdentityProvider::Saml {
                authentication_url: required(
                    saml.authentication_url.as_deref(),
                    "AuthenticationUrl",
                )?
                .to_string(),
            }),
            (None, Some(oidc)) => Ok(IdentityProvider::OpenIdConnect {
                secrets_arn: required(oidc.secrets_arn.as_deref(), "SecretsArn")?.to_string(),
                secrets_role: required(oidc.secrets_role.as_deref(), "SecretsRole")?.to_string(),
            }),
            _ => Err(Halt::from(ProviderError::invalid_request(
                "IdentityProviderConfiguration requires exactly one of SamlConfiguration or OpenIDConnectConfiguration",
            ))),
        }
    }

    fn from_api(provider: IdentityProvider) -> Self {
        match provider {
            IdentityProvider::Saml { authentication_url } => Self {
                saml_configuration: Some(SamlProviderConfiguration {
                    authentication_url: Some(authentication_url),
                }),
                open_id_connect_configuration: None,
            },
            IdentityProvider::OpenIdConnect {
                secrets_arn,
                secrets_role,
            } => Self {
                saml_configuration: None,
                open_id_connect_configuration: Some(OpenIdConnectProviderConfiguration {
                    secrets_arn: Some(secrets_arn),
                    secrets_role: Some(secrets_role),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebExperienceModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_experience_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_experience_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_prompts_control_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider_configuration: Option<IdentityProviderConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_configuration: Option<AuthenticationConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for WebExperienceModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl WebExperienceModel {
    // The authentication configuration is write-only and never read back.
    fn from_detail(detail: WebExperienceDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        Self {
            application_id: Some(detail.application_id),
            web_experience_id: Some(detail.web_experience_id),
            web_experience_arn: Some(arn),
            default_endpoint: detail.default_endpoint,
            title: detail.title,
            subtitle: detail.subtitle,
            welcome_message: detail.welcome_message,
            sample_prompts_control_mode: detail.sample_prompts_control_mode,
            origins: Some(detail.origins).filter(|o| !o.is_empty()),
            role_arn: detail.role_arn,
            identity_provider_configuration: detail
                .identity_provider
                .map(IdentityProviderConfiguration::from_api),
            authentication_configuration: None,
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
            self.web_experience_id.as_deref().unwrap_or_default()
        )
    }

    fn identity_provider(&self) -> Step<Option<IdentityProvider>> {
        self.identity_provider_configuration
            .as_ref()
            .map(IdentityProviderConfiguration::to_api)
            .transpose()
    }

    fn update_input(
        &self,
        application_id: &str,
        web_experience_id: &str,
    ) -> Step<UpdateWebExperienceInput> {
        Ok(UpdateWebExperienceInput {
            application_id: application_id.to_string(),
            web_experience_id: web_experience_id.to_string(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            welcome_message: self.welcome_message.clone(),
            sample_prompts_control_mode: self.sample_prompts_control_mode.clone(),
            origins: self.origins.clone(),
            role_arn: self.role_arn.clone(),
            identity_provider: self.identity_provider()?,
            authentication: match &self.authentication_configuration {
                Some(auth) => auth.to_api()?,
                None => None,
            },
        })
    }
}

/// Status plus whether the service reports a role for the web experience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebExperienceState {
    pub status: WebExperienceStatus,
    pub has_role: bool,
}

struct WebExperienceProbe<'a> {
    client: &'a dyn QBusinessApi,
}

#[async_trait]
impl StatusProbe for WebExperienceProbe<'_> {
    type Status = WebExperienceState;

    async fn probe(
        &self,
        target: &ResourceRef,
    ) -> Result<StatusSnapshot<WebExperienceState>, ServiceError> {
        let detail = self
            .client
            .get_web_experience(target.application_id(), target.resource_id())
            .await?;
        let state = WebExperienceState {
            status: detail
                .status
                .unwrap_or_else(|| WebExperienceStatus::Unknown(String::new())),
            has_role: detail.role_arn.is_some(),
        };
        Ok(StatusSnapshot::new(state).with_error(detail.error_message))
    }
}

struct CreatePolicy;

impl StabilizationPolicy<WebExperienceState> for CreatePolicy {
    fn classify(&self, snapshot: &StatusSnapshot<WebExperienceState>) -> Verdict {
        match snapshot.status.status {
            WebExperienceStatus::Active => Verdict::Done,
            WebExperienceStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
            _ => Verdict::InProgress,
        }
    }
}

/// Like [`CreatePolicy`], but PENDING_AUTH_CONFIG also settles when no role
/// is attached.
struct UpdatePolicy;

impl StabilizationPolicy<WebExperienceState> for UpdatePolicy {
    fn classify(&self, snapshot: &StatusSnapshot<WebExperienceState>) -> Verdict {
        let state = &snapshot.status;
        match state.status {
            WebExperienceStatus::Active => Verdict::Done,
            WebExperienceStatus::PendingAuthConfig if !state.has_role => Verdict::Done,
            WebExperienceStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
            _ => Verdict::InProgress,
        }
    }
}

struct DeletionPolicy;

impl StabilizationPolicy<WebExperienceState> for DeletionPolicy {
    fn classify(&self, snapshot: &StatusSnapshot<WebExperienceState>) -> Verdict {
        match snapshot.status.status {
            WebExperienceStatus::Failed => Verdict::Failed(failure_reason(snapshot)),
            _ => Verdict::InProgress,
        }
    }
}

fn wait<'a, Pol: ?Sized>(
    action: Action,
    step: StabilizationStep,
    default: BackoffScheduler,
    mode: ProbeMode,
    policy: &'a Pol,
) -> Stabilization<'a, Pol> {
    Stabilization {
        type_name: TYPE_NAME,
        action,
        step,
        default,
        mode,
        policy,
    }
}

pub async fn handle(
    ctx: &HandlerContext<'_>,
    action: Action,
    request: ResourceHandlerRequest<WebExperienceModel>,
    callback: CallbackContext,
) -> ProgressEvent<WebExperienceModel> {
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
    request: &ResourceHandlerRequest<WebExperienceModel>,
    callback: &CallbackContext,
    model: &mut WebExperienceModel,
) -> Step<ProgressEvent<WebExperienceModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?.to_string();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}] Entering Create Handler for {}",
            request.stack_id(),
            application_id,
            TYPE_NAME
        );
        let input = CreateWebExperienceInput {
            application_id: application_id.clone(),
            title: model.title.clone(),
            subtitle: model.subtitle.clone(),
            welcome_message: model.welcome_message.clone(),
            sample_prompts_control_mode: model.sample_prompts_control_mode.clone(),
            origins: model.origins.clone().unwrap_or_default(),
            role_arn: model.role_arn.clone(),
            identity_provider: model.identity_provider()?,
            client_token: request.client_request_token.clone(),
            tags: merge_create_tags(request),
        };
        let created = ctx
            .client
            .create_web_experience(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        model.web_experience_id = Some(created.id);
        model.web_experience_arn = created.arn;
    }

    let web_experience_id = required(model.web_experience_id.as_deref(), "WebExperienceId")?
        .to_string();
    let target = ResourceRef::child(&application_id, &web_experience_id);
    let probe = WebExperienceProbe { client: ctx.client };

    // A pending post-create update means the first wait already finished.
    if callback.pending_step() != Some(StabilizationStep::PostCreateUpdate) {
        ctx.stabilize(
            &probe,
            &target,
            wait(
                Action::Create,
                StabilizationStep::Create,
                CREATE_BACKOFF,
                ProbeMode::Converge,
                &CreatePolicy,
            ),
            callback,
        )
        .await?;
    }

    if model.authentication_configuration.is_some() {
        if callback.pending_step() != Some(StabilizationStep::PostCreateUpdate) {
            info!(
                "[StackId: {}, ApplicationId: {}, WebExperienceId: {}] Attaching authentication configuration",
                request.stack_id(),
                application_id,
                web_experience_id
            );
            let input = model.update_input(&application_id, &web_experience_id)?;
            ctx.client
                .update_web_experience(input)
                .await
                .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
        }
        ctx.stabilize(
            &probe,
            &target,
            wait(
                Action::Create,
                StabilizationStep::PostCreateUpdate,
                CREATE_BACKOFF,
                ProbeMode::Converge,
                &CreatePolicy,
            ),
            callback,
        )
        .await?;
    }

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn read(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<WebExperienceModel>,
    model: &WebExperienceModel,
) -> Step<WebExperienceModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let web_experience_id = required(model.web_experience_id.as_deref(), "WebExperienceId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, WebExperienceId: {}] Reading {}",
        request.stack_id(),
        application_id,
        web_experience_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_web_experience(application_id, web_experience_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let arn = match detail.web_experience_arn.clone() {
        Some(arn) => arn,
        None => ArnScope::from_request(request)?.child_arn(
            application_id,
            "web-experience",
            web_experience_id,
        ),
    };
    let tags = ctx.read_tags(TYPE_NAME, &identifier, &arn).await?;
    Ok(WebExperienceModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<WebExperienceModel>,
    callback: &CallbackContext,
    model: &WebExperienceModel,
) -> Step<ProgressEvent<WebExperienceModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let web_experience_id = required(model.web_experience_id.as_deref(), "WebExperienceId")?;
    let identifier = model.identifier();
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, WebExperienceId: {}] Entering Update Handler",
            request.stack_id(),
            application_id,
            web_experience_id
        );
        let input = model.update_input(application_id, web_experience_id)?;
        ctx.client
            .update_web_experience(input)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    }

    let probe = WebExperienceProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, web_experience_id),
        wait(
            Action::Update,
            StabilizationStep::Update,
            UPDATE_BACKOFF,
            ProbeMode::Converge,
            &UpdatePolicy,
        ),
        callback,
    )
    .await?;

    let arn = || {
        ArnScope::from_request(request)
            .map(|scope| scope.child_arn(application_id, "web-experience", web_experience_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, &identifier, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<WebExperienceModel>,
    callback: &CallbackContext,
    model: &WebExperienceModel,
) -> Step<ProgressEvent<WebExperienceModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let web_experience_id = required(model.web_experience_id.as_deref(), "WebExperienceId")?;
    if callback.pending_step().is_none() {
        info!(
            "[StackId: {}, ApplicationId: {}, WebExperienceId: {}] Entering Delete Handler",
            request.stack_id(),
            application_id,
            web_experience_id
        );
        ctx.client
            .delete_web_experience(application_id, web_experience_id)
            .await
            .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    }

    let probe = WebExperienceProbe { client: ctx.client };
    ctx.stabilize(
        &probe,
        &ResourceRef::child(application_id, web_experience_id),
        wait(
            Action::Delete,
            StabilizationStep::Delete,
            CREATE_BACKOFF,
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
    request: &ResourceHandlerRequest<WebExperienceModel>,
    model: &WebExperienceModel,
) -> Step<ProgressEvent<WebExperienceModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let page = ctx
        .client
        .list_web_experiences(application_id, request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let models = page
        .items
        .into_iter()
        .map(|web_experience_id| WebExperienceModel {
            application_id: Some(application_id.to_string()),
            web_experience_id: Some(web_experience_id),
            ..WebExperienceModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, page.next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbusiness_provider_common::{ClassifiedFailure, HandlerErrorCode};
    use rstest::rstest;
    use serde_json::json;

    fn snapshot(status: WebExperienceStatus, has_role: bool) -> StatusSnapshot<WebExperienceState> {
        StatusSnapshot::new(WebExperienceState { status, has_role })
    }

    #[rstest]
    #[case(WebExperienceStatus::Active, true, Verdict::Done)]
    #[case(WebExperienceStatus::PendingAuthConfig, false, Verdict::Done)]
    #[case(WebExperienceStatus::PendingAuthConfig, true, Verdict::InProgress)]
    #[case(WebExperienceStatus::Creating, false, Verdict::InProgress)]
    #[case(WebExperienceStatus::Failed, false, Verdict::Failed("Resource failed to stabilize".to_string()))]
    fn test_update_policy(
        #[case] status: WebExperienceStatus,
        #[case] has_role: bool,
        #[case] expected: Verdict,
    ) {
        assert_eq!(UpdatePolicy.classify(&snapshot(status, has_role)), expected);
    }

    #[test]
    fn test_create_policy_waits_on_pending_auth_config() {
        assert_eq!(
            CreatePolicy.classify(&snapshot(WebExperienceStatus::PendingAuthConfig, false)),
            Verdict::InProgress
        );
    }

    #[test]
    fn test_saml_configuration_requires_metadata() {
        let auth: AuthenticationConfiguration = serde_json::from_value(json!({
            "SamlConfiguration": {
                "RoleArn": "arn:aws:iam::123456789012:role/saml",
                "UserIdAttribute": "email"
            }
        }))
        .unwrap();
        assert!(auth.to_api().is_err());

        let auth: AuthenticationConfiguration = serde_json::from_value(json!({
            "SamlConfiguration": {
                "MetadataXML": "<xml/>",
                "RoleArn": "arn:aws:iam::123456789012:role/saml",
                "UserIdAttribute": "email"
            }
        }))
        .unwrap();
        let saml = auth.to_api().unwrap().unwrap();
        assert_eq!(saml.metadata_xml, "<xml/>");
        assert_eq!(saml.user_group_attribute, None);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({
        "SamlConfiguration": {"AuthenticationUrl": "https://idp.example.com/sso"},
        "OpenIDConnectConfiguration": {
            "SecretsArn": "arn:aws:secretsmanager:us-east-1:123456789012:secret:oidc",
            "SecretsRole": "arn:aws:iam::123456789012:role/oidc"
        }
    }))]
    #[case(json!({"SamlConfiguration": {}}))]
    fn test_identity_provider_needs_exactly_one_complete_block(#[case] value: serde_json::Value) {
        let configuration: IdentityProviderConfiguration = serde_json::from_value(value).unwrap();
        assert!(matches!(
            configuration.to_api(),
            Err(Halt::Fail(ClassifiedFailure {
                code: HandlerErrorCode::InvalidRequest,
                ..
            }))
        ));
    }

    #[test]
    fn test_identity_provider_is_read_back() {
        let configuration: IdentityProviderConfiguration = serde_json::from_value(json!({
            "OpenIDConnectConfiguration": {
                "SecretsArn": "arn:aws:secretsmanager:us-east-1:123456789012:secret:oidc",
                "SecretsRole": "arn:aws:iam::123456789012:role/oidc"
            }
        }))
        .unwrap();
        let detail = WebExperienceDetail {
            application_id: "app".to_string(),
            web_experience_id: "web".to_string(),
            identity_provider: Some(configuration.to_api().unwrap()),
            ..WebExperienceDetail::default()
        };
        let model = WebExperienceModel::from_detail(detail, "arn".to_string(), None);
        assert_eq!(model.identity_provider_configuration, Some(configuration));
    }

    #[test]
    fn test_empty_origins_are_not_reported() {
        let detail = WebExperienceDetail {
            application_id: "app".to_string(),
            web_experience_id: "web".to_string(),
            ..WebExperienceDetail::default()
        };
        let model = WebExperienceModel::from_detail(detail, "arn".to_string(), None);
        assert_eq!(model.origins, None);
        assert_eq!(model.identifier(), "app|web");
    }
}
