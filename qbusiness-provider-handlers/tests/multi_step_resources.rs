//! Plugins and web experiences: resources whose create issues a follow-up
//! update and whose stabilization rules differ between create and update.

use qbusiness_provider_common::{
    Action, CallbackContext, HandlerErrorCode, OperationStatus, ProviderConfig,
    ResourceHandlerRequest, StabilizationStep,
};
use qbusiness_provider_handlers::api::types::{
    IdentityProvider, PluginAuth, PluginBuildStatus, PluginDetail, WebExperienceDetail,
    WebExperienceStatus,
};
use qbusiness_provider_handlers::api::*;
use qbusiness_provider_handlers::resources::plugin::{self, PluginModel};
use qbusiness_provider_handlers::resources::web_experience::{self, WebExperienceModel};
use qbusiness_provider_handlers::testing::FakeQBusiness;
use qbusiness_provider_handlers::HandlerContext;
use serde_json::json;

fn request<M>(model: M) -> ResourceHandlerRequest<M> {
    let mut request = ResourceHandlerRequest::new(model);
    request.aws_account_id = Some("123456789012".to_string());
    request.region = Some("us-west-2".to_string());
    request
}

fn plugin(build_status: PluginBuildStatus) -> PluginDetail {
    PluginDetail {
        application_id: "app".to_string(),
        plugin_id: "generated-1".to_string(),
        display_name: Some("tickets".to_string()),
        plugin_type: Some("JIRA".to_string()),
        auth: Some(PluginAuth::NoAuth),
        build_status: Some(build_status),
        ..PluginDetail::default()
    }
}

fn plugin_model(state: Option<&str>) -> PluginModel {
    serde_json::from_value(json!({
        "ApplicationId": "app",
        "DisplayName": "tickets",
        "Type": "JIRA",
        "ServerUrl": "https://example.atlassian.net",
        "AuthConfiguration": {
            "BasicAuthConfiguration": {
                "SecretArn": "arn:aws:secretsmanager:us-west-2:123456789012:secret:jira",
                "RoleArn": "arn:aws:iam::123456789012:role/jira"
            }
        },
        "State": state
    }))
    .unwrap()
}

fn web_experience(status: WebExperienceStatus, role_arn: Option<&str>) -> WebExperienceDetail {
    WebExperienceDetail {
        application_id: "app".to_string(),
        web_experience_id: "web".to_string(),
        status: Some(status),
        role_arn: role_arn.map(str::to_string),
        default_endpoint: Some("https://abc.chat.qbusiness.us-west-2.on.aws/".to_string()),
        ..WebExperienceDetail::default()
    }
}

fn web_experience_model() -> WebExperienceModel {
    WebExperienceModel {
        application_id: Some("app".to_string()),
        web_experience_id: Some("web".to_string()),
        title: Some("Ask us".to_string()),
        ..WebExperienceModel::default()
    }
}

fn saml_web_experience_model() -> WebExperienceModel {
    serde_json::from_value(json!({
        "ApplicationId": "app",
        "Title": "Ask us",
        "RoleArn": "arn:aws:iam::123456789012:role/web",
        "AuthenticationConfiguration": {
            "SamlConfiguration": {
                "MetadataXML": "<EntityDescriptor/>",
                "RoleArn": "arn:aws:iam::123456789012:role/saml",
                "UserIdAttribute": "email"
            }
        }
    }))
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_plugin_create_sets_state_after_build() {
    let fake = FakeQBusiness::new();
    fake.push_plugin(Ok(plugin(PluginBuildStatus::CreateInProgress)))
        .push_plugin(Ok(plugin(PluginBuildStatus::Ready)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = plugin::handle(
        &ctx,
        Action::Create,
        request(plugin_model(Some("DISABLED"))),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.status, OperationStatus::Success);
    let updates = fake.plugin_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].plugin_id, "generated-1");
    assert_eq!(updates[0].state.as_deref(), Some("DISABLED"));
    assert_eq!(updates[0].auth, None);
    let model = event.resource_model.unwrap();
    assert_eq!(model.build_status.as_deref(), Some("READY"));
    assert_eq!(
        model.plugin_arn.as_deref(),
        Some("arn:aws:qbusiness:us-west-2:123456789012:application/app/plugin/generated-1")
    );
}

#[tokio::test(start_paused = true)]
async fn test_plugin_create_without_state_skips_update() {
    let fake = FakeQBusiness::new();
    fake.push_plugin(Ok(plugin(PluginBuildStatus::Ready)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = plugin::handle(
        &ctx,
        Action::Create,
        request(plugin_model(None)),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(fake.call_count(API_UPDATE_PLUGIN), 0);
}

#[tokio::test(start_paused = true)]
async fn test_plugin_create_fails_on_failed_build() {
    let fake = FakeQBusiness::new();
    fake.push_plugin(Ok(plugin(PluginBuildStatus::CreateFailed)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = plugin::handle(
        &ctx,
        Action::Create,
        request(plugin_model(Some("ENABLED"))),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
    assert_eq!(fake.call_count(API_UPDATE_PLUGIN), 0);
}

#[tokio::test(start_paused = true)]
async fn test_plugin_create_requires_auth_configuration() {
    let fake = FakeQBusiness::new();
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);
    let model = PluginModel {
        auth_configuration: None,
        ..plugin_model(None)
    };

    let event = plugin::handle(&ctx, Action::Create, request(model), CallbackContext::default())
        .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_plugin_update_waits_for_ready() {
    let fake = FakeQBusiness::new();
    fake.push_plugin(Ok(plugin(PluginBuildStatus::UpdateInProgress)))
        .push_plugin(Ok(plugin(PluginBuildStatus::Ready)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);
    let model = PluginModel {
        plugin_id: Some("generated-1".to_string()),
        ..plugin_model(Some("ENABLED"))
    };

    let event = plugin::handle(&ctx, Action::Update, request(model), CallbackContext::default())
        .await;

    assert_eq!(event.status, OperationStatus::Success);
    let updates = fake.plugin_updates();
    assert_eq!(
        updates[0].auth,
        Some(PluginAuth::Basic {
            secret_arn: "arn:aws:secretsmanager:us-west-2:123456789012:secret:jira".to_string(),
            role_arn: "arn:aws:iam::123456789012:role/jira".to_string(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_plugin_delete_fails_on_delete_failed() {
    let fake = FakeQBusiness::new();
    fake.push_plugin(Ok(plugin(PluginBuildStatus::DeleteInProgress)))
        .push_plugin(Ok(plugin(PluginBuildStatus::DeleteFailed)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);
    let model = PluginModel {
        plugin_id: Some("generated-1".to_string()),
        ..plugin_model(None)
    };

    let event = plugin::handle(&ctx, Action::Delete, request(model), CallbackContext::default())
        .await;

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
    assert_eq!(fake.call_count(API_GET_PLUGIN), 2);
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_update_settles_on_pending_auth_without_role() {
    let fake = FakeQBusiness::new();
    fake.push_web_experience(Ok(web_experience(
        WebExperienceStatus::PendingAuthConfig,
        None,
    )));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = web_experience::handle(
        &ctx,
        Action::Update,
        request(web_experience_model()),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(
        event.resource_model.unwrap().status.as_deref(),
        Some("PENDING_AUTH_CONFIG")
    );
    // one probe plus the read
    assert_eq!(fake.call_count(API_GET_WEB_EXPERIENCE), 2);
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_update_with_role_waits_past_pending_auth() {
    let role = Some("arn:aws:iam::123456789012:role/web");
    let fake = FakeQBusiness::new();
    fake.push_web_experience(Ok(web_experience(WebExperienceStatus::PendingAuthConfig, role)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::Active, role)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = web_experience::handle(
        &ctx,
        Action::Update,
        request(web_experience_model()),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(fake.call_count(API_GET_WEB_EXPERIENCE), 3);
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_create_attaches_saml_configuration() {
    let fake = FakeQBusiness::new();
    fake.push_created(
        API_CREATE_WEB_EXPERIENCE,
        Ok(qbusiness_provider_handlers::api::types::Created {
            id: "web".to_string(),
            arn: Some("arn:aws:qbusiness:us-west-2:123456789012:application/app/web-experience/web".to_string()),
        }),
    );
    fake.push_web_experience(Ok(web_experience(
        WebExperienceStatus::Active,
        Some("arn:aws:iam::123456789012:role/web"),
    )));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);

    let event = web_experience::handle(
        &ctx,
        Action::Create,
        request(saml_web_experience_model()),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(event.status, OperationStatus::Success);
    let updates = fake.web_experience_updates();
    assert_eq!(updates.len(), 1);
    let saml = updates[0].authentication.clone().unwrap();
    assert_eq!(saml.metadata_xml, "<EntityDescriptor/>");
    assert_eq!(saml.user_id_attribute, "email");
    let model = event.resource_model.unwrap();
    assert_eq!(model.authentication_configuration, None);
    assert_eq!(
        fake.calls(),
        vec![
            API_CREATE_WEB_EXPERIENCE,
            API_GET_WEB_EXPERIENCE,
            API_UPDATE_WEB_EXPERIENCE,
            API_GET_WEB_EXPERIENCE,
            API_GET_WEB_EXPERIENCE,
            API_LIST_TAGS_FOR_RESOURCE,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_create_waits_for_active_after_attaching_saml() {
    let fake = FakeQBusiness::new();
    fake.push_created(
        API_CREATE_WEB_EXPERIENCE,
        Ok(qbusiness_provider_handlers::api::types::Created {
            id: "web".to_string(),
            arn: None,
        }),
    );
    fake.push_web_experience(Ok(web_experience(WebExperienceStatus::Active, None)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::PendingAuthConfig, None)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::PendingAuthConfig, None)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::Active, None)));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);
    let model = WebExperienceModel {
        role_arn: None,
        ..saml_web_experience_model()
    };

    let event = web_experience::handle(&ctx, Action::Create, request(model), CallbackContext::default())
        .await;

    assert_eq!(event.status, OperationStatus::Success);
    // One wait after create, three after the update, one read.
    assert_eq!(fake.call_count(API_GET_WEB_EXPERIENCE), 5);
    assert_eq!(
        event.resource_model.unwrap().status.as_deref(),
        Some("ACTIVE")
    );
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_resumes_post_create_update() {
    let role = Some("arn:aws:iam::123456789012:role/web");
    let fake = FakeQBusiness::new();
    fake.push_web_experience(Ok(web_experience(WebExperienceStatus::Active, role)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::PendingAuthConfig, role)))
        .push_web_experience(Ok(web_experience(WebExperienceStatus::Active, role)));
    let config = ProviderConfig::from_toml_str(
        r#"
        invocation_budget_secs = 10

        [stabilization."AWS::QBusiness::WebExperience/Create"]
        delay_secs = 30
        "#,
    )
    .unwrap();
    let ctx = HandlerContext::new(&fake, &config);

    let first = web_experience::handle(
        &ctx,
        Action::Create,
        request(saml_web_experience_model()),
        CallbackContext::default(),
    )
    .await;

    assert_eq!(first.status, OperationStatus::InProgress);
    let callback = first.callback_context.clone().unwrap();
    assert_eq!(
        callback.pending_step(),
        Some(StabilizationStep::PostCreateUpdate)
    );

    let second = web_experience::handle(
        &ctx,
        Action::Create,
        request(first.resource_model.unwrap()),
        callback,
    )
    .await;

    assert_eq!(second.status, OperationStatus::Success);
    assert_eq!(fake.call_count(API_CREATE_WEB_EXPERIENCE), 1);
    assert_eq!(fake.call_count(API_UPDATE_WEB_EXPERIENCE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_web_experience_create_sends_identity_provider_without_follow_up_update() {
    let fake = FakeQBusiness::new();
    fake.push_created(
        API_CREATE_WEB_EXPERIENCE,
        Ok(qbusiness_provider_handlers::api::types::Created {
            id: "web".to_string(),
            arn: None,
        }),
    );
    fake.push_web_experience(Ok(WebExperienceDetail {
        identity_provider: Some(IdentityProvider::Saml {
            authentication_url: "https://idp.example.com/sso".to_string(),
        }),
        ..web_experience(WebExperienceStatus::Active, Some("arn:aws:iam::123456789012:role/web"))
    }));
    let config = ProviderConfig::default();
    let ctx = HandlerContext::new(&fake, &config);
    let model: WebExperienceModel = serde_json::from_value(json!({
        "ApplicationId": "app",
        "RoleArn": "arn:aws:iam::123456789012:role/web",
        "IdentityProviderConfiguration": {
            "SamlConfiguration": {"AuthenticationUrl": "https://idp.example.com/sso"}
        }
    }))
    .unwrap();

    let event = web_experience::handle(&ctx, Action::Create, request(model.clone()), CallbackContext::default())
        .await;

    assert_eq!(event.status, OperationStatus::Success);
    let creates = fake.web_experience_creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(
        creates[0].identity_provider,
        Some(IdentityProvider::Saml {
            authentication_url: "https://idp.example.com/sso".to_string(),
        })
    );
    assert_eq!(fake.call_count(API_UPDATE_WEB_EXPERIENCE), 0);
    assert_eq!(
        event.resource_model.unwrap().identity_provider_configuration,
        model.identity_provider_configuration
    );
}
