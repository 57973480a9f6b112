//! [`QBusinessApi`] over the AWS SDK for Rust.

use super::types::{
    ApplicationDetail, ApplicationStatus, AssociatePermissionInput, CreateApplicationInput,
    CreateDataAccessorInput, CreateIndexInput, CreatePluginInput, CreateRetrieverInput,
    CreateWebExperienceInput, Created, DataAccessorDetail, IdentityProvider, IndexDetail,
    IndexStatus, Page,
    PluginAuth, PluginBuildStatus, PluginDetail, RetrieverConfig, RetrieverDetail,
    RetrieverStatus, SamlAuth, UpdateApplicationInput, UpdateDataAccessorInput, UpdateIndexInput,
    UpdatePluginInput, UpdateRetrieverInput, UpdateWebExperienceInput, WebExperienceDetail,
    WebExperienceStatus,
};
use super::*;
use aws_sdk_qbusiness::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_qbusiness::operation::update_web_experience::builders::UpdateWebExperienceFluentBuilder;
use aws_sdk_qbusiness::primitives::DateTime as SdkDateTime;
use aws_sdk_qbusiness::types as sdk;
use aws_sdk_qbusiness::Client;
use chrono::{DateTime, Utc};
use qbusiness_provider_common::FaultCategory;
use std::fmt::{Debug, Display};

/// Production client: every call goes to the QBusiness endpoint of the
/// configured region.
#[derive(Debug, Clone)]
pub struct SdkQBusinessClient {
    client: Client,
}

impl SdkQBusinessClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential provider chain.
    /// `region` overrides the region resolved from the environment.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

/// Map an SDK failure to a [`ServiceError`] keyed by the service exception name.
fn service_error<E, R>(api: &str, error: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let (category, message) = match &error {
        SdkError::ServiceError(context) => (
            FaultCategory::from_service_code(context.err().code()),
            context.err().message().map(str::to_string),
        ),
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            (FaultCategory::Network, None)
        }
        SdkError::ConstructionFailure(_) => (FaultCategory::Validation, None),
        _ => (FaultCategory::Unrecognized, None),
    };
    let message = message.unwrap_or_else(|| DisplayErrorContext(&error).to_string());
    ServiceError::new(category, api, message)
}

/// A request member the SDK refused to build.
fn invalid(api: &str, error: impl Display) -> ServiceError {
    ServiceError::validation(api, error.to_string())
}

fn required(api: &str, field: &str, value: Option<String>) -> ApiResult<String> {
    value.ok_or_else(|| {
        ServiceError::new(
            FaultCategory::Unrecognized,
            api,
            format!("response is missing {field}"),
        )
    })
}

fn timestamp(value: Option<&SdkDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

/// Accessors return `&str` for required members and `Option<&str>` for
/// optional ones; both become owned optional strings.
trait OwnedField {
    fn owned(self) -> Option<String>;
}

impl OwnedField for &str {
    fn owned(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl OwnedField for Option<&str> {
    fn owned(self) -> Option<String> {
        self.map(str::to_string)
    }
}

/// Same for list members, which may be `&[T]` or `Option<&[T]>`.
trait OrEmpty<'a, T> {
    fn or_empty(self) -> &'a [T];
}

impl<'a, T> OrEmpty<'a, T> for &'a [T] {
    fn or_empty(self) -> &'a [T] {
        self
    }
}

impl<'a, T> OrEmpty<'a, T> for Option<&'a [T]> {
    fn or_empty(self) -> &'a [T] {
        self.unwrap_or_default()
    }
}

fn sdk_tags(
    api: &str,
    tags: &std::collections::BTreeMap<String, String>,
) -> ApiResult<Option<Vec<sdk::Tag>>> {
    if tags.is_empty() {
        return Ok(None);
    }
    tags.iter()
        .map(|(key, value)| {
            sdk::Tag::builder()
                .key(key)
                .value(value)
                .build()
                .map_err(|e| invalid(api, e))
        })
        .collect::<ApiResult<Vec<_>>>()
        .map(Some)
}

fn page<T>(items: &[T], id: impl Fn(&T) -> Option<String>, next_token: Option<&str>) -> Page<String> {
    Page {
        items: items.iter().filter_map(id).collect(),
        next_token: next_token.owned(),
    }
}

fn sdk_retriever_config(api: &str, config: &RetrieverConfig) -> ApiResult<sdk::RetrieverConfiguration> {
    Ok(match config {
        RetrieverConfig::NativeIndex { index_id } => {
            sdk::RetrieverConfiguration::NativeIndexConfiguration(
                sdk::NativeIndexConfiguration::builder()
                    .index_id(index_id)
                    .build()
                    .map_err(|e| invalid(api, e))?,
            )
        }
        RetrieverConfig::KendraIndex { index_id } => {
            sdk::RetrieverConfiguration::KendraIndexConfiguration(
                sdk::KendraIndexConfiguration::builder()
                    .index_id(index_id)
                    .build()
                    .map_err(|e| invalid(api, e))?,
            )
        }
    })
}

fn retriever_config(config: &sdk::RetrieverConfiguration) -> Option<RetrieverConfig> {
    match config {
        sdk::RetrieverConfiguration::NativeIndexConfiguration(native) => {
            Some(RetrieverConfig::NativeIndex {
                index_id: native.index_id().owned().unwrap_or_default(),
            })
        }
        sdk::RetrieverConfiguration::KendraIndexConfiguration(kendra) => {
            Some(RetrieverConfig::KendraIndex {
                index_id: kendra.index_id().owned().unwrap_or_default(),
            })
        }
        _ => None,
    }
}

fn sdk_plugin_auth(api: &str, auth: &PluginAuth) -> ApiResult<sdk::PluginAuthConfiguration> {
    Ok(match auth {
        PluginAuth::NoAuth => sdk::PluginAuthConfiguration::NoAuthConfiguration(
            sdk::NoAuthConfiguration::builder().build(),
        ),
        PluginAuth::Basic {
            secret_arn,
            role_arn,
        } => sdk::PluginAuthConfiguration::BasicAuthConfiguration(
            sdk::BasicAuthConfiguration::builder()
                .secret_arn(secret_arn)
                .role_arn(role_arn)
                .build()
                .map_err(|e| invalid(api, e))?,
        ),
        PluginAuth::OAuth2 {
            secret_arn,
            role_arn,
        } => sdk::PluginAuthConfiguration::OAuth2ClientCredentialConfiguration(
            sdk::OAuth2ClientCredentialConfiguration::builder()
                .secret_arn(secret_arn)
                .role_arn(role_arn)
                .build()
                .map_err(|e| invalid(api, e))?,
        ),
    })
}

fn plugin_auth(auth: &sdk::PluginAuthConfiguration) -> Option<PluginAuth> {
    match auth {
        sdk::PluginAuthConfiguration::NoAuthConfiguration(_) => Some(PluginAuth::NoAuth),
        sdk::PluginAuthConfiguration::BasicAuthConfiguration(basic) => Some(PluginAuth::Basic {
            secret_arn: basic.secret_arn().owned().unwrap_or_default(),
            role_arn: basic.role_arn().owned().unwrap_or_default(),
        }),
        sdk::PluginAuthConfiguration::OAuth2ClientCredentialConfiguration(oauth) => {
            Some(PluginAuth::OAuth2 {
                secret_arn: oauth.secret_arn().owned().unwrap_or_default(),
                role_arn: oauth.role_arn().owned().unwrap_or_default(),
            })
        }
        _ => None,
    }
}

fn sdk_actions(api: &str, actions: &[String]) -> ApiResult<Vec<sdk::ActionConfiguration>> {
    actions
        .iter()
        .map(|action| {
            sdk::ActionConfiguration::builder()
                .action(action)
                .build()
                .map_err(|e| invalid(api, e))
        })
        .collect()
}

fn sdk_saml(api: &str, saml: &SamlAuth) -> ApiResult<sdk::WebExperienceAuthConfiguration> {
    let configuration = sdk::SamlConfiguration::builder()
        .metadata_xml(&saml.metadata_xml)
        .role_arn(&saml.role_arn)
        .user_id_attribute(&saml.user_id_attribute)
        .set_user_group_attribute(saml.user_group_attribute.clone())
        .build()
        .map_err(|e| invalid(api, e))?;
    Ok(sdk::WebExperienceAuthConfiguration::SamlConfiguration(
        configuration,
    ))
}

// Metadata-XML SAML can only be attached through the deprecated field.
#[allow(deprecated)]
fn with_legacy_saml(
    builder: UpdateWebExperienceFluentBuilder,
    authentication: Option<sdk::WebExperienceAuthConfiguration>,
) -> UpdateWebExperienceFluentBuilder {
    builder.set_authentication_configuration(authentication)
}

fn sdk_identity_provider(
    api: &str,
    provider: &IdentityProvider,
) -> ApiResult<sdk::IdentityProviderConfiguration> {
    Ok(match provider {
        IdentityProvider::Saml { authentication_url } => {
            sdk::IdentityProviderConfiguration::SamlConfiguration(
                sdk::SamlProviderConfiguration::builder()
                    .authentication_url(authentication_url)
                    .build()
                    .map_err(|e| invalid(api, e))?,
            )
        }
        IdentityProvider::OpenIdConnect {
            secrets_arn,
            secrets_role,
        } => sdk::IdentityProviderConfiguration::OpenIdConnectConfiguration(
            sdk::OpenIdConnectProviderConfiguration::builder()
                .secrets_arn(secrets_arn)
                .secrets_role(secrets_role)
                .build()
                .map_err(|e| invalid(api, e))?,
        ),
    })
}

fn identity_provider(
    configuration: Option<&sdk::IdentityProviderConfiguration>,
) -> Option<IdentityProvider> {
    match configuration? {
        sdk::IdentityProviderConfiguration::SamlConfiguration(saml) => {
            Some(IdentityProvider::Saml {
                authentication_url: saml.authentication_url().to_string(),
            })
        }
        sdk::IdentityProviderConfiguration::OpenIdConnectConfiguration(oidc) => {
            Some(IdentityProvider::OpenIdConnect {
                secrets_arn: oidc.secrets_arn().to_string(),
                secrets_role: oidc.secrets_role().to_string(),
            })
        }
        _ => None,
    }
}

fn error_message(error: Option<&sdk::ErrorDetail>) -> Option<String> {
    error.and_then(|detail| detail.error_message()).owned()
}

#[async_trait]
impl QBusinessApi for SdkQBusinessClient {
    async fn create_application(&self, input: CreateApplicationInput) -> ApiResult<Created> {
        let api = API_CREATE_APPLICATION;
        let output = self
            .client
            .create_application()
            .display_name(input.display_name)
            .set_description(input.description)
            .set_role_arn(input.role_arn)
            .set_identity_center_instance_arn(input.identity_center_instance_arn)
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "applicationId", output.application_id().owned())?,
            arn: output.application_arn().owned(),
        })
    }

    async fn get_application(&self, application_id: &str) -> ApiResult<ApplicationDetail> {
        let output = self
            .client
            .get_application()
            .application_id(application_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_APPLICATION, e))?;
        Ok(ApplicationDetail {
            application_id: output
                .application_id()
                .owned()
                .unwrap_or_else(|| application_id.to_string()),
            application_arn: output.application_arn().owned(),
            display_name: output.display_name().owned(),
            description: output.description().owned(),
            role_arn: output.role_arn().owned(),
            identity_center_application_arn: output.identity_center_application_arn().owned(),
            status: output
                .status()
                .map(|s| ApplicationStatus::from_wire(s.as_str())),
            error_message: error_message(output.error()),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_application(&self, input: UpdateApplicationInput) -> ApiResult<()> {
        self.client
            .update_application()
            .application_id(input.application_id)
            .set_display_name(input.display_name)
            .set_description(input.description)
            .set_role_arn(input.role_arn)
            .set_identity_center_instance_arn(input.identity_center_instance_arn)
            .send()
            .await
            .map_err(|e| service_error(API_UPDATE_APPLICATION, e))?;
        Ok(())
    }

    async fn delete_application(&self, application_id: &str) -> ApiResult<()> {
        self.client
            .delete_application()
            .application_id(application_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_APPLICATION, e))?;
        Ok(())
    }

    async fn list_applications(&self, next_token: Option<String>) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_applications()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_APPLICATIONS, e))?;
        Ok(page(
            output.applications().or_empty(),
            |app| app.application_id().owned(),
            output.next_token(),
        ))
    }

    async fn create_index(&self, input: CreateIndexInput) -> ApiResult<Created> {
        let api = API_CREATE_INDEX;
        let output = self
            .client
            .create_index()
            .application_id(input.application_id)
            .display_name(input.display_name)
            .set_description(input.description)
            .set_type(input.index_type.as_deref().map(sdk::IndexType::from))
            .set_capacity_configuration(input.capacity_units.map(|units| {
                sdk::IndexCapacityConfiguration::builder()
                    .units(units)
                    .build()
            }))
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "indexId", output.index_id().owned())?,
            arn: output.index_arn().owned(),
        })
    }

    async fn get_index(&self, application_id: &str, index_id: &str) -> ApiResult<IndexDetail> {
        let output = self
            .client
            .get_index()
            .application_id(application_id)
            .index_id(index_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_INDEX, e))?;
        Ok(IndexDetail {
            application_id: application_id.to_string(),
            index_id: output
                .index_id()
                .owned()
                .unwrap_or_else(|| index_id.to_string()),
            index_arn: output.index_arn().owned(),
            display_name: output.display_name().owned(),
            description: output.description().owned(),
            index_type: output.r#type().map(|t| t.as_str().to_string()),
            capacity_units: output.capacity_configuration().and_then(|c| c.units()),
            status: output.status().map(|s| IndexStatus::from_wire(s.as_str())),
            error_message: error_message(output.error()),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_index(&self, input: UpdateIndexInput) -> ApiResult<()> {
        self.client
            .update_index()
            .application_id(input.application_id)
            .index_id(input.index_id)
            .set_display_name(input.display_name)
            .set_description(input.description)
            .set_capacity_configuration(input.capacity_units.map(|units| {
                sdk::IndexCapacityConfiguration::builder()
                    .units(units)
                    .build()
            }))
            .send()
            .await
            .map_err(|e| service_error(API_UPDATE_INDEX, e))?;
        Ok(())
    }

    async fn delete_index(&self, application_id: &str, index_id: &str) -> ApiResult<()> {
        self.client
            .delete_index()
            .application_id(application_id)
            .index_id(index_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_INDEX, e))?;
        Ok(())
    }

    async fn list_indices(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_indices()
            .application_id(application_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_INDICES, e))?;
        Ok(page(
            output.indices().or_empty(),
            |index| index.index_id().owned(),
            output.next_token(),
        ))
    }

    async fn create_retriever(&self, input: CreateRetrieverInput) -> ApiResult<Created> {
        let api = API_CREATE_RETRIEVER;
        let output = self
            .client
            .create_retriever()
            .application_id(input.application_id)
            .display_name(input.display_name)
            .r#type(sdk::RetrieverType::from(input.retriever_type.as_str()))
            .configuration(sdk_retriever_config(api, &input.configuration)?)
            .set_role_arn(input.role_arn)
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "retrieverId", output.retriever_id().owned())?,
            arn: output.retriever_arn().owned(),
        })
    }

    async fn get_retriever(
        &self,
        application_id: &str,
        retriever_id: &str,
    ) -> ApiResult<RetrieverDetail> {
        let output = self
            .client
            .get_retriever()
            .application_id(application_id)
            .retriever_id(retriever_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_RETRIEVER, e))?;
        Ok(RetrieverDetail {
            application_id: application_id.to_string(),
            retriever_id: output
                .retriever_id()
                .owned()
                .unwrap_or_else(|| retriever_id.to_string()),
            retriever_arn: output.retriever_arn().owned(),
            display_name: output.display_name().owned(),
            retriever_type: output.r#type().map(|t| t.as_str().to_string()),
            status: output
                .status()
                .map(|s| RetrieverStatus::from_wire(s.as_str())),
            configuration: output.configuration().and_then(retriever_config),
            role_arn: output.role_arn().owned(),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_retriever(&self, input: UpdateRetrieverInput) -> ApiResult<()> {
        let api = API_UPDATE_RETRIEVER;
        let configuration = input
            .configuration
            .as_ref()
            .map(|config| sdk_retriever_config(api, config))
            .transpose()?;
        self.client
            .update_retriever()
            .application_id(input.application_id)
            .retriever_id(input.retriever_id)
            .set_display_name(input.display_name)
            .set_configuration(configuration)
            .set_role_arn(input.role_arn)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(())
    }

    async fn delete_retriever(&self, application_id: &str, retriever_id: &str) -> ApiResult<()> {
        self.client
            .delete_retriever()
            .application_id(application_id)
            .retriever_id(retriever_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_RETRIEVER, e))?;
        Ok(())
    }

    async fn list_retrievers(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_retrievers()
            .application_id(application_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_RETRIEVERS, e))?;
        Ok(page(
            output.retrievers().or_empty(),
            |retriever| retriever.retriever_id().owned(),
            output.next_token(),
        ))
    }

    async fn create_plugin(&self, input: CreatePluginInput) -> ApiResult<Created> {
        let api = API_CREATE_PLUGIN;
        let output = self
            .client
            .create_plugin()
            .application_id(input.application_id)
            .display_name(input.display_name)
            .r#type(sdk::PluginType::from(input.plugin_type.as_str()))
            .set_server_url(input.server_url)
            .auth_configuration(sdk_plugin_auth(api, &input.auth)?)
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "pluginId", output.plugin_id().owned())?,
            arn: output.plugin_arn().owned(),
        })
    }

    async fn get_plugin(&self, application_id: &str, plugin_id: &str) -> ApiResult<PluginDetail> {
        let output = self
            .client
            .get_plugin()
            .application_id(application_id)
            .plugin_id(plugin_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_PLUGIN, e))?;
        Ok(PluginDetail {
            application_id: application_id.to_string(),
            plugin_id: output
                .plugin_id()
                .owned()
                .unwrap_or_else(|| plugin_id.to_string()),
            plugin_arn: output.plugin_arn().owned(),
            display_name: output.display_name().owned(),
            plugin_type: output.r#type().map(|t| t.as_str().to_string()),
            server_url: output.server_url().owned(),
            auth: output.auth_configuration().and_then(plugin_auth),
            state: output.state().map(|s| s.as_str().to_string()),
            build_status: output
                .build_status()
                .map(|s| PluginBuildStatus::from_wire(s.as_str())),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_plugin(&self, input: UpdatePluginInput) -> ApiResult<()> {
        let api = API_UPDATE_PLUGIN;
        let auth = input
            .auth
            .as_ref()
            .map(|auth| sdk_plugin_auth(api, auth))
            .transpose()?;
        self.client
            .update_plugin()
            .application_id(input.application_id)
            .plugin_id(input.plugin_id)
            .set_display_name(input.display_name)
            .set_state(input.state.as_deref().map(sdk::PluginState::from))
            .set_server_url(input.server_url)
            .set_auth_configuration(auth)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(())
    }

    async fn delete_plugin(&self, application_id: &str, plugin_id: &str) -> ApiResult<()> {
        self.client
            .delete_plugin()
            .application_id(application_id)
            .plugin_id(plugin_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_PLUGIN, e))?;
        Ok(())
    }

    async fn list_plugins(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_plugins()
            .application_id(application_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_PLUGINS, e))?;
        Ok(page(
            output.plugins().or_empty(),
            |plugin| plugin.plugin_id().owned(),
            output.next_token(),
        ))
    }

    async fn create_data_accessor(&self, input: CreateDataAccessorInput) -> ApiResult<Created> {
        let api = API_CREATE_DATA_ACCESSOR;
        let output = self
            .client
            .create_data_accessor()
            .application_id(input.application_id)
            .display_name(input.display_name)
            .principal(input.principal)
            .set_action_configurations(Some(sdk_actions(api, &input.actions)?))
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "dataAccessorId", output.data_accessor_id().owned())?,
            arn: output.data_accessor_arn().owned(),
        })
    }

    async fn get_data_accessor(
        &self,
        application_id: &str,
        data_accessor_id: &str,
    ) -> ApiResult<DataAccessorDetail> {
        let output = self
            .client
            .get_data_accessor()
            .application_id(application_id)
            .data_accessor_id(data_accessor_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_DATA_ACCESSOR, e))?;
        Ok(DataAccessorDetail {
            application_id: application_id.to_string(),
            data_accessor_id: output
                .data_accessor_id()
                .owned()
                .unwrap_or_else(|| data_accessor_id.to_string()),
            data_accessor_arn: output.data_accessor_arn().owned(),
            idc_application_arn: output.idc_application_arn().owned(),
            display_name: output.display_name().owned(),
            principal: output.principal().owned(),
            actions: output
                .action_configurations()
                .or_empty()
                .iter()
                .filter_map(|config| config.action().owned())
                .collect(),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_data_accessor(&self, input: UpdateDataAccessorInput) -> ApiResult<()> {
        let api = API_UPDATE_DATA_ACCESSOR;
        self.client
            .update_data_accessor()
            .application_id(input.application_id)
            .data_accessor_id(input.data_accessor_id)
            .set_display_name(input.display_name)
            .set_action_configurations(Some(sdk_actions(api, &input.actions)?))
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(())
    }

    async fn delete_data_accessor(
        &self,
        application_id: &str,
        data_accessor_id: &str,
    ) -> ApiResult<()> {
        self.client
            .delete_data_accessor()
            .application_id(application_id)
            .data_accessor_id(data_accessor_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_DATA_ACCESSOR, e))?;
        Ok(())
    }

    async fn list_data_accessors(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_data_accessors()
            .application_id(application_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_DATA_ACCESSORS, e))?;
        Ok(page(
            output.data_accessors().or_empty(),
            |accessor| accessor.data_accessor_id().owned(),
            output.next_token(),
        ))
    }

    async fn create_web_experience(&self, input: CreateWebExperienceInput) -> ApiResult<Created> {
        let api = API_CREATE_WEB_EXPERIENCE;
        let origins = (!input.origins.is_empty()).then_some(input.origins);
        let identity_provider = input
            .identity_provider
            .as_ref()
            .map(|provider| sdk_identity_provider(api, provider))
            .transpose()?;
        let output = self
            .client
            .create_web_experience()
            .application_id(input.application_id)
            .set_title(input.title)
            .set_subtitle(input.subtitle)
            .set_welcome_message(input.welcome_message)
            .set_sample_prompts_control_mode(
                input
                    .sample_prompts_control_mode
                    .as_deref()
                    .map(sdk::WebExperienceSamplePromptsControlMode::from),
            )
            .set_origins(origins)
            .set_role_arn(input.role_arn)
            .set_identity_provider_configuration(identity_provider)
            .set_client_token(input.client_token)
            .set_tags(sdk_tags(api, &input.tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(Created {
            id: required(api, "webExperienceId", output.web_experience_id().owned())?,
            arn: output.web_experience_arn().owned(),
        })
    }

    async fn get_web_experience(
        &self,
        application_id: &str,
        web_experience_id: &str,
    ) -> ApiResult<WebExperienceDetail> {
        let output = self
            .client
            .get_web_experience()
            .application_id(application_id)
            .web_experience_id(web_experience_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_WEB_EXPERIENCE, e))?;
        Ok(WebExperienceDetail {
            application_id: application_id.to_string(),
            web_experience_id: output
                .web_experience_id()
                .owned()
                .unwrap_or_else(|| web_experience_id.to_string()),
            web_experience_arn: output.web_experience_arn().owned(),
            default_endpoint: output.default_endpoint().owned(),
            title: output.title().owned(),
            subtitle: output.subtitle().owned(),
            welcome_message: output.welcome_message().owned(),
            sample_prompts_control_mode: output
                .sample_prompts_control_mode()
                .map(|mode| mode.as_str().to_string()),
            origins: output.origins().or_empty().to_vec(),
            role_arn: output.role_arn().owned(),
            identity_provider: identity_provider(output.identity_provider_configuration()),
            status: output
                .status()
                .map(|s| WebExperienceStatus::from_wire(s.as_str())),
            error_message: error_message(output.error()),
            created_at: timestamp(output.created_at()),
            updated_at: timestamp(output.updated_at()),
        })
    }

    async fn update_web_experience(&self, input: UpdateWebExperienceInput) -> ApiResult<()> {
        let api = API_UPDATE_WEB_EXPERIENCE;
        let authentication = input
            .authentication
            .as_ref()
            .map(|saml| sdk_saml(api, saml))
            .transpose()?;
        let identity_provider = input
            .identity_provider
            .as_ref()
            .map(|provider| sdk_identity_provider(api, provider))
            .transpose()?;
        let builder = self
            .client
            .update_web_experience()
            .application_id(input.application_id)
            .web_experience_id(input.web_experience_id)
            .set_title(input.title)
            .set_subtitle(input.subtitle)
            .set_welcome_message(input.welcome_message)
            .set_sample_prompts_control_mode(
                input
                    .sample_prompts_control_mode
                    .as_deref()
                    .map(sdk::WebExperienceSamplePromptsControlMode::from),
            )
            .set_origins(input.origins)
            .set_role_arn(input.role_arn)
            .set_identity_provider_configuration(identity_provider);
        with_legacy_saml(builder, authentication)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(())
    }

    async fn delete_web_experience(
        &self,
        application_id: &str,
        web_experience_id: &str,
    ) -> ApiResult<()> {
        self.client
            .delete_web_experience()
            .application_id(application_id)
            .web_experience_id(web_experience_id)
            .send()
            .await
            .map_err(|e| service_error(API_DELETE_WEB_EXPERIENCE, e))?;
        Ok(())
    }

    async fn list_web_experiences(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        let output = self
            .client
            .list_web_experiences()
            .application_id(application_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_WEB_EXPERIENCES, e))?;
        Ok(page(
            output.web_experiences().or_empty(),
            |experience| experience.web_experience_id().owned(),
            output.next_token(),
        ))
    }

    async fn associate_permission(&self, input: AssociatePermissionInput) -> ApiResult<()> {
        self.client
            .associate_permission()
            .application_id(input.application_id)
            .statement_id(input.statement_id)
            .set_actions(Some(input.actions))
            .principal(input.principal)
            .send()
            .await
            .map_err(|e| service_error(API_ASSOCIATE_PERMISSION, e))?;
        Ok(())
    }

    async fn disassociate_permission(
        &self,
        application_id: &str,
        statement_id: &str,
    ) -> ApiResult<()> {
        self.client
            .disassociate_permission()
            .application_id(application_id)
            .statement_id(statement_id)
            .send()
            .await
            .map_err(|e| service_error(API_DISASSOCIATE_PERMISSION, e))?;
        Ok(())
    }

    async fn get_policy(&self, application_id: &str) -> ApiResult<Option<String>> {
        let output = self
            .client
            .get_policy()
            .application_id(application_id)
            .send()
            .await
            .map_err(|e| service_error(API_GET_POLICY, e))?;
        Ok(output.policy().owned())
    }

    async fn tag_resource(
        &self,
        resource_arn: &str,
        tags: BTreeMap<String, String>,
    ) -> ApiResult<()> {
        let api = API_TAG_RESOURCE;
        self.client
            .tag_resource()
            .resource_arn(resource_arn)
            .set_tags(sdk_tags(api, &tags)?)
            .send()
            .await
            .map_err(|e| service_error(api, e))?;
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()> {
        self.client
            .untag_resource()
            .resource_arn(resource_arn)
            .set_tag_keys(Some(tag_keys))
            .send()
            .await
            .map_err(|e| service_error(API_UNTAG_RESOURCE, e))?;
        Ok(())
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> ApiResult<Vec<Tag>> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(resource_arn)
            .send()
            .await
            .map_err(|e| service_error(API_LIST_TAGS_FOR_RESOURCE, e))?;
        Ok(output
            .tags()
            .or_empty()
            .iter()
            .map(|tag| {
                Tag::new(
                    tag.key().owned().unwrap_or_default(),
                    tag.value().owned().unwrap_or_default(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let converted = timestamp(Some(&SdkDateTime::from_secs(1_700_000_000)));
        assert_eq!(
            converted.map(|dt| dt.to_rfc3339()),
            Some("2023-11-14T22:13:20+00:00".to_string())
        );
        assert_eq!(timestamp(None), None);
    }

    #[test]
    fn test_empty_tags_are_not_sent() {
        assert_eq!(sdk_tags(API_TAG_RESOURCE, &BTreeMap::new()).unwrap(), None);
        let tags = BTreeMap::from([("team".to_string(), "search".to_string())]);
        let sent = sdk_tags(API_TAG_RESOURCE, &tags).unwrap().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].key(), "team");
    }

    #[test]
    fn test_retriever_configuration_round_trip() {
        let config = RetrieverConfig::NativeIndex {
            index_id: "idx-1".to_string(),
        };
        let sdk_config = sdk_retriever_config(API_CREATE_RETRIEVER, &config).unwrap();
        assert_eq!(retriever_config(&sdk_config), Some(config));
    }

    #[test]
    fn test_identity_provider_configuration_round_trip() {
        let saml = IdentityProvider::Saml {
            authentication_url: "https://idp.example.com/sso".to_string(),
        };
        let sdk_saml = sdk_identity_provider(API_CREATE_WEB_EXPERIENCE, &saml).unwrap();
        assert_eq!(identity_provider(Some(&sdk_saml)), Some(saml));

        let oidc = IdentityProvider::OpenIdConnect {
            secrets_arn: "arn:aws:secretsmanager:us-east-1:123456789012:secret:oidc".to_string(),
            secrets_role: "arn:aws:iam::123456789012:role/oidc".to_string(),
        };
        let sdk_oidc = sdk_identity_provider(API_UPDATE_WEB_EXPERIENCE, &oidc).unwrap();
        assert_eq!(identity_provider(Some(&sdk_oidc)), Some(oidc));
        assert_eq!(identity_provider(None), None);
    }

    #[test]
    fn test_required_field_missing() {
        let error = required(API_CREATE_INDEX, "indexId", None).unwrap_err();
        assert_eq!(error.api, API_CREATE_INDEX);
        assert!(error.message.contains("indexId"));
    }
}
