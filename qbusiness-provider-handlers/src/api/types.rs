//! Request and response shapes exchanged with the QBusiness API.
//!
//! These mirror the service operations closely but only carry the members the
//! handlers read or write. Resource models translate to and from them.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! service_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A status value introduced by the service after this provider was built.
            Unknown(String),
        }

        impl $name {
            pub fn from_wire(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Unknown(other.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(other) => other,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

service_status!(ApplicationStatus {
    Creating => "CREATING",
    Active => "ACTIVE",
    Deleting => "DELETING",
    Failed => "FAILED",
    Updating => "UPDATING",
});

service_status!(IndexStatus {
    Creating => "CREATING",
    Active => "ACTIVE",
    Deleting => "DELETING",
    Failed => "FAILED",
    Updating => "UPDATING",
});

service_status!(RetrieverStatus {
    Creating => "CREATING",
    Active => "ACTIVE",
    Failed => "FAILED",
});

service_status!(PluginBuildStatus {
    Ready => "READY",
    CreateInProgress => "CREATE_IN_PROGRESS",
    CreateFailed => "CREATE_FAILED",
    UpdateInProgress => "UPDATE_IN_PROGRESS",
    UpdateFailed => "UPDATE_FAILED",
    DeleteInProgress => "DELETE_IN_PROGRESS",
    DeleteFailed => "DELETE_FAILED",
});

service_status!(WebExperienceStatus {
    Creating => "CREATING",
    Active => "ACTIVE",
    Deleting => "DELETING",
    Failed => "FAILED",
    PendingAuthConfig => "PENDING_AUTH_CONFIG",
});

/// One page of a list operation: resource ids plus the continuation token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Identifiers returned by a create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Created {
    pub id: String,
    pub arn: Option<String>,
}

// Application

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateApplicationInput {
    pub display_name: String,
    pub description: Option<String>,
    pub role_arn: Option<String>,
    pub identity_center_instance_arn: Option<String>,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateApplicationInput {
    pub application_id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub role_arn: Option<String>,
    pub identity_center_instance_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDetail {
    pub application_id: String,
    pub application_arn: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub role_arn: Option<String>,
    pub identity_center_application_arn: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Index

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateIndexInput {
    pub application_id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub index_type: Option<String>,
    pub capacity_units: Option<i32>,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateIndexInput {
    pub application_id: String,
    pub index_id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub capacity_units: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDetail {
    pub application_id: String,
    pub index_id: String,
    pub index_arn: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub index_type: Option<String>,
    pub capacity_units: Option<i32>,
    pub status: Option<IndexStatus>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Retriever

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieverConfig {
    NativeIndex { index_id: String },
    KendraIndex { index_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRetrieverInput {
    pub application_id: String,
    pub display_name: String,
    pub retriever_type: String,
    pub configuration: RetrieverConfig,
    pub role_arn: Option<String>,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRetrieverInput {
    pub application_id: String,
    pub retriever_id: String,
    pub display_name: Option<String>,
    pub configuration: Option<RetrieverConfig>,
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieverDetail {
    pub application_id: String,
    pub retriever_id: String,
    pub retriever_arn: Option<String>,
    pub display_name: Option<String>,
    pub retriever_type: Option<String>,
    pub status: Option<RetrieverStatus>,
    pub configuration: Option<RetrieverConfig>,
    pub role_arn: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Plugin

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginAuth {
    NoAuth,
    Basic { secret_arn: String, role_arn: String },
    OAuth2 { secret_arn: String, role_arn: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePluginInput {
    pub application_id: String,
    pub display_name: String,
    pub plugin_type: String,
    pub server_url: Option<String>,
    pub auth: PluginAuth,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePluginInput {
    pub application_id: String,
    pub plugin_id: String,
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub server_url: Option<String>,
    pub auth: Option<PluginAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginDetail {
    pub application_id: String,
    pub plugin_id: String,
    pub plugin_arn: Option<String>,
    pub display_name: Option<String>,
    pub plugin_type: Option<String>,
    pub server_url: Option<String>,
    pub auth: Option<PluginAuth>,
    pub state: Option<String>,
    pub build_status: Option<PluginBuildStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Data accessor

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDataAccessorInput {
    pub application_id: String,
    pub display_name: String,
    pub principal: String,
    pub actions: Vec<String>,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDataAccessorInput {
    pub application_id: String,
    pub data_accessor_id: String,
    pub display_name: Option<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataAccessorDetail {
    pub application_id: String,
    pub data_accessor_id: String,
    pub data_accessor_arn: Option<String>,
    pub idc_application_arn: Option<String>,
    pub display_name: Option<String>,
    pub principal: Option<String>,
    pub actions: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Web experience

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlAuth {
    pub metadata_xml: String,
    pub role_arn: String,
    pub user_id_attribute: String,
    pub user_group_attribute: Option<String>,
}

/// Identity provider the web experience signs users in through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityProvider {
    Saml {
        authentication_url: String,
    },
    OpenIdConnect {
        secrets_arn: String,
        secrets_role: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateWebExperienceInput {
    pub application_id: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub sample_prompts_control_mode: Option<String>,
    pub origins: Vec<String>,
    pub role_arn: Option<String>,
    pub identity_provider: Option<IdentityProvider>,
    pub client_token: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateWebExperienceInput {
    pub application_id: String,
    pub web_experience_id: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub sample_prompts_control_mode: Option<String>,
    pub origins: Option<Vec<String>>,
    pub role_arn: Option<String>,
    pub identity_provider: Option<IdentityProvider>,
    /// SAML metadata attached through the legacy authentication field.
    pub authentication: Option<SamlAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebExperienceDetail {
    pub application_id: String,
    pub web_experience_id: String,
    pub web_experience_arn: Option<String>,
    pub default_endpoint: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub sample_prompts_control_mode: Option<String>,
    pub origins: Vec<String>,
    pub role_arn: Option<String>,
    pub identity_provider: Option<IdentityProvider>,
    pub status: Option<WebExperienceStatus>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Permission

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociatePermissionInput {
    pub application_id: String,
    pub statement_id: String,
    pub actions: Vec<String>,
    pub principal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_wire_values() {
        assert_eq!(
            WebExperienceStatus::from_wire("PENDING_AUTH_CONFIG"),
            WebExperienceStatus::PendingAuthConfig
        );
        assert_eq!(PluginBuildStatus::DeleteFailed.as_str(), "DELETE_FAILED");
        assert_eq!(IndexStatus::Updating.to_string(), "UPDATING");
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status = ApplicationStatus::from_wire("ARCHIVED");
        assert_eq!(status, ApplicationStatus::Unknown("ARCHIVED".to_string()));
        assert_eq!(status.as_str(), "ARCHIVED");
    }
}
