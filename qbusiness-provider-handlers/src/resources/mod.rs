//! Lifecycle handlers, one module per CloudFormation resource type.

pub mod application;
pub mod data_accessor;
pub mod index;
pub mod permission;
pub mod plugin;
pub mod retriever;
pub mod web_experience;

use crate::support::HandlerContext;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use qbusiness_provider_common::{
    Action, CallbackContext, ClassifiedFailure, HandlerErrorCode, ProgressEvent, ProviderError,
    ProviderResult, ResourceHandlerRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Application,
    Index,
    Retriever,
    Plugin,
    DataAccessor,
    WebExperience,
    Permission,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Application,
        ResourceType::Index,
        ResourceType::Retriever,
        ResourceType::Plugin,
        ResourceType::DataAccessor,
        ResourceType::WebExperience,
        ResourceType::Permission,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ResourceType::Application => application::TYPE_NAME,
            ResourceType::Index => index::TYPE_NAME,
            ResourceType::Retriever => retriever::TYPE_NAME,
            ResourceType::Plugin => plugin::TYPE_NAME,
            ResourceType::DataAccessor => data_accessor::TYPE_NAME,
            ResourceType::WebExperience => web_experience::TYPE_NAME,
            ResourceType::Permission => permission::TYPE_NAME,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|resource| resource.type_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "Unsupported resource type '{s}', expected one of: {}",
                    ResourceType::ALL
                        .iter()
                        .map(|r| r.type_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Run one lifecycle action for `resource` against a raw JSON request.
///
/// A request whose model does not match the resource schema yields a FAILED
/// `InvalidRequest` event rather than an error; `Err` is reserved for events
/// that cannot be serialized back.
pub async fn dispatch(
    ctx: &HandlerContext<'_>,
    resource: ResourceType,
    action: Action,
    request: Value,
    callback: CallbackContext,
) -> ProviderResult<ProgressEvent<Value>> {
    match resource {
        ResourceType::Application => {
            run(request, |r| application::handle(ctx, action, r, callback)).await
        }
        ResourceType::Index => run(request, |r| index::handle(ctx, action, r, callback)).await,
        ResourceType::Retriever => {
            run(request, |r| retriever::handle(ctx, action, r, callback)).await
        }
        ResourceType::Plugin => run(request, |r| plugin::handle(ctx, action, r, callback)).await,
        ResourceType::DataAccessor => {
            run(request, |r| data_accessor::handle(ctx, action, r, callback)).await
        }
        ResourceType::WebExperience => {
            run(request, |r| web_experience::handle(ctx, action, r, callback)).await
        }
        ResourceType::Permission => {
            run(request, |r| permission::handle(ctx, action, r, callback)).await
        }
    }
}

async fn run<M, F, Fut>(request: Value, handler: F) -> ProviderResult<ProgressEvent<Value>>
where
    M: DeserializeOwned + Serialize,
    F: FnOnce(ResourceHandlerRequest<M>) -> Fut,
    Fut: std::future::Future<Output = ProgressEvent<M>>,
{
    let request: ResourceHandlerRequest<M> = match serde_json::from_value(request) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejecting malformed request: {e}");
            return Ok(ProgressEvent::failed(
                None,
                ClassifiedFailure::new(
                    HandlerErrorCode::InvalidRequest,
                    format!("Invalid request provided: {e}"),
                ),
            ));
        }
    };
    handler(request).await.into_json()
}

/// Service timestamps are reported as RFC 3339 strings in UTC.
pub(crate) fn rfc3339(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}
