//! Progress events returned to CloudFormation after each handler invocation.

use crate::classify::ClassifiedFailure;
use crate::error::ProviderResult;
use crate::request::CallbackContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

/// CloudFormation handler error codes. Serialized with their PascalCase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    NotUpdatable,
    InvalidRequest,
    AccessDenied,
    NotFound,
    ResourceConflict,
    Throttling,
    ServiceLimitExceeded,
    NotStabilized,
    GeneralServiceException,
    ServiceInternalError,
    NetworkFailure,
    InternalFailure,
}

impl HandlerErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerErrorCode::NotUpdatable => "NotUpdatable",
            HandlerErrorCode::InvalidRequest => "InvalidRequest",
            HandlerErrorCode::AccessDenied => "AccessDenied",
            HandlerErrorCode::NotFound => "NotFound",
            HandlerErrorCode::ResourceConflict => "ResourceConflict",
            HandlerErrorCode::Throttling => "Throttling",
            HandlerErrorCode::ServiceLimitExceeded => "ServiceLimitExceeded",
            HandlerErrorCode::NotStabilized => "NotStabilized",
            HandlerErrorCode::GeneralServiceException => "GeneralServiceException",
            HandlerErrorCode::ServiceInternalError => "ServiceInternalError",
            HandlerErrorCode::NetworkFailure => "NetworkFailure",
            HandlerErrorCode::InternalFailure => "InternalFailure",
        }
    }
}

impl std::fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one handler invocation: `{status, resourceModel, errorCode, message, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent<M> {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<M>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<CallbackContext>,
    #[serde(default)]
    pub callback_delay_seconds: u64,
}

impl<M> ProgressEvent<M> {
    fn with_status(status: OperationStatus) -> Self {
        Self {
            status,
            resource_model: None,
            resource_models: None,
            next_token: None,
            error_code: None,
            message: None,
            callback_context: None,
            callback_delay_seconds: 0,
        }
    }

    pub fn success(model: M) -> Self {
        Self {
            resource_model: Some(model),
            ..Self::with_status(OperationStatus::Success)
        }
    }

    /// Success without a model, as reported once a delete has completed.
    pub fn deleted() -> Self {
        Self::with_status(OperationStatus::Success)
    }

    pub fn listed(models: Vec<M>, next_token: Option<String>) -> Self {
        Self {
            resource_models: Some(models),
            next_token,
            ..Self::with_status(OperationStatus::Success)
        }
    }

    pub fn failed(model: Option<M>, failure: ClassifiedFailure) -> Self {
        Self {
            resource_model: model,
            error_code: Some(failure.code),
            message: Some(failure.message),
            ..Self::with_status(OperationStatus::Failed)
        }
    }

    /// Ask CloudFormation to re-invoke the handler after `delay_seconds` with `context`.
    pub fn in_progress(model: M, context: CallbackContext, delay_seconds: u64) -> Self {
        Self {
            resource_model: Some(model),
            callback_context: Some(context),
            callback_delay_seconds: delay_seconds,
            ..Self::with_status(OperationStatus::InProgress)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == OperationStatus::Failed
    }

    /// Convert every carried model, keeping the rest of the event intact.
    pub fn try_map_models<N, E, F>(self, mut f: F) -> Result<ProgressEvent<N>, E>
    where
        F: FnMut(M) -> Result<N, E>,
    {
        let resource_model = self.resource_model.map(&mut f).transpose()?;
        let resource_models = match self.resource_models {
            Some(models) => Some(models.into_iter().map(&mut f).collect::<Result<Vec<_>, _>>()?),
            None => None,
        };
        Ok(ProgressEvent {
            status: self.status,
            resource_model,
            resource_models,
            next_token: self.next_token,
            error_code: self.error_code,
            message: self.message,
            callback_context: self.callback_context,
            callback_delay_seconds: self.callback_delay_seconds,
        })
    }
}

impl<M: Serialize> ProgressEvent<M> {
    pub fn into_json(self) -> ProviderResult<ProgressEvent<serde_json::Value>> {
        Ok(self.try_map_models(serde_json::to_value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_event_serialization() {
        let event = ProgressEvent::success(json!({"IndexId": "idx"}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "SUCCESS",
                "resourceModel": {"IndexId": "idx"},
                "callbackDelaySeconds": 0
            })
        );
    }

    #[test]
    fn test_failed_event_carries_code_and_message() {
        let event: ProgressEvent<()> = ProgressEvent::failed(
            None,
            ClassifiedFailure::new(HandlerErrorCode::Throttling, "Rate exceeded"),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["status"], "FAILED");
        assert_eq!(value["errorCode"], "Throttling");
        assert_eq!(value["message"], "Rate exceeded");
        assert!(event.is_failed());
    }

    #[test]
    fn test_deleted_event_has_no_model() {
        let event: ProgressEvent<String> = ProgressEvent::deleted();
        assert!(event.is_success());
        assert!(event.resource_model.is_none());
        assert!(event.resource_models.is_none());
        assert!(event.error_code.is_none());
    }

    #[test]
    fn test_into_json_maps_list_models() {
        let event = ProgressEvent::listed(vec![1, 2], Some("next".to_string()));
        let json_event = event.into_json().unwrap();
        assert_eq!(json_event.resource_models, Some(vec![json!(1), json!(2)]));
        assert_eq!(json_event.next_token.as_deref(), Some("next"));
    }
}
