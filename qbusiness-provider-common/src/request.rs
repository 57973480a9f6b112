//! Inbound handler request and the callback context threaded across re-invocations.

use crate::error::ProviderError;
use crate::stabilize::PollCheckpoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Lifecycle action requested by CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Read => "Read",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::List => "List",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "list" => Ok(Action::List),
            other => Err(ProviderError::invalid_request(format!(
                "Unknown action '{other}', expected one of create, read, update, delete, list"
            ))),
        }
    }
}

/// A CloudFormation resource handler request for a resource model `M`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHandlerRequest<M> {
    pub client_request_token: Option<String>,
    pub desired_resource_state: Option<M>,
    pub previous_resource_state: Option<M>,
    pub desired_resource_tags: Option<HashMap<String, String>>,
    pub previous_resource_tags: Option<HashMap<String, String>>,
    pub system_tags: Option<HashMap<String, String>>,
    pub previous_system_tags: Option<HashMap<String, String>>,
    pub aws_account_id: Option<String>,
    pub aws_partition: Option<String>,
    pub region: Option<String>,
    pub stack_id: Option<String>,
    pub logical_resource_identifier: Option<String>,
    pub next_token: Option<String>,
}

impl<M> ResourceHandlerRequest<M> {
    pub fn new(desired_resource_state: M) -> Self {
        Self {
            client_request_token: None,
            desired_resource_state: Some(desired_resource_state),
            previous_resource_state: None,
            desired_resource_tags: None,
            previous_resource_tags: None,
            system_tags: None,
            previous_system_tags: None,
            aws_account_id: None,
            aws_partition: None,
            region: None,
            stack_id: None,
            logical_resource_identifier: None,
            next_token: None,
        }
    }

    pub fn stack_id(&self) -> &str {
        self.stack_id.as_deref().unwrap_or("-")
    }
}

/// Which handler step a suspended stabilization belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StabilizationStep {
    Create,
    PostCreateUpdate,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStabilization {
    pub step: StabilizationStep,
    pub checkpoint: PollCheckpoint,
}

/// Opaque state CloudFormation hands back on re-invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingStabilization>,
}

impl CallbackContext {
    pub fn suspended(step: StabilizationStep, checkpoint: PollCheckpoint) -> Self {
        Self {
            pending: Some(PendingStabilization { step, checkpoint }),
        }
    }

    /// Checkpoint to resume from when the pending stabilization belongs to `step`.
    pub fn resume_for(&self, step: StabilizationStep) -> Option<PollCheckpoint> {
        self.pending
            .filter(|pending| pending.step == step)
            .map(|pending| pending.checkpoint)
    }

    pub fn pending_step(&self) -> Option<StabilizationStep> {
        self.pending.map(|pending| pending.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_from_str_is_case_insensitive() {
        assert_eq!("CREATE".parse::<Action>().unwrap(), Action::Create);
        assert_eq!("delete".parse::<Action>().unwrap(), Action::Delete);
        assert!("destroy".parse::<Action>().is_err());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ResourceHandlerRequest<serde_json::Value> = serde_json::from_value(json!({
            "clientRequestToken": "token",
            "desiredResourceState": {"ApplicationId": "app"},
            "desiredResourceTags": {"stack": "tag"},
            "awsAccountId": "123456789012",
            "region": "us-east-1",
            "stackId": "stack-1"
        }))
        .unwrap();
        assert_eq!(request.client_request_token.as_deref(), Some("token"));
        assert_eq!(
            request.desired_resource_state.as_ref().unwrap()["ApplicationId"],
            "app"
        );
        assert_eq!(request.stack_id(), "stack-1");
        assert!(request.previous_resource_state.is_none());
    }

    #[test]
    fn test_callback_context_resumes_only_matching_step() {
        let checkpoint = PollCheckpoint {
            attempts: 3,
            elapsed_ms: 15_000,
            delay_secs: 5,
        };
        let context = CallbackContext::suspended(StabilizationStep::Create, checkpoint);
        assert_eq!(
            context.resume_for(StabilizationStep::Create),
            Some(checkpoint)
        );
        assert_eq!(context.resume_for(StabilizationStep::PostCreateUpdate), None);

        let round_trip: CallbackContext =
            serde_json::from_value(serde_json::to_value(&context).unwrap()).unwrap();
        assert_eq!(round_trip, context);
    }
}
