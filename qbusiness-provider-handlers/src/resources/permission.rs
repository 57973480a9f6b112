//! `AWS::QBusiness::Permission`
//!
//! A permission is one statement in the application's resource policy. It has
//! no service-side status and no tags, and every property is create-only.

use crate::api::types::AssociatePermissionInput;
use crate::api::API_GET_POLICY;
use crate::support::{conclude, required, Halt, HandlerContext, Step};
use log::info;
use qbusiness_provider_common::{
    Action, CallbackContext, ClassifiedFailure, HandlerErrorCode, ProgressEvent, ProviderError,
    ResourceHandlerRequest, ServiceError,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "AWS::QBusiness::Permission";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}

impl PermissionModel {
    fn identifier(&self) -> String {
        format!(
            "{}|{}",
            self.application_id.as_deref().unwrap_or_default(),
            self.statement_id.as_deref().unwrap_or_default()
        )
    }
}

/// IAM policy fields that may hold either a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Principal {
    Service {
        #[serde(rename = "AWS")]
        aws: OneOrMany,
    },
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Statement {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    principal: Option<Principal>,
    #[serde(default)]
    action: Option<OneOrMany>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResourcePolicy {
    #[serde(default)]
    statement: Vec<Statement>,
}

impl ResourcePolicy {
    fn parse(document: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(document)?)
    }

    fn statement_ids(self) -> Vec<String> {
        self.statement.into_iter().filter_map(|s| s.sid).collect()
    }

    /// The model for the statement whose `Sid` is `statement_id`.
    fn find(self, application_id: &str, statement_id: &str) -> Option<PermissionModel> {
        let statement = self
            .statement
            .into_iter()
            .find(|s| s.sid.as_deref() == Some(statement_id))?;
        let principal = statement.principal.and_then(|principal| match principal {
            Principal::Plain(value) => Some(value),
            Principal::Service { aws } => aws.into_vec().into_iter().next(),
        });
        Some(PermissionModel {
            application_id: Some(application_id.to_string()),
            statement_id: Some(statement_id.to_string()),
            actions: statement.action.map(OneOrMany::into_vec),
            principal,
        })
    }
}

pub async fn handle(
    ctx: &HandlerContext<'_>,
    action: Action,
    request: ResourceHandlerRequest<PermissionModel>,
    _callback: CallbackContext,
) -> ProgressEvent<PermissionModel> {
    let model = request.desired_resource_state.clone().unwrap_or_default();
    let step = match action {
        Action::Create => create(ctx, &request, &model).await,
        Action::Read => read(ctx, &request, &model).await.map(ProgressEvent::success),
        Action::Update => Err(Halt::Fail(ClassifiedFailure::new(
            HandlerErrorCode::NotUpdatable,
            format!(
                "Resource of type '{}' with identifier '{}' is not updatable",
                TYPE_NAME,
                model.identifier()
            ),
        ))),
        Action::Delete => delete(ctx, &request, &model).await,
        Action::List => list(ctx, &model).await,
    };
    conclude(model, step)
}

async fn create(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PermissionModel>,
    model: &PermissionModel,
) -> Step<ProgressEvent<PermissionModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let statement_id = required(model.statement_id.as_deref(), "StatementId")?;
    info!(
        "[StackId: {}, ApplicationId: {}, StatementId: {}] Entering Create Handler",
        request.stack_id(),
        application_id,
        statement_id
    );
    let actions = model.actions.clone().unwrap_or_default();
    if actions.is_empty() {
        return Err(Halt::from(ProviderError::invalid_request(
            "Actions must contain at least one action",
        )));
    }
    let input = AssociatePermissionInput {
        application_id: application_id.to_string(),
        statement_id: statement_id.to_string(),
        actions,
        principal: required(model.principal.as_deref(), "Principal")?.to_string(),
    };
    ctx.client
        .associate_permission(input)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn read(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PermissionModel>,
    model: &PermissionModel,
) -> Step<PermissionModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let statement_id = required(model.statement_id.as_deref(), "StatementId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, StatementId: {}] Reading {}",
        request.stack_id(),
        application_id,
        statement_id,
        TYPE_NAME
    );
    let document = ctx
        .client
        .get_policy(application_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let found = match document {
        Some(document) => ResourcePolicy::parse(&document)?.find(application_id, statement_id),
        None => None,
    };
    found.ok_or_else(|| {
        let missing = ServiceError::not_found(
            API_GET_POLICY,
            format!("No policy statement with Sid '{statement_id}'"),
        );
        ctx.fail(TYPE_NAME, &identifier, &missing)
    })
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<PermissionModel>,
    model: &PermissionModel,
) -> Step<ProgressEvent<PermissionModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let statement_id = required(model.statement_id.as_deref(), "StatementId")?;
    info!(
        "[StackId: {}, ApplicationId: {}, StatementId: {}] Entering Delete Handler",
        request.stack_id(),
        application_id,
        statement_id
    );
    ctx.client
        .disassociate_permission(application_id, statement_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    Ok(ProgressEvent::deleted())
}

async fn list(
    ctx: &HandlerContext<'_>,
    model: &PermissionModel,
) -> Step<ProgressEvent<PermissionModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let document = ctx
        .client
        .get_policy(application_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let statement_ids = match document {
        Some(document) => ResourcePolicy::parse(&document)?.statement_ids(),
        None => Vec::new(),
    };
    let models = statement_ids
        .into_iter()
        .map(|statement_id| PermissionModel {
            application_id: Some(application_id.to_string()),
            statement_id: Some(statement_id),
            ..PermissionModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"{
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "allow-search",
                "Effect": "Allow",
                "Principal": {"AWS": "arn:aws:iam::123456789012:role/search"},
                "Action": ["qbusiness:SearchRelevantContent", "qbusiness:ListConversations"],
                "Resource": "arn:aws:qbusiness:us-east-1:123456789012:application/app"
            },
            {
                "Sid": "allow-chat",
                "Effect": "Allow",
                "Principal": {"AWS": ["arn:aws:iam::123456789012:role/chat"]},
                "Action": "qbusiness:Chat"
            }
        ]
    }"#;

    #[test]
    fn test_find_statement_by_sid() {
        let model = ResourcePolicy::parse(POLICY)
            .unwrap()
            .find("app", "allow-chat")
            .unwrap();
        assert_eq!(
            model,
            PermissionModel {
                application_id: Some("app".to_string()),
                statement_id: Some("allow-chat".to_string()),
                actions: Some(vec!["qbusiness:Chat".to_string()]),
                principal: Some("arn:aws:iam::123456789012:role/chat".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_statement() {
        assert_eq!(
            ResourcePolicy::parse(POLICY).unwrap().find("app", "absent"),
            None
        );
    }

    #[test]
    fn test_statement_ids() {
        assert_eq!(
            ResourcePolicy::parse(POLICY).unwrap().statement_ids(),
            vec!["allow-search".to_string(), "allow-chat".to_string()]
        );
    }

    #[test]
    fn test_malformed_policy_is_a_serialization_error() {
        assert!(matches!(
            ResourcePolicy::parse("not json"),
            Err(ProviderError::Serialization(_))
        ));
    }
}
