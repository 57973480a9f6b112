//! `AWS::QBusiness::DataAccessor`
//!
//! Data accessors are usable as soon as the service call returns, so none of
//! the lifecycle actions poll.

use super::rfc3339;
use crate::api::types::{CreateDataAccessorInput, DataAccessorDetail, UpdateDataAccessorInput};
use crate::support::{conclude, required, Halt, HandlerContext, Step};
use log::info;
use qbusiness_provider_common::arn::ArnScope;
use qbusiness_provider_common::tags::merge_create_tags;
use qbusiness_provider_common::{
    Action, CallbackContext, ProgressEvent, ProviderError, ResourceHandlerRequest, Tag, TagDiff,
    Tagged,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "AWS::QBusiness::DataAccessor";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionConfiguration {
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataAccessorModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_accessor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_accessor_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idc_application_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_configurations: Option<Vec<ActionConfiguration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Tagged for DataAccessorModel {
    fn tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }
}

impl DataAccessorModel {
    fn from_detail(detail: DataAccessorDetail, arn: String, tags: Option<Vec<Tag>>) -> Self {
        let actions = detail
            .actions
            .into_iter()
            .map(|action| ActionConfiguration { action })
            .collect::<Vec<_>>();
        Self {
            application_id: Some(detail.application_id),
            data_accessor_id: Some(detail.data_accessor_id),
            data_accessor_arn: Some(arn),
            idc_application_arn: detail.idc_application_arn,
            display_name: detail.display_name,
            principal: detail.principal,
            action_configurations: Some(actions).filter(|a| !a.is_empty()),
            created_at: rfc3339(detail.created_at),
            updated_at: rfc3339(detail.updated_at),
            tags,
        }
    }

    fn identifier(&self) -> String {
        format!(
            "{}|{}",
            self.application_id.as_deref().unwrap_or_default(),
            self.data_accessor_id.as_deref().unwrap_or_default()
        )
    }

    fn actions(&self) -> Step<Vec<String>> {
        let actions: Vec<String> = self
            .action_configurations
            .iter()
            .flatten()
            .map(|configuration| configuration.action.clone())
            .collect();
        if actions.is_empty() {
            return Err(Halt::from(ProviderError::invalid_request(
                "ActionConfigurations must contain at least one action",
            )));
        }
        Ok(actions)
    }
}

pub async fn handle(
    ctx: &HandlerContext<'_>,
    action: Action,
    request: ResourceHandlerRequest<DataAccessorModel>,
    _callback: CallbackContext,
) -> ProgressEvent<DataAccessorModel> {
    let mut model = request.desired_resource_state.clone().unwrap_or_default();
    let step = match action {
        Action::Create => create(ctx, &request, &mut model).await,
        Action::Read => read(ctx, &request, &model).await.map(ProgressEvent::success),
        Action::Update => update(ctx, &request, &model).await,
        Action::Delete => delete(ctx, &request, &model).await,
        Action::List => list(ctx, &request, &model).await,
    };
    conclude(model, step)
}

async fn create(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<DataAccessorModel>,
    model: &mut DataAccessorModel,
) -> Step<ProgressEvent<DataAccessorModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?.to_string();
    info!(
        "[StackId: {}, ApplicationId: {}] Entering Create Handler for {}",
        request.stack_id(),
        application_id,
        TYPE_NAME
    );
    let input = CreateDataAccessorInput {
        application_id,
        display_name: required(model.display_name.as_deref(), "DisplayName")?.to_string(),
        principal: required(model.principal.as_deref(), "Principal")?.to_string(),
        actions: model.actions()?,
        client_token: request.client_request_token.clone(),
        tags: merge_create_tags(request),
    };
    let created = ctx
        .client
        .create_data_accessor(input)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    model.data_accessor_id = Some(created.id);
    model.data_accessor_arn = created.arn;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn read(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<DataAccessorModel>,
    model: &DataAccessorModel,
) -> Step<DataAccessorModel> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let data_accessor_id = required(model.data_accessor_id.as_deref(), "DataAccessorId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, DataAccessorId: {}] Reading {}",
        request.stack_id(),
        application_id,
        data_accessor_id,
        TYPE_NAME
    );
    let detail = ctx
        .client
        .get_data_accessor(application_id, data_accessor_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;
    let arn = match detail.data_accessor_arn.clone() {
        Some(arn) => arn,
        None => ArnScope::from_request(request)?.child_arn(
            application_id,
            "data-accessor",
            data_accessor_id,
        ),
    };
    let tags = ctx.read_tags(TYPE_NAME, &identifier, &arn).await?;
    Ok(DataAccessorModel::from_detail(detail, arn, tags))
}

async fn update(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<DataAccessorModel>,
    model: &DataAccessorModel,
) -> Step<ProgressEvent<DataAccessorModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let data_accessor_id = required(model.data_accessor_id.as_deref(), "DataAccessorId")?;
    let identifier = model.identifier();
    info!(
        "[StackId: {}, ApplicationId: {}, DataAccessorId: {}] Entering Update Handler",
        request.stack_id(),
        application_id,
        data_accessor_id
    );
    let input = UpdateDataAccessorInput {
        application_id: application_id.to_string(),
        data_accessor_id: data_accessor_id.to_string(),
        display_name: model.display_name.clone(),
        actions: model.actions()?,
    };
    ctx.client
        .update_data_accessor(input)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &identifier, &e))?;

    let arn = || {
        ArnScope::from_request(request)
            .map(|scope| scope.child_arn(application_id, "data-accessor", data_accessor_id))
    };
    ctx.apply_tag_diff(TYPE_NAME, &identifier, arn, &TagDiff::from_request(request))
        .await?;

    read(ctx, request, model).await.map(ProgressEvent::success)
}

async fn delete(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<DataAccessorModel>,
    model: &DataAccessorModel,
) -> Step<ProgressEvent<DataAccessorModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let data_accessor_id = required(model.data_accessor_id.as_deref(), "DataAccessorId")?;
    info!(
        "[StackId: {}, ApplicationId: {}, DataAccessorId: {}] Entering Delete Handler",
        request.stack_id(),
        application_id,
        data_accessor_id
    );
    ctx.client
        .delete_data_accessor(application_id, data_accessor_id)
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, &model.identifier(), &e))?;
    Ok(ProgressEvent::deleted())
}

async fn list(
    ctx: &HandlerContext<'_>,
    request: &ResourceHandlerRequest<DataAccessorModel>,
    model: &DataAccessorModel,
) -> Step<ProgressEvent<DataAccessorModel>> {
    let application_id = required(model.application_id.as_deref(), "ApplicationId")?;
    let page = ctx
        .client
        .list_data_accessors(application_id, request.next_token.clone())
        .await
        .map_err(|e| ctx.fail(TYPE_NAME, application_id, &e))?;
    let models = page
        .items
        .into_iter()
        .map(|data_accessor_id| DataAccessorModel {
            application_id: Some(application_id.to_string()),
            data_accessor_id: Some(data_accessor_id),
            ..DataAccessorModel::default()
        })
        .collect();
    Ok(ProgressEvent::listed(models, page.next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actions_are_required() {
        let model = DataAccessorModel::default();
        assert!(model.actions().is_err());

        let model: DataAccessorModel = serde_json::from_value(json!({
            "ActionConfigurations": [{"Action": "qbusiness:SearchRelevantContent"}]
        }))
        .unwrap();
        assert_eq!(
            model.actions().unwrap(),
            vec!["qbusiness:SearchRelevantContent".to_string()]
        );
    }

    #[test]
    fn test_from_detail_maps_actions() {
        let detail = DataAccessorDetail {
            application_id: "app".to_string(),
            data_accessor_id: "da".to_string(),
            actions: vec!["qbusiness:ListConversations".to_string()],
            ..DataAccessorDetail::default()
        };
        let model = DataAccessorModel::from_detail(detail, "arn:da".to_string(), None);
        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({
                "ApplicationId": "app",
                "DataAccessorId": "da",
                "DataAccessorArn": "arn:da",
                "ActionConfigurations": [{"Action": "qbusiness:ListConversations"}]
            })
        );
    }
}
