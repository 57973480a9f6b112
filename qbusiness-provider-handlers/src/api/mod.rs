//! Outbound QBusiness service interface used by every resource handler.

mod sdk;
pub mod types;

pub use sdk::SdkQBusinessClient;

use async_trait::async_trait;
use qbusiness_provider_common::{ServiceError, Tag};
use std::collections::BTreeMap;
use types::{
    ApplicationDetail, AssociatePermissionInput, CreateApplicationInput, CreateDataAccessorInput,
    CreateIndexInput, CreatePluginInput, CreateRetrieverInput, CreateWebExperienceInput, Created,
    DataAccessorDetail, IndexDetail, Page, PluginDetail, RetrieverDetail, UpdateApplicationInput,
    UpdateDataAccessorInput, UpdateIndexInput, UpdatePluginInput, UpdateRetrieverInput,
    UpdateWebExperienceInput, WebExperienceDetail,
};

pub type ApiResult<T> = Result<T, ServiceError>;

// Operation names, as reported in fault messages.
pub const API_CREATE_APPLICATION: &str = "CreateApplication";
pub const API_GET_APPLICATION: &str = "GetApplication";
pub const API_UPDATE_APPLICATION: &str = "UpdateApplication";
pub const API_DELETE_APPLICATION: &str = "DeleteApplication";
pub const API_LIST_APPLICATIONS: &str = "ListApplications";
pub const API_CREATE_INDEX: &str = "CreateIndex";
pub const API_GET_INDEX: &str = "GetIndex";
pub const API_UPDATE_INDEX: &str = "UpdateIndex";
pub const API_DELETE_INDEX: &str = "DeleteIndex";
pub const API_LIST_INDICES: &str = "ListIndices";
pub const API_CREATE_RETRIEVER: &str = "CreateRetriever";
pub const API_GET_RETRIEVER: &str = "GetRetriever";
pub const API_UPDATE_RETRIEVER: &str = "UpdateRetriever";
pub const API_DELETE_RETRIEVER: &str = "DeleteRetriever";
pub const API_LIST_RETRIEVERS: &str = "ListRetrievers";
pub const API_CREATE_PLUGIN: &str = "CreatePlugin";
pub const API_GET_PLUGIN: &str = "GetPlugin";
pub const API_UPDATE_PLUGIN: &str = "UpdatePlugin";
pub const API_DELETE_PLUGIN: &str = "DeletePlugin";
pub const API_LIST_PLUGINS: &str = "ListPlugins";
pub const API_CREATE_DATA_ACCESSOR: &str = "CreateDataAccessor";
pub const API_GET_DATA_ACCESSOR: &str = "GetDataAccessor";
pub const API_UPDATE_DATA_ACCESSOR: &str = "UpdateDataAccessor";
pub const API_DELETE_DATA_ACCESSOR: &str = "DeleteDataAccessor";
pub const API_LIST_DATA_ACCESSORS: &str = "ListDataAccessors";
pub const API_CREATE_WEB_EXPERIENCE: &str = "CreateWebExperience";
pub const API_GET_WEB_EXPERIENCE: &str = "GetWebExperience";
pub const API_UPDATE_WEB_EXPERIENCE: &str = "UpdateWebExperience";
pub const API_DELETE_WEB_EXPERIENCE: &str = "DeleteWebExperience";
pub const API_LIST_WEB_EXPERIENCES: &str = "ListWebExperiences";
pub const API_ASSOCIATE_PERMISSION: &str = "AssociatePermission";
pub const API_DISASSOCIATE_PERMISSION: &str = "DisassociatePermission";
pub const API_GET_POLICY: &str = "GetPolicy";
pub const API_TAG_RESOURCE: &str = "TagResource";
pub const API_UNTAG_RESOURCE: &str = "UntagResource";
pub const API_LIST_TAGS_FOR_RESOURCE: &str = "ListTagsForResource";

/// The QBusiness operations the handlers depend on.
///
/// Implemented over the AWS SDK by [`SdkQBusinessClient`] and in memory by
/// `testing::FakeQBusiness`.
#[async_trait]
pub trait QBusinessApi: Send + Sync {
    async fn create_application(&self, input: CreateApplicationInput) -> ApiResult<Created>;
    async fn get_application(&self, application_id: &str) -> ApiResult<ApplicationDetail>;
    async fn update_application(&self, input: UpdateApplicationInput) -> ApiResult<()>;
    async fn delete_application(&self, application_id: &str) -> ApiResult<()>;
    async fn list_applications(&self, next_token: Option<String>) -> ApiResult<Page<String>>;

    async fn create_index(&self, input: CreateIndexInput) -> ApiResult<Created>;
    async fn get_index(&self, application_id: &str, index_id: &str) -> ApiResult<IndexDetail>;
    async fn update_index(&self, input: UpdateIndexInput) -> ApiResult<()>;
    async fn delete_index(&self, application_id: &str, index_id: &str) -> ApiResult<()>;
    async fn list_indices(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>>;

    async fn create_retriever(&self, input: CreateRetrieverInput) -> ApiResult<Created>;
    async fn get_retriever(
        &self,
        application_id: &str,
        retriever_id: &str,
    ) -> ApiResult<RetrieverDetail>;
    async fn update_retriever(&self, input: UpdateRetrieverInput) -> ApiResult<()>;
    async fn delete_retriever(&self, application_id: &str, retriever_id: &str) -> ApiResult<()>;
    async fn list_retrievers(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>>;

    async fn create_plugin(&self, input: CreatePluginInput) -> ApiResult<Created>;
    async fn get_plugin(&self, application_id: &str, plugin_id: &str) -> ApiResult<PluginDetail>;
    async fn update_plugin(&self, input: UpdatePluginInput) -> ApiResult<()>;
    async fn delete_plugin(&self, application_id: &str, plugin_id: &str) -> ApiResult<()>;
    async fn list_plugins(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>>;

    async fn create_data_accessor(&self, input: CreateDataAccessorInput) -> ApiResult<Created>;
    async fn get_data_accessor(
        &self,
        application_id: &str,
        data_accessor_id: &str,
    ) -> ApiResult<DataAccessorDetail>;
    async fn update_data_accessor(&self, input: UpdateDataAccessorInput) -> ApiResult<()>;
    async fn delete_data_accessor(
        &self,
        application_id: &str,
        data_accessor_id: &str,
    ) -> ApiResult<()>;
    async fn list_data_accessors(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>>;

    async fn create_web_experience(&self, input: CreateWebExperienceInput) -> ApiResult<Created>;
    async fn get_web_experience(
        &self,
        application_id: &str,
        web_experience_id: &str,
    ) -> ApiResult<WebExperienceDetail>;
    async fn update_web_experience(&self, input: UpdateWebExperienceInput) -> ApiResult<()>;
    async fn delete_web_experience(
        &self,
        application_id: &str,
        web_experience_id: &str,
    ) -> ApiResult<()>;
    async fn list_web_experiences(
        &self,
        application_id: &str,
        next_token: Option<String>,
    ) -> ApiResult<Page<String>>;

    async fn associate_permission(&self, input: AssociatePermissionInput) -> ApiResult<()>;
    async fn disassociate_permission(
        &self,
        application_id: &str,
        statement_id: &str,
    ) -> ApiResult<()>;
    /// The application's resource policy document, if one is attached.
    async fn get_policy(&self, application_id: &str) -> ApiResult<Option<String>>;

    async fn tag_resource(
        &self,
        resource_arn: &str,
        tags: BTreeMap<String, String>,
    ) -> ApiResult<()>;
    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()>;
    async fn list_tags_for_resource(&self, resource_arn: &str) -> ApiResult<Vec<Tag>>;
}
