//! In-memory [`QBusinessApi`] for handler tests.
//!
//! Every operation replays a queue of scripted results. The last queued
//! result repeats once the queue is down to one entry, so a single
//! `push_index(Ok(active))` answers every later `GetIndex`.
//!
//! Unscripted operations fall back to: `Ok(())` for mutations, a generated
//! id for creates, `NotFound` for gets, empty pages, no policy and no tags.

use crate::api::types::{
    ApplicationDetail, AssociatePermissionInput, CreateApplicationInput, CreateDataAccessorInput,
    CreateIndexInput, CreatePluginInput, CreateRetrieverInput, CreateWebExperienceInput, Created,
    DataAccessorDetail, IndexDetail, Page, PluginDetail, RetrieverDetail, UpdateApplicationInput,
    UpdateDataAccessorInput, UpdateIndexInput, UpdatePluginInput, UpdateRetrieverInput,
    UpdateWebExperienceInput, WebExperienceDetail,
};
use crate::api::*;
use async_trait::async_trait;
use qbusiness_provider_common::{ServiceError, Tag};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn replay<T: Clone>(queue: &mut VecDeque<ApiResult<T>>) -> Option<ApiResult<T>> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<&'static str>,
    outcomes: HashMap<&'static str, VecDeque<ApiResult<()>>>,
    created: HashMap<&'static str, VecDeque<ApiResult<Created>>>,
    pages: HashMap<&'static str, VecDeque<ApiResult<Page<String>>>>,
    applications: VecDeque<ApiResult<ApplicationDetail>>,
    indices: VecDeque<ApiResult<IndexDetail>>,
    retrievers: VecDeque<ApiResult<RetrieverDetail>>,
    plugins: VecDeque<ApiResult<PluginDetail>>,
    data_accessors: VecDeque<ApiResult<DataAccessorDetail>>,
    web_experiences: VecDeque<ApiResult<WebExperienceDetail>>,
    policies: VecDeque<ApiResult<Option<String>>>,
    tags: VecDeque<ApiResult<Vec<Tag>>>,
    create_tags: Vec<BTreeMap<String, String>>,
    tagged: Vec<(String, BTreeMap<String, String>)>,
    untagged: Vec<(String, Vec<String>)>,
    associated: Vec<AssociatePermissionInput>,
    plugin_updates: Vec<UpdatePluginInput>,
    web_experience_creates: Vec<CreateWebExperienceInput>,
    web_experience_updates: Vec<UpdateWebExperienceInput>,
}

#[derive(Default)]
pub struct FakeQBusiness {
    state: Mutex<FakeState>,
}

impl FakeQBusiness {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the result of a mutation such as `DeleteIndex` or `TagResource`.
    pub fn push_result(&self, api: &'static str, result: ApiResult<()>) -> &Self {
        self.state()
            .outcomes
            .entry(api)
            .or_default()
            .push_back(result);
        self
    }

    pub fn push_created(&self, api: &'static str, result: ApiResult<Created>) -> &Self {
        self.state().created.entry(api).or_default().push_back(result);
        self
    }

    pub fn push_page(&self, api: &'static str, result: ApiResult<Page<String>>) -> &Self {
        self.state().pages.entry(api).or_default().push_back(result);
        self
    }

    pub fn push_application(&self, result: ApiResult<ApplicationDetail>) -> &Self {
        self.state().applications.push_back(result);
        self
    }

    pub fn push_index(&self, result: ApiResult<IndexDetail>) -> &Self {
        self.state().indices.push_back(result);
        self
    }

    pub fn push_retriever(&self, result: ApiResult<RetrieverDetail>) -> &Self {
        self.state().retrievers.push_back(result);
        self
    }

    pub fn push_plugin(&self, result: ApiResult<PluginDetail>) -> &Self {
        self.state().plugins.push_back(result);
        self
    }

    pub fn push_data_accessor(&self, result: ApiResult<DataAccessorDetail>) -> &Self {
        self.state().data_accessors.push_back(result);
        self
    }

    pub fn push_web_experience(&self, result: ApiResult<WebExperienceDetail>) -> &Self {
        self.state().web_experiences.push_back(result);
        self
    }

    pub fn push_policy(&self, result: ApiResult<Option<String>>) -> &Self {
        self.state().policies.push_back(result);
        self
    }

    pub fn push_tags(&self, result: ApiResult<Vec<Tag>>) -> &Self {
        self.state().tags.push_back(result);
        self
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, api: &str) -> usize {
        self.state().calls.iter().filter(|call| **call == api).count()
    }

    /// Tags sent with each create call.
    pub fn create_tags(&self) -> Vec<BTreeMap<String, String>> {
        self.state().create_tags.clone()
    }

    pub fn tagged(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.state().tagged.clone()
    }

    pub fn untagged(&self) -> Vec<(String, Vec<String>)> {
        self.state().untagged.clone()
    }

    pub fn associated(&self) -> Vec<AssociatePermissionInput> {
        self.state().associated.clone()
    }

    pub fn plugin_updates(&self) -> Vec<UpdatePluginInput> {
        self.state().plugin_updates.clone()
    }

    pub fn web_experience_creates(&self) -> Vec<CreateWebExperienceInput> {
        self.state().web_experience_creates.clone()
    }

    pub fn web_experience_updates(&self) -> Vec<UpdateWebExperienceInput> {
        self.state().web_experience_updates.clone()
    }

    fn mutate(&self, api: &'static str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(api);
        state
            .outcomes
            .get_mut(api)
            .and_then(replay)
            .unwrap_or(Ok(()))
    }

    fn create(&self, api: &'static str, tags: BTreeMap<String, String>) -> ApiResult<Created> {
        let mut state = self.state();
        state.calls.push(api);
        state.create_tags.push(tags);
        let generated = state.calls.len();
        state
            .created
            .get_mut(api)
            .and_then(replay)
            .unwrap_or_else(|| {
                Ok(Created {
                    id: format!("generated-{generated}"),
                    arn: None,
                })
            })
    }

    fn list(&self, api: &'static str) -> ApiResult<Page<String>> {
        let mut state = self.state();
        state.calls.push(api);
        state
            .pages
            .get_mut(api)
            .and_then(replay)
            .unwrap_or_else(|| Ok(Page::default()))
    }

    fn get<T: Clone>(
        &self,
        api: &'static str,
        queue: impl FnOnce(&mut FakeState) -> &mut VecDeque<ApiResult<T>>,
    ) -> ApiResult<T> {
        let mut state = self.state();
        state.calls.push(api);
        replay(queue(&mut *state))
            .unwrap_or_else(|| Err(ServiceError::not_found(api, "Resource does not exist")))
    }
}

#[async_trait]
impl QBusinessApi for FakeQBusiness {
    async fn create_application(&self, input: CreateApplicationInput) -> ApiResult<Created> {
        self.create(API_CREATE_APPLICATION, input.tags)
    }

    async fn get_application(&self, _application_id: &str) -> ApiResult<ApplicationDetail> {
        self.get(API_GET_APPLICATION, |s| &mut s.applications)
    }

    async fn update_application(&self, _input: UpdateApplicationInput) -> ApiResult<()> {
        self.mutate(API_UPDATE_APPLICATION)
    }

    async fn delete_application(&self, _application_id: &str) -> ApiResult<()> {
        self.mutate(API_DELETE_APPLICATION)
    }

    async fn list_applications(&self, _next_token: Option<String>) -> ApiResult<Page<String>> {
        self.list(API_LIST_APPLICATIONS)
    }

    async fn create_index(&self, input: CreateIndexInput) -> ApiResult<Created> {
        self.create(API_CREATE_INDEX, input.tags)
    }

    async fn get_index(&self, _application_id: &str, _index_id: &str) -> ApiResult<IndexDetail> {
        self.get(API_GET_INDEX, |s| &mut s.indices)
    }

    async fn update_index(&self, _input: UpdateIndexInput) -> ApiResult<()> {
        self.mutate(API_UPDATE_INDEX)
    }

    async fn delete_index(&self, _application_id: &str, _index_id: &str) -> ApiResult<()> {
        self.mutate(API_DELETE_INDEX)
    }

    async fn list_indices(
        &self,
        _application_id: &str,
        _next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        self.list(API_LIST_INDICES)
    }

    async fn create_retriever(&self, input: CreateRetrieverInput) -> ApiResult<Created> {
        self.create(API_CREATE_RETRIEVER, input.tags)
    }

    async fn get_retriever(
        &self,
        _application_id: &str,
        _retriever_id: &str,
    ) -> ApiResult<RetrieverDetail> {
        self.get(API_GET_RETRIEVER, |s| &mut s.retrievers)
    }

    async fn update_retriever(&self, _input: UpdateRetrieverInput) -> ApiResult<()> {
        self.mutate(API_UPDATE_RETRIEVER)
    }

    async fn delete_retriever(&self, _application_id: &str, _retriever_id: &str) -> ApiResult<()> {
        self.mutate(API_DELETE_RETRIEVER)
    }

    async fn list_retrievers(
        &self,
        _application_id: &str,
        _next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        self.list(API_LIST_RETRIEVERS)
    }

    async fn create_plugin(&self, input: CreatePluginInput) -> ApiResult<Created> {
        self.create(API_CREATE_PLUGIN, input.tags)
    }

    async fn get_plugin(&self, _application_id: &str, _plugin_id: &str) -> ApiResult<PluginDetail> {
        self.get(API_GET_PLUGIN, |s| &mut s.plugins)
    }

    async fn update_plugin(&self, input: UpdatePluginInput) -> ApiResult<()> {
        self.state().plugin_updates.push(input);
        self.mutate(API_UPDATE_PLUGIN)
    }

    async fn delete_plugin(&self, _application_id: &str, _plugin_id: &str) -> ApiResult<()> {
        self.mutate(API_DELETE_PLUGIN)
    }

    async fn list_plugins(
        &self,
        _application_id: &str,
        _next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        self.list(API_LIST_PLUGINS)
    }

    async fn create_data_accessor(&self, input: CreateDataAccessorInput) -> ApiResult<Created> {
        self.create(API_CREATE_DATA_ACCESSOR, input.tags)
    }

    async fn get_data_accessor(
        &self,
        _application_id: &str,
        _data_accessor_id: &str,
    ) -> ApiResult<DataAccessorDetail> {
        self.get(API_GET_DATA_ACCESSOR, |s| &mut s.data_accessors)
    }

    async fn update_data_accessor(&self, _input: UpdateDataAccessorInput) -> ApiResult<()> {
        self.mutate(API_UPDATE_DATA_ACCESSOR)
    }

    async fn delete_data_accessor(
        &self,
        _application_id: &str,
        _data_accessor_id: &str,
    ) -> ApiResult<()> {
        self.mutate(API_DELETE_DATA_ACCESSOR)
    }

    async fn list_data_accessors(
        &self,
        _application_id: &str,
        _next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        self.list(API_LIST_DATA_ACCESSORS)
    }

    async fn create_web_experience(&self, input: CreateWebExperienceInput) -> ApiResult<Created> {
        let tags = input.tags.clone();
        self.state().web_experience_creates.push(input);
        self.create(API_CREATE_WEB_EXPERIENCE, tags)
    }

    async fn get_web_experience(
        &self,
        _application_id: &str,
        _web_experience_id: &str,
    ) -> ApiResult<WebExperienceDetail> {
        self.get(API_GET_WEB_EXPERIENCE, |s| &mut s.web_experiences)
    }

    async fn update_web_experience(&self, input: UpdateWebExperienceInput) -> ApiResult<()> {
        self.state().web_experience_updates.push(input);
        self.mutate(API_UPDATE_WEB_EXPERIENCE)
    }

    async fn delete_web_experience(
        &self,
        _application_id: &str,
        _web_experience_id: &str,
    ) -> ApiResult<()> {
        self.mutate(API_DELETE_WEB_EXPERIENCE)
    }

    async fn list_web_experiences(
        &self,
        _application_id: &str,
        _next_token: Option<String>,
    ) -> ApiResult<Page<String>> {
        self.list(API_LIST_WEB_EXPERIENCES)
    }

    async fn associate_permission(&self, input: AssociatePermissionInput) -> ApiResult<()> {
        self.state().associated.push(input);
        self.mutate(API_ASSOCIATE_PERMISSION)
    }

    async fn disassociate_permission(
        &self,
        _application_id: &str,
        _statement_id: &str,
    ) -> ApiResult<()> {
        self.mutate(API_DISASSOCIATE_PERMISSION)
    }

    async fn get_policy(&self, _application_id: &str) -> ApiResult<Option<String>> {
        let mut state = self.state();
        state.calls.push(API_GET_POLICY);
        replay(&mut state.policies).unwrap_or(Ok(None))
    }

    async fn tag_resource(
        &self,
        resource_arn: &str,
        tags: BTreeMap<String, String>,
    ) -> ApiResult<()> {
        self.state().tagged.push((resource_arn.to_string(), tags));
        self.mutate(API_TAG_RESOURCE)
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()> {
        self.state()
            .untagged
            .push((resource_arn.to_string(), tag_keys));
        self.mutate(API_UNTAG_RESOURCE)
    }

    async fn list_tags_for_resource(&self, _resource_arn: &str) -> ApiResult<Vec<Tag>> {
        let mut state = self.state();
        state.calls.push(API_LIST_TAGS_FOR_RESOURCE);
        replay(&mut state.tags).unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_scripted_result_repeats() {
        let fake = FakeQBusiness::new();
        fake.push_result(API_DELETE_INDEX, Err(ServiceError::not_found(API_DELETE_INDEX, "gone")))
            .push_result(API_DELETE_INDEX, Ok(()));

        assert!(fake.delete_index("app", "idx").await.is_err());
        assert!(fake.delete_index("app", "idx").await.is_ok());
        assert!(fake.delete_index("app", "idx").await.is_ok());
        assert_eq!(fake.call_count(API_DELETE_INDEX), 3);
    }

    #[tokio::test]
    async fn test_unscripted_get_is_not_found() {
        let fake = FakeQBusiness::new();
        let error = fake.get_plugin("app", "plugin").await.unwrap_err();
        assert_eq!(error.kind(), qbusiness_provider_common::FaultKind::NotFound);
        assert_eq!(fake.calls(), vec![API_GET_PLUGIN]);
    }
}
