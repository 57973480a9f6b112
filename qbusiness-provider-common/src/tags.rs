//! Tag merging and diffing between the previous and desired resource state.
//!
//! Tags reach a resource from three places: stack-level tags
//! (`desiredResourceTags`), system tags (`aws:cloudformation:*`) and the
//! resource model's own `Tags` property. Updates compare the union of all
//! three before and after.

use crate::request::ResourceHandlerRequest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A resource model carrying a `Tags` property.
pub trait Tagged {
    fn tags(&self) -> Option<&[Tag]>;
}

/// Later duplicates win.
pub fn tags_to_map(tags: Option<&[Tag]>) -> BTreeMap<String, String> {
    tags.unwrap_or_default()
        .iter()
        .map(|tag| (tag.key.clone(), tag.value.clone()))
        .collect()
}

pub fn tags_from_map(map: &BTreeMap<String, String>) -> Vec<Tag> {
    map.iter().map(|(k, v)| Tag::new(k.clone(), v.clone())).collect()
}

fn extend_from(target: &mut BTreeMap<String, String>, source: Option<&HashMap<String, String>>) {
    if let Some(source) = source {
        target.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Tags to send with a create call: stack tags, then model tags, then system tags.
pub fn merge_create_tags<M: Tagged>(request: &ResourceHandlerRequest<M>) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    extend_from(&mut merged, request.desired_resource_tags.as_ref());
    merged.extend(tags_to_map(
        request.desired_resource_state.as_ref().and_then(Tagged::tags),
    ));
    extend_from(&mut merged, request.system_tags.as_ref());
    merged
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagDiff {
    previous: BTreeMap<String, String>,
    desired: BTreeMap<String, String>,
}

impl TagDiff {
    pub fn new(previous: BTreeMap<String, String>, desired: BTreeMap<String, String>) -> Self {
        Self { previous, desired }
    }

    pub fn from_request<M: Tagged>(request: &ResourceHandlerRequest<M>) -> Self {
        let mut previous = BTreeMap::new();
        extend_from(&mut previous, request.previous_system_tags.as_ref());
        extend_from(&mut previous, request.previous_resource_tags.as_ref());
        previous.extend(tags_to_map(
            request.previous_resource_state.as_ref().and_then(Tagged::tags),
        ));

        let mut desired = BTreeMap::new();
        extend_from(&mut desired, request.system_tags.as_ref());
        extend_from(&mut desired, request.desired_resource_tags.as_ref());
        desired.extend(tags_to_map(
            request.desired_resource_state.as_ref().and_then(Tagged::tags),
        ));

        Self::new(previous, desired)
    }

    pub fn should_update(&self) -> bool {
        self.previous != self.desired
    }

    /// Keys that are new or whose value changed.
    pub fn to_add(&self) -> BTreeMap<String, String> {
        self.desired
            .iter()
            .filter(|(key, value)| self.previous.get(*key) != Some(*value))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Previously attached keys that are no longer desired.
    pub fn to_remove(&self) -> BTreeSet<String> {
        self.previous
            .keys()
            .filter(|key| !self.desired.contains_key(*key))
            .cloned()
            .collect()
    }
}
