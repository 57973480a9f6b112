use chrono::{DateTime, Utc};
use std::fmt;

/// Identifies the resource being waited on: the owning application and,
/// for sub-resources, the sub-resource id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    application_id: String,
    resource_id: Option<String>,
}

impl ResourceRef {
    pub fn application(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            resource_id: None,
        }
    }

    pub fn child(application_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            resource_id: Some(resource_id.into()),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Sub-resource id, or the application id for applications themselves.
    pub fn resource_id(&self) -> &str {
        self.resource_id.as_deref().unwrap_or(&self.application_id)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_id {
            Some(resource_id) => write!(f, "{}|{}", self.application_id, resource_id),
            None => f.write_str(&self.application_id),
        }
    }
}

/// One observation of a resource's status. Produced fresh by every probe.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot<S> {
    pub status: S,
    pub error_message: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl<S> StatusSnapshot<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            error_message: None,
            observed_at: Utc::now(),
        }
    }

    /// Attach the service-reported error detail; blank messages are dropped.
    pub fn with_error(mut self, error_message: Option<String>) -> Self {
        self.error_message = error_message.filter(|m| !m.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_display() {
        assert_eq!(ResourceRef::application("app").to_string(), "app");
        assert_eq!(ResourceRef::child("app", "idx").to_string(), "app|idx");
        assert_eq!(ResourceRef::child("app", "idx").resource_id(), "idx");
        assert_eq!(ResourceRef::application("app").resource_id(), "app");
    }

    #[test]
    fn test_blank_error_messages_are_dropped() {
        let snapshot = StatusSnapshot::new("FAILED").with_error(Some("   ".to_string()));
        assert_eq!(snapshot.error_message, None);
        let snapshot = StatusSnapshot::new("FAILED").with_error(Some("bad role".to_string()));
        assert_eq!(snapshot.error_message.as_deref(), Some("bad role"));
    }
}
