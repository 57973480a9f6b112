//! Service fault taxonomy and provider-level errors.

use thiserror::Error;

/// Category of a fault raised by the QBusiness service (or the transport in front of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    Validation,
    NotFound,
    Conflict,
    Throttling,
    AccessDenied,
    QuotaExceeded,
    Internal,
    Network,
    Unrecognized,
}

/// How a fault should be treated while waiting on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Worth retrying within the remaining backoff budget.
    Transient,
    /// The resource does not exist (a failure for reads, a success when confirming deletion).
    NotFound,
    /// Never retried.
    Permanent,
}

impl FaultCategory {
    pub const ALL: [FaultCategory; 9] = [
        FaultCategory::Validation,
        FaultCategory::NotFound,
        FaultCategory::Conflict,
        FaultCategory::Throttling,
        FaultCategory::AccessDenied,
        FaultCategory::QuotaExceeded,
        FaultCategory::Internal,
        FaultCategory::Network,
        FaultCategory::Unrecognized,
    ];

    /// Map a service exception name (the `code` of an error response) to a category.
    pub fn from_service_code(code: Option<&str>) -> Self {
        match code.unwrap_or_default() {
            "ValidationException" => FaultCategory::Validation,
            "ResourceNotFoundException" => FaultCategory::NotFound,
            "ConflictException" => FaultCategory::Conflict,
            "ThrottlingException" => FaultCategory::Throttling,
            "AccessDeniedException" => FaultCategory::AccessDenied,
            "ServiceQuotaExceededException" => FaultCategory::QuotaExceeded,
            "InternalServerException" => FaultCategory::Internal,
            _ => FaultCategory::Unrecognized,
        }
    }

    pub fn kind(self) -> FaultKind {
        match self {
            FaultCategory::NotFound => FaultKind::NotFound,
            FaultCategory::Throttling | FaultCategory::Internal | FaultCategory::Network => {
                FaultKind::Transient
            }
            FaultCategory::Validation
            | FaultCategory::Conflict
            | FaultCategory::AccessDenied
            | FaultCategory::QuotaExceeded
            | FaultCategory::Unrecognized => FaultKind::Permanent,
        }
    }
}

/// A failed call against the QBusiness API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{api} failed ({category:?}): {message}")]
pub struct ServiceError {
    pub category: FaultCategory,
    /// Operation name, e.g. `GetIndex`
    pub api: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(category: FaultCategory, api: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            api: api.into(),
            message: message.into(),
        }
    }

    pub fn not_found(api: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultCategory::NotFound, api, message)
    }

    pub fn validation(api: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultCategory::Validation, api, message)
    }

    pub fn kind(&self) -> FaultKind {
        self.category.kind()
    }
}

/// Errors raised by the provider itself rather than by the service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_service_codes() {
        assert_eq!(
            FaultCategory::from_service_code(Some("ServiceQuotaExceededException")),
            FaultCategory::QuotaExceeded
        );
        assert_eq!(
            FaultCategory::from_service_code(Some("ConflictException")),
            FaultCategory::Conflict
        );
    }

    #[test]
    fn test_unknown_and_missing_codes_are_unrecognized() {
        assert_eq!(
            FaultCategory::from_service_code(Some("SomethingNew")),
            FaultCategory::Unrecognized
        );
        assert_eq!(
            FaultCategory::from_service_code(None),
            FaultCategory::Unrecognized
        );
    }

    #[test]
    fn test_fault_kinds() {
        assert_eq!(FaultCategory::Throttling.kind(), FaultKind::Transient);
        assert_eq!(FaultCategory::Network.kind(), FaultKind::Transient);
        assert_eq!(FaultCategory::Internal.kind(), FaultKind::Transient);
        assert_eq!(FaultCategory::NotFound.kind(), FaultKind::NotFound);
        assert_eq!(FaultCategory::Validation.kind(), FaultKind::Permanent);
        assert_eq!(FaultCategory::AccessDenied.kind(), FaultKind::Permanent);
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::validation("CreateIndex", "displayName is required");
        assert_eq!(
            err.to_string(),
            "CreateIndex failed (Validation): displayName is required"
        );
    }
}
