//! Shared building blocks for the QBusiness CloudFormation resource handlers:
//! - Stabilization polling (status probes, per-resource policies, backoff)
//! - Service fault classification into CloudFormation handler error codes
//! - Handler contract types (requests, progress events, callback context)
//! - Tag diffing, ARN construction and provider configuration
//!

pub mod arn;
mod classify;
pub mod config;
mod error;
mod progress;
mod request;
pub mod stabilize;
pub mod tags;

// Re-exports for a small, focused public API
pub use classify::{ClassifiedFailure, ErrorClassifier, FailureContext};
pub use config::{ProviderConfig, StabilizationSettings};
pub use error::{FaultCategory, FaultKind, ProviderError, ProviderResult, ServiceError};
pub use progress::{HandlerErrorCode, OperationStatus, ProgressEvent};
pub use request::{
    Action, CallbackContext, PendingStabilization, ResourceHandlerRequest, StabilizationStep,
};
pub use stabilize::{
    BackoffScheduler, DelayStrategy, PollCheckpoint, PollOutcome, ProbeMode, ResourceRef,
    StabilizationPolicy, Stabilizer, StatusProbe, StatusSnapshot, Verdict,
};
pub use tags::{Tag, TagDiff, Tagged};

/// Service namespace as it appears in ARNs.
pub const SERVICE_NAME_LOWER: &str = "qbusiness";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifying_a_missing_index() {
        let fault = ServiceError::new(
            FaultCategory::from_service_code(Some("ResourceNotFoundException")),
            "GetIndex",
            "Index not found",
        );
        let failure = ErrorClassifier.classify(
            &fault,
            &FailureContext::new("AWS::QBusiness::Index", "app|idx", "GetIndex"),
        );
        assert_eq!(failure.code, HandlerErrorCode::NotFound);
        assert_eq!(
            failure.message,
            "Resource of type 'AWS::QBusiness::Index' with identifier 'app|idx' was not found."
        );
    }
}
