//! Static mapping from service faults to CloudFormation handler error codes.

use crate::error::{FaultCategory, ServiceError};
use crate::progress::HandlerErrorCode;

/// Where a fault happened, used to build the reported message.
#[derive(Debug, Clone, Copy)]
pub struct FailureContext<'a> {
    pub type_name: &'a str,
    pub identifier: &'a str,
    pub api: &'a str,
}

impl<'a> FailureContext<'a> {
    pub fn new(type_name: &'a str, identifier: &'a str, api: &'a str) -> Self {
        Self {
            type_name,
            identifier,
            api,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub code: HandlerErrorCode,
    pub message: String,
}

impl ClassifiedFailure {
    pub fn new(code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Total classifier: every fault yields exactly one outcome, unknown faults
/// fall back to `GeneralServiceException`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn code_for(category: FaultCategory) -> HandlerErrorCode {
        match category {
            FaultCategory::Validation => HandlerErrorCode::InvalidRequest,
            FaultCategory::NotFound => HandlerErrorCode::NotFound,
            FaultCategory::Conflict => HandlerErrorCode::ResourceConflict,
            FaultCategory::Throttling => HandlerErrorCode::Throttling,
            FaultCategory::AccessDenied => HandlerErrorCode::AccessDenied,
            FaultCategory::QuotaExceeded => HandlerErrorCode::ServiceLimitExceeded,
            FaultCategory::Network => HandlerErrorCode::NetworkFailure,
            FaultCategory::Internal | FaultCategory::Unrecognized => {
                HandlerErrorCode::GeneralServiceException
            }
        }
    }

    pub fn classify(&self, error: &ServiceError, context: &FailureContext<'_>) -> ClassifiedFailure {
        let FailureContext {
            type_name,
            identifier,
            api,
        } = *context;
        let reason = &error.message;
        let message = match error.category {
            FaultCategory::NotFound => format!(
                "Resource of type '{type_name}' with identifier '{identifier}' was not found."
            ),
            FaultCategory::Validation => format!("Invalid request provided: {reason}"),
            FaultCategory::Conflict => format!(
                "Resource of type '{type_name}' with identifier '{identifier}' has a conflict. Reason: {reason}."
            ),
            FaultCategory::Throttling => format!("Rate exceeded for operation '{api}'."),
            FaultCategory::AccessDenied => format!("Access denied for operation '{api}'."),
            FaultCategory::QuotaExceeded => {
                format!("Limit exceeded for resource of type '{type_name}'. Reason: {reason}")
            }
            FaultCategory::Network => {
                format!("Network failure occurred during operation '{api}'.")
            }
            FaultCategory::Internal | FaultCategory::Unrecognized => {
                format!("Error occurred during operation '{api}'. {reason}")
                    .trim_end()
                    .to_string()
            }
        };
        ClassifiedFailure::new(Self::code_for(error.category), message)
    }

    /// Outcome for a resource that reached a failed status or ran out of time.
    pub fn not_stabilized(&self, context: &FailureContext<'_>, reason: Option<&str>) -> ClassifiedFailure {
        let mut message = format!(
            "Resource of type '{}' with identifier '{}' did not stabilize.",
            context.type_name, context.identifier
        );
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            message.push_str(" Reason: ");
            message.push_str(reason);
        }
        ClassifiedFailure::new(HandlerErrorCode::NotStabilized, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const CONTEXT: FailureContext<'static> =
        FailureContext {
            type_name: "AWS::QBusiness::Plugin",
            identifier: "app|plugin",
            api: "DeletePlugin",
        };

    #[rstest]
    #[case("ValidationException", HandlerErrorCode::InvalidRequest)]
    #[case("ConflictException", HandlerErrorCode::ResourceConflict)]
    #[case("ResourceNotFoundException", HandlerErrorCode::NotFound)]
    #[case("ThrottlingException", HandlerErrorCode::Throttling)]
    #[case("AccessDeniedException", HandlerErrorCode::AccessDenied)]
    #[case("ServiceQuotaExceededException", HandlerErrorCode::ServiceLimitExceeded)]
    #[case("InternalServerException", HandlerErrorCode::GeneralServiceException)]
    #[case("BrandNewException", HandlerErrorCode::GeneralServiceException)]
    fn test_service_codes_map_to_handler_codes(
        #[case] service_code: &str,
        #[case] expected: HandlerErrorCode,
    ) {
        let error = ServiceError::new(
            FaultCategory::from_service_code(Some(service_code)),
            "DeletePlugin",
            "boom",
        );
        assert_eq!(ErrorClassifier.classify(&error, &CONTEXT).code, expected);
    }

    #[test]
    fn test_throttling_message_names_the_operation() {
        let error = ServiceError::new(FaultCategory::Throttling, "DeletePlugin", "slow down");
        assert_eq!(
            ErrorClassifier.classify(&error, &CONTEXT).message,
            "Rate exceeded for operation 'DeletePlugin'."
        );
    }

    #[test]
    fn test_not_stabilized_with_and_without_reason() {
        let with_reason = ErrorClassifier.not_stabilized(&CONTEXT, Some("quota exceeded"));
        assert_eq!(with_reason.code, HandlerErrorCode::NotStabilized);
        assert_eq!(
            with_reason.message,
            "Resource of type 'AWS::QBusiness::Plugin' with identifier 'app|plugin' did not stabilize. Reason: quota exceeded"
        );

        let blank = ErrorClassifier.not_stabilized(&CONTEXT, Some("  "));
        assert!(blank.message.ends_with("did not stabilize."));
    }

    #[test]
    fn test_every_category_maps_to_exactly_one_code() {
        for category in FaultCategory::ALL {
            let error = ServiceError::new(category, "GetIndex", "detail");
            let first = ErrorClassifier.classify(&error, &CONTEXT);
            let second = ErrorClassifier.classify(&error, &CONTEXT);
            assert_eq!(first, second);
            assert_eq!(first.code, ErrorClassifier::code_for(category));
        }
    }

    proptest! {
        #[test]
        fn prop_arbitrary_codes_always_classify(code in "\\PC*", message in "\\PC*") {
            let category = FaultCategory::from_service_code(Some(&code));
            let error = ServiceError::new(category, "GetIndex", message);
            let failure = ErrorClassifier.classify(&error, &CONTEXT);
            prop_assert_eq!(failure.code, ErrorClassifier::code_for(category));
            prop_assert!(!failure.message.is_empty());
        }
    }
}
