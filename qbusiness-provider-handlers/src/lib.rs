//! CloudFormation lifecycle handlers for QBusiness resources:
//! - Create/Read/Update/Delete/List per resource type
//! - Status polling until the service reports a settled state
//! - The `QBusinessApi` seam with an AWS SDK implementation
//!

pub mod api;
pub mod resources;
pub mod support;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-exports for a small, focused public API
pub use api::{QBusinessApi, SdkQBusinessClient};
pub use resources::{dispatch, ResourceType};
pub use support::HandlerContext;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeQBusiness;
    use qbusiness_provider_common::{Action, CallbackContext, OperationStatus, ProviderConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatching_a_read() {
        let fake = FakeQBusiness::new();
        let config = ProviderConfig::default();
        let ctx = HandlerContext::new(&fake, &config);
        let request = json!({
            "desiredResourceState": {"ApplicationId": "app", "IndexId": "idx"}
        });

        let event = dispatch(
            &ctx,
            ResourceType::Index,
            Action::Read,
            request,
            CallbackContext::default(),
        )
        .await
        .unwrap();

        assert_eq!(event.status, OperationStatus::Failed);
        assert_eq!(
            event.error_code,
            Some(qbusiness_provider_common::HandlerErrorCode::NotFound)
        );
    }
}
