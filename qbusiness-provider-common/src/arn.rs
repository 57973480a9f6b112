//! QBusiness ARN construction.
//!
//! arn:${Partition}:qbusiness:${Region}:${Account}:application/${ApplicationId}[/${kind}/${Id}]

use crate::error::{ProviderError, ProviderResult};
use crate::request::ResourceHandlerRequest;
use crate::SERVICE_NAME_LOWER;

const DEFAULT_PARTITION: &str = "aws";

/// Partition, region and account a request operates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArnScope {
    pub partition: String,
    pub region: String,
    pub account_id: String,
}

impl ArnScope {
    pub fn from_request<M>(request: &ResourceHandlerRequest<M>) -> ProviderResult<Self> {
        let region = request
            .region
            .clone()
            .ok_or_else(|| ProviderError::invalid_request("region is required to build an ARN"))?;
        let account_id = request.aws_account_id.clone().ok_or_else(|| {
            ProviderError::invalid_request("awsAccountId is required to build an ARN")
        })?;
        Ok(Self {
            partition: request
                .aws_partition
                .clone()
                .unwrap_or_else(|| DEFAULT_PARTITION.to_string()),
            region,
            account_id,
        })
    }

    pub fn application_arn(&self, application_id: &str) -> String {
        format!(
            "arn:{}:{}:{}:{}:application/{}",
            self.partition, SERVICE_NAME_LOWER, self.region, self.account_id, application_id
        )
    }

    /// ARN of a sub-resource, e.g. `kind = "index"`.
    pub fn child_arn(&self, application_id: &str, kind: &str, resource_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.application_arn(application_id),
            kind,
            resource_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ResourceHandlerRequest<()> {
        let mut request = ResourceHandlerRequest::new(());
        request.region = Some("us-west-2".to_string());
        request.aws_account_id = Some("123412341234".to_string());
        request
    }

    #[test]
    fn test_application_arn_defaults_partition() {
        let scope = ArnScope::from_request(&request()).unwrap();
        assert_eq!(
            scope.application_arn("app-1"),
            "arn:aws:qbusiness:us-west-2:123412341234:application/app-1"
        );
    }

    #[test]
    fn test_child_arn() {
        let mut request = request();
        request.aws_partition = Some("aws-us-gov".to_string());
        let scope = ArnScope::from_request(&request).unwrap();
        assert_eq!(
            scope.child_arn("app-1", "retriever", "ret-9"),
            "arn:aws-us-gov:qbusiness:us-west-2:123412341234:application/app-1/retriever/ret-9"
        );
    }

    #[test]
    fn test_missing_region_is_rejected() {
        let mut request = request();
        request.region = None;
        assert!(ArnScope::from_request(&request).is_err());
    }
}
