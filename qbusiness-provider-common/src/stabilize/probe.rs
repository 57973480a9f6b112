use super::snapshot::{ResourceRef, StatusSnapshot};
use crate::error::ServiceError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Issues a single describe/get call and extracts the resource status.
///
/// Implementations surface service faults unchanged; the polling loop decides
/// whether a fault is retried, treated as completion, or reported.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    type Status: Debug + Send + Sync;

    async fn probe(&self, target: &ResourceRef) -> Result<StatusSnapshot<Self::Status>, ServiceError>;
}
