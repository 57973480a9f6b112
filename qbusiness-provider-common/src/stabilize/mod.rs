//! Stabilization polling: wait for an asynchronous QBusiness resource
//! operation to reach a terminal status.
//!
//! A [`StatusProbe`] observes the resource, a [`StabilizationPolicy`] decides
//! whether the observed status is done, still moving or failed, and the
//! [`Stabilizer`] drives the loop under a [`BackoffScheduler`] budget.

mod backoff;
mod poller;
mod policy;
mod probe;
mod snapshot;

pub use backoff::{BackoffScheduler, DelayStrategy};
pub use poller::{PollCheckpoint, PollOutcome, ProbeMode, Stabilizer};
pub use policy::{failure_reason, StabilizationPolicy, Verdict, GENERIC_FAILURE_MESSAGE};
pub use probe::StatusProbe;
pub use snapshot::{ResourceRef, StatusSnapshot};
