use super::backoff::BackoffScheduler;
use super::policy::{StabilizationPolicy, Verdict};
use super::probe::StatusProbe;
use super::snapshot::{ResourceRef, StatusSnapshot};
use crate::error::{FaultKind, ServiceError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// What the probe is expected to converge to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Wait for a terminal status; a missing resource is a fault.
    Converge,
    /// Wait for the resource to disappear; `NotFound` means done.
    ConfirmDeletion,
}

/// Progress carried across handler invocations when polling is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCheckpoint {
    pub attempts: u32,
    pub elapsed_ms: u64,
    /// Delay the host waits before re-invoking.
    pub delay_secs: u64,
}

impl PollCheckpoint {
    /// Total time spent so far, including the callback delay.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms).saturating_add(Duration::from_secs(self.delay_secs))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<S> {
    /// Terminal success; `None` when deletion was confirmed by `NotFound`.
    Stable(Option<StatusSnapshot<S>>),
    /// The policy classified the last snapshot as failed.
    Failed {
        message: String,
        snapshot: StatusSnapshot<S>,
    },
    /// Budget exhausted while the resource was still in progress.
    NotStabilized {
        attempts: u32,
        elapsed: Duration,
        last_snapshot: Option<StatusSnapshot<S>>,
    },
    /// A fault that is not retried.
    Faulted(ServiceError),
    /// The invocation budget ran out; resume later from the checkpoint.
    Suspended(PollCheckpoint),
}

/// Owned by a single loop invocation and dropped when it returns.
struct PollState<S> {
    attempts: u32,
    elapsed: Duration,
    last_snapshot: Option<StatusSnapshot<S>>,
}

/// Drives probe -> classify -> sleep until a terminal outcome.
#[derive(Debug, Clone, Copy)]
pub struct Stabilizer {
    scheduler: BackoffScheduler,
    invocation_budget: Option<Duration>,
}

impl Stabilizer {
    pub fn new(scheduler: BackoffScheduler) -> Self {
        Self {
            scheduler,
            invocation_budget: None,
        }
    }

    /// Cap the time spent sleeping in this invocation; past it the loop suspends.
    #[must_use]
    pub fn with_invocation_budget(mut self, budget: Option<Duration>) -> Self {
        self.invocation_budget = budget;
        self
    }

    pub async fn run<P, Pol>(
        &self,
        probe: &P,
        target: &ResourceRef,
        policy: &Pol,
        mode: ProbeMode,
        resume: Option<PollCheckpoint>,
    ) -> PollOutcome<P::Status>
    where
        P: StatusProbe + ?Sized,
        Pol: StabilizationPolicy<P::Status> + ?Sized,
    {
        let started = Instant::now();
        let carried = resume.map(|c| c.elapsed()).unwrap_or_default();
        let mut state = PollState {
            attempts: resume.map_or(0, |c| c.attempts),
            elapsed: carried,
            last_snapshot: None,
        };

        loop {
            state.attempts += 1;
            let observed = probe.probe(target).await;
            state.elapsed = carried + started.elapsed();

            match observed {
                Ok(snapshot) => match policy.classify(&snapshot) {
                    Verdict::Done => {
                        info!(
                            "{} stabilized after {} probe(s) ({:?})",
                            target, state.attempts, state.elapsed
                        );
                        return PollOutcome::Stable(Some(snapshot));
                    }
                    Verdict::Failed(message) => {
                        info!(
                            "{} failed to stabilize in status {:?}: {}",
                            target, snapshot.status, message
                        );
                        return PollOutcome::Failed { message, snapshot };
                    }
                    Verdict::InProgress => {
                        debug!(
                            "{} is still stabilizing (status {:?}, attempt {})",
                            target, snapshot.status, state.attempts
                        );
                        state.last_snapshot = Some(snapshot);
                    }
                },
                Err(fault) => match fault.kind() {
                    FaultKind::NotFound if mode == ProbeMode::ConfirmDeletion => {
                        info!("{} no longer exists, deletion confirmed", target);
                        return PollOutcome::Stable(None);
                    }
                    FaultKind::Transient => {
                        warn!(
                            "Transient fault while probing {} (attempt {}): {}",
                            target, state.attempts, fault
                        );
                    }
                    FaultKind::NotFound | FaultKind::Permanent => {
                        return PollOutcome::Faulted(fault);
                    }
                },
            }

            let Some(delay) = self.scheduler.admit(state.attempts, state.elapsed) else {
                info!(
                    "{} did not stabilize within {:?} ({} probe(s))",
                    target,
                    self.scheduler.timeout(),
                    state.attempts
                );
                return PollOutcome::NotStabilized {
                    attempts: state.attempts,
                    elapsed: state.elapsed,
                    last_snapshot: state.last_snapshot,
                };
            };

            if let Some(budget) = self.invocation_budget {
                if started.elapsed() + delay > budget {
                    let checkpoint = PollCheckpoint {
                        attempts: state.attempts,
                        elapsed_ms: u64::try_from(state.elapsed.as_millis()).unwrap_or(u64::MAX),
                        delay_secs: delay.as_secs() + u64::from(delay.subsec_nanos() > 0),
                    };
                    info!(
                        "Suspending stabilization of {} after {} probe(s), resuming in {}s",
                        target, state.attempts, checkpoint.delay_secs
                    );
                    return PollOutcome::Suspended(checkpoint);
                }
            }

            tokio::time::sleep(delay).await;
        }
    }
}
