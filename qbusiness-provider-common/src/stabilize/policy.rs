use super::snapshot::StatusSnapshot;

/// Message reported when a resource fails without any attached error detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Resource failed to stabilize";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Done,
    InProgress,
    Failed(String),
}

/// Decides what an observed status means for one resource type and operation.
pub trait StabilizationPolicy<S> {
    fn classify(&self, snapshot: &StatusSnapshot<S>) -> Verdict;
}

/// The service-attached error detail when present, else a generic message.
pub fn failure_reason<S>(snapshot: &StatusSnapshot<S>) -> String {
    snapshot
        .error_message
        .clone()
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_prefers_error_detail() {
        let snapshot = StatusSnapshot::new(()).with_error(Some("quota exceeded".to_string()));
        assert_eq!(failure_reason(&snapshot), "quota exceeded");
    }

    #[test]
    fn test_failure_reason_falls_back_to_generic_message() {
        let snapshot = StatusSnapshot::new(());
        assert_eq!(failure_reason(&snapshot), GENERIC_FAILURE_MESSAGE);
    }
}
