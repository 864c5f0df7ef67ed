//! Batch lifecycle: status values, allowed transitions, and ingestion-level rollup.

use serde::{Deserialize, Serialize};

/// State of a batch (and, derived, of an ingestion).
///
/// `yet_to_start -> triggered -> completed | failed`. Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    YetToStart,
    Triggered,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::YetToStart => "yet_to_start",
            BatchStatus::Triggered => "triggered",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }

    /// Whether `self -> next` is a legal step of the state machine.
    pub fn can_transition_to(self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::YetToStart, BatchStatus::Triggered)
                | (BatchStatus::Triggered, BatchStatus::Completed)
                | (BatchStatus::Triggered, BatchStatus::Failed)
        )
    }

    /// Roll batch statuses up into an ingestion status.
    ///
    /// All `completed` -> `completed`; all `yet_to_start` -> `yet_to_start`; all terminal with at
    /// least one `failed` -> `failed`; anything else -> `triggered`. An empty set is `yet_to_start`.
    pub fn aggregate<I>(statuses: I) -> BatchStatus
    where
        I: IntoIterator<Item = BatchStatus>,
    {
        let mut all_yet_to_start = true;
        let mut all_completed = true;
        let mut all_terminal = true;
        let mut seen = false;
        for s in statuses {
            seen = true;
            all_yet_to_start &= s == BatchStatus::YetToStart;
            all_completed &= s == BatchStatus::Completed;
            all_terminal &= s.is_terminal();
        }
        if !seen || all_yet_to_start {
            BatchStatus::YetToStart
        } else if all_completed {
            BatchStatus::Completed
        } else if all_terminal {
            BatchStatus::Failed
        } else {
            BatchStatus::Triggered
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::BatchStatus::*;
    use super::*;

    #[test]
    fn only_forward_transitions_are_legal() {
        assert!(YetToStart.can_transition_to(Triggered));
        assert!(Triggered.can_transition_to(Completed));
        assert!(Triggered.can_transition_to(Failed));

        assert!(!YetToStart.can_transition_to(Completed));
        assert!(!Triggered.can_transition_to(YetToStart));
        assert!(!Completed.can_transition_to(Triggered));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn aggregate_follows_rollup_rule() {
        assert_eq!(BatchStatus::aggregate([YetToStart, YetToStart]), YetToStart);
        assert_eq!(BatchStatus::aggregate([Completed, Completed]), Completed);
        assert_eq!(BatchStatus::aggregate([Completed, YetToStart]), Triggered);
        assert_eq!(BatchStatus::aggregate([Triggered, YetToStart]), Triggered);
        assert_eq!(BatchStatus::aggregate([Completed, Failed]), Failed);
        assert_eq!(BatchStatus::aggregate([Failed, YetToStart]), Triggered);
        assert_eq!(BatchStatus::aggregate([]), YetToStart);
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&YetToStart).unwrap(),
            "\"yet_to_start\""
        );
        assert_eq!(Completed.to_string(), "completed");
    }
}
