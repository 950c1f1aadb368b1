//! Per-word mastery tracking collaborator.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tutor_wordbank::{UnitResult, VocabularyId};
use uuid::Uuid;

/// One answer position with the time the attempt took so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    #[serde(flatten)]
    pub result: UnitResult,
    /// Milliseconds since the attempt started, measured by the instance
    pub elapsed_ms: u64,
}

/// Receives per-unit outcomes of judged submissions.
pub trait MasteryTracker: Send + Sync {
    fn record(&self, exercise_id: Uuid, outcomes: &[UnitOutcome]);
}

/// Correct/wrong tally of one vocabulary entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MasteryRecord {
    pub times_correct: u32,
    pub times_wrong: u32,
    pub last_elapsed_ms: u64,
}

impl MasteryRecord {
    /// Mastery score: `times_correct - times_wrong`.
    pub fn score(&self) -> i64 {
        i64::from(self.times_correct) - i64::from(self.times_wrong)
    }
}

/// Tracker kept in memory, keyed by vocabulary id.
///
/// Units without a vocabulary entry (free-text words) are not tracked.
#[derive(Debug, Default)]
pub struct InMemoryMasteryTracker {
    records: Mutex<HashMap<VocabularyId, MasteryRecord>>,
}

impl InMemoryMasteryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_for(&self, id: &VocabularyId) -> Option<MasteryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }
}

impl MasteryTracker for InMemoryMasteryTracker {
    fn record(&self, exercise_id: Uuid, outcomes: &[UnitOutcome]) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        for outcome in outcomes {
            let Some(id) = &outcome.result.vocabulary_id else {
                continue;
            };

            let record = records.entry(id.clone()).or_default();
            if outcome.result.is_correct {
                record.times_correct += 1;
            } else {
                record.times_wrong += 1;
            }
            record.last_elapsed_ms = outcome.elapsed_ms;
        }

        tracing::debug!(%exercise_id, units = outcomes.len(), "Recorded unit outcomes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: Option<&str>, is_correct: bool) -> UnitOutcome {
        UnitOutcome {
            result: UnitResult {
                vocabulary_id: id.map(VocabularyId::from),
                word_text: "word".to_string(),
                selected_text: "word".to_string(),
                is_correct,
            },
            elapsed_ms: 1200,
        }
    }

    #[test]
    fn test_tally_and_score() {
        let tracker = InMemoryMasteryTracker::new();
        let exercise_id = Uuid::new_v4();

        tracker.record(exercise_id, &[outcome(Some("v1"), true), outcome(None, false)]);
        tracker.record(exercise_id, &[outcome(Some("v1"), false), outcome(Some("v1"), true)]);

        let record = tracker.record_for(&"v1".into()).unwrap();
        assert_eq!(record.times_correct, 2);
        assert_eq!(record.times_wrong, 1);
        assert_eq!(record.score(), 1);
        assert_eq!(record.last_elapsed_ms, 1200);
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let json = serde_json::to_value(outcome(Some("v1"), true)).unwrap();
        assert_eq!(json["vocabulary_id"], "v1");
        assert_eq!(json["is_correct"], true);
        assert_eq!(json["elapsed_ms"], 1200);
    }
}
