use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tutor_exercise::{Completion, ExerciseContent, ExerciseInstance, Judgement};
use tutor_wordbank::{ScopeChain, TargetSpec, VocabularyId};
use uuid::Uuid;
use validator::{Validate, ValidationError};

const MAX_PHRASE_CHARS: usize = 500;
const MAX_SEQUENCE_LEN: usize = 64;

/// Body of `POST /exercises` and `PUT /exercises/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExerciseRequest {
    #[validate(custom(function = "validate_target"))]
    pub target: TargetSpec,
    #[validate(length(min = 1, max = 128))]
    pub lesson_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub module_id: Option<String>,
    #[serde(default)]
    pub learned_vocabulary_ids: BTreeSet<VocabularyId>,
    #[validate(range(min = 1, max = 32))]
    pub max_word_bank_size: Option<usize>,
    /// Seed for the distractor draw and shuffle; random when absent
    pub seed: Option<u64>,
    /// Curriculum identity used for the reward; defaults to the content key
    #[validate(length(min = 1, max = 255))]
    pub exercise_key: Option<String>,
}

impl ExerciseRequest {
    pub fn content(&self, default_max_size: usize) -> ExerciseContent {
        let scope = ScopeChain::for_exercise(
            self.lesson_id.as_deref(),
            self.module_id.as_deref(),
            Some(&self.learned_vocabulary_ids),
        );
        let content = ExerciseContent::new(
            self.target.clone(),
            scope,
            self.max_word_bank_size.unwrap_or(default_max_size),
        );

        match &self.exercise_key {
            Some(key) => content.with_reward_key(key),
            None => content,
        }
    }
}

fn validate_target(target: &TargetSpec) -> Result<(), ValidationError> {
    match target {
        TargetSpec::Phrase { text } if text.trim().is_empty() => {
            Err(ValidationError::new("empty_phrase"))
        }
        TargetSpec::Phrase { text } if text.chars().count() > MAX_PHRASE_CHARS => {
            Err(ValidationError::new("phrase_too_long"))
        }
        TargetSpec::Sequence { ids } if ids.is_empty() => {
            Err(ValidationError::new("empty_sequence"))
        }
        TargetSpec::Sequence { ids } if ids.len() > MAX_SEQUENCE_LEN => {
            Err(ValidationError::new("sequence_too_long"))
        }
        _ => Ok(()),
    }
}

/// One tile as the renderer shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub display_key: String,
    pub text: String,
}

/// Current view of an exercise. Correctness of tiles is not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub exercise_id: Uuid,
    pub content_key: String,
    pub attempt: u32,
    pub expected_unit_count: usize,
    pub passed: bool,
    pub tiles: Vec<Tile>,
}

impl ExerciseResponse {
    pub fn from_instance(instance: &mut ExerciseInstance) -> Self {
        let bank = instance.word_bank();
        let tiles = bank
            .tiles()
            .map(|(display_key, item)| Tile {
                display_key: display_key.to_string(),
                text: item.word_text.clone(),
            })
            .collect();

        Self {
            exercise_id: instance.id(),
            content_key: instance.content_key().to_string(),
            attempt: instance.attempt(),
            expected_unit_count: instance.expected_units().len(),
            passed: instance.is_passed(),
            tiles,
        }
    }
}

/// Body of `POST /exercises/{id}/submit`: display keys in answer order.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(max = 64))]
    pub display_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub judgement: Judgement,
    /// Answer positions to highlight as wrong
    pub incorrect_positions: Vec<usize>,
}

impl From<Judgement> for SubmitResponse {
    fn from(judgement: Judgement) -> Self {
        let incorrect_positions = judgement.result.incorrect_positions();
        Self {
            judgement,
            incorrect_positions,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub newly_granted: bool,
    pub points: u32,
    /// Completion always moves the learner on, rewarded or not
    pub advance: bool,
}

impl From<Completion> for CompleteResponse {
    fn from(completion: Completion) -> Self {
        Self {
            newly_granted: completion.newly_granted(),
            points: completion.points(),
            advance: true,
        }
    }
}
