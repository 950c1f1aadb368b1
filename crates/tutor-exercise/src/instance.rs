//! State of one exercise instance, from mount to unmount.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tutor_wordbank::{
    ContentKey, MemoizedWordBank, ScopeChain, SemanticUnit, TargetSpec, ValidationResult,
    VocabularyPool, WordBankAssembler, WordBankError, WordBankRequest, WordBankResult, validate,
};
use uuid::Uuid;

use crate::{
    gate::CompletionGate,
    tracking::{MasteryTracker, UnitOutcome},
};

/// What an exercise asks for, with its explicit overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseContent {
    pub target: TargetSpec,
    pub scope: ScopeChain,
    pub max_size: usize,
    /// Stable identity of the exercise in the curriculum, used by the reward
    /// ledger; defaults to the content key
    pub reward_key: Option<String>,
}

impl ExerciseContent {
    pub fn new(target: TargetSpec, scope: ScopeChain, max_size: usize) -> Self {
        Self {
            target,
            scope,
            max_size,
            reward_key: None,
        }
    }

    pub fn with_reward_key(mut self, reward_key: &str) -> Self {
        self.reward_key = Some(reward_key.to_string());
        self
    }
}

/// A judged submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Judgement {
    pub attempt: u32,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Outcome of handing a selection to the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Selection count differs from the number of units; nothing was judged
    NotReady { expected: usize, actual: usize },
    /// This attempt was already judged and tracked
    Duplicate,
    /// Judged and forwarded to the mastery tracker
    Judged(Judgement),
}

/// One mounted exercise: memoized word bank, attempt state and completion gate.
#[derive(Debug)]
pub struct ExerciseInstance {
    id: Uuid,
    content: ExerciseContent,
    content_key: ContentKey,
    units: Vec<SemanticUnit>,
    pool: Arc<VocabularyPool>,
    assembler: Arc<WordBankAssembler>,
    seed: u64,
    memo: MemoizedWordBank,
    attempt: u32,
    attempt_started_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    tracked: bool,
    passed: bool,
    gate: Arc<CompletionGate>,
}

impl ExerciseInstance {
    /// Mount an instance. `seed` drives the distractor draw and the shuffle.
    pub fn new(
        content: ExerciseContent,
        pool: Arc<VocabularyPool>,
        assembler: Arc<WordBankAssembler>,
        seed: u64,
    ) -> Result<Self, WordBankError> {
        let content_key = ContentKey::new(
            &content.target,
            &content.scope,
            content.max_size,
            pool.version(),
        )?;
        let units = assembler.resolve(&content.target, &pool);
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            content,
            content_key,
            units,
            pool,
            assembler,
            seed,
            memo: MemoizedWordBank::new(),
            attempt: 1,
            attempt_started_at: now,
            last_active_at: now,
            tracked: false,
            passed: false,
            gate: Arc::new(CompletionGate::new()),
        })
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn content(&self) -> &ExerciseContent {
        &self.content
    }

    pub const fn content_key(&self) -> &ContentKey {
        &self.content_key
    }

    /// Units the learner must reproduce, in order.
    pub fn expected_units(&self) -> &[SemanticUnit] {
        &self.units
    }

    /// Whether `selected` selections make a complete submission.
    pub fn is_full(&self, selected: usize) -> bool {
        selected == self.units.len()
    }

    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether an attempt of this content was judged fully correct.
    pub const fn is_passed(&self) -> bool {
        self.passed
    }

    pub const fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Key under which the reward ledger knows this exercise.
    pub fn reward_key(&self) -> &str {
        self.content
            .reward_key
            .as_deref()
            .unwrap_or_else(|| self.content_key.as_str())
    }

    /// Gate of the current content.
    pub fn gate(&self) -> Arc<CompletionGate> {
        Arc::clone(&self.gate)
    }

    /// The word bank, generated on first use and identical on every later call
    /// for the same content.
    pub fn word_bank(&mut self) -> Arc<WordBankResult> {
        self.last_active_at = Utc::now();

        let request = WordBankRequest {
            target: &self.content.target,
            pool: &self.pool,
            max_size: self.content.max_size,
            scope: &self.content.scope,
        };
        let (assembler, units, seed) = (&self.assembler, &self.units, self.seed);
        let content_key = &self.content_key;

        self.memo.get_or_generate(content_key, || {
            let bank = assembler.assemble(units, &request, &mut StdRng::seed_from_u64(seed));
            tracing::debug!(
                content_key = %content_key,
                tiles = bank.len(),
                units = units.len(),
                "Word bank generated"
            );
            bank
        })
    }

    /// Replace the content. Returns `false` when the content identity is
    /// unchanged. Otherwise the memoized bank, the tracking flag and the
    /// completion gate of the old content are dropped.
    pub fn set_content(&mut self, content: ExerciseContent) -> Result<bool, WordBankError> {
        let content_key = ContentKey::new(
            &content.target,
            &content.scope,
            content.max_size,
            self.pool.version(),
        )?;
        if content_key == self.content_key && content.reward_key == self.content.reward_key {
            return Ok(false);
        }

        tracing::debug!(exercise_id = %self.id, "Exercise content changed, resetting state");
        self.units = self.assembler.resolve(&content.target, &self.pool);
        self.content = content;
        self.content_key = content_key;
        self.memo.invalidate();
        self.gate = Arc::new(CompletionGate::new());
        self.passed = false;
        self.attempt = 0;
        self.retry();
        Ok(true)
    }

    /// Start a new, distinct attempt after an incorrect submission.
    pub fn retry(&mut self) {
        let now = Utc::now();
        self.attempt += 1;
        self.attempt_started_at = now;
        self.last_active_at = now;
        self.tracked = false;
    }

    /// Judge a selection and forward per-unit outcomes to `tracker`.
    ///
    /// The tracking flag is set before judging so a duplicate submit of the same
    /// attempt is reported as [`SubmitOutcome::Duplicate`] and tracked only once.
    pub fn submit<T>(
        &mut self,
        display_keys: &[String],
        tracker: &T,
    ) -> Result<SubmitOutcome, WordBankError>
    where
        T: MasteryTracker + ?Sized,
    {
        self.last_active_at = Utc::now();

        if !self.is_full(display_keys.len()) {
            return Ok(SubmitOutcome::NotReady {
                expected: self.units.len(),
                actual: display_keys.len(),
            });
        }

        if self.tracked {
            tracing::debug!(exercise_id = %self.id, attempt = self.attempt, "Duplicate submission ignored");
            return Ok(SubmitOutcome::Duplicate);
        }
        self.tracked = true;

        let bank = self.word_bank();
        let result = match validate(display_keys, &self.units, &bank) {
            Ok(result) => result,
            Err(e) => {
                self.tracked = false;
                return Err(e);
            }
        };

        let elapsed_ms = u64::try_from(
            (Utc::now() - self.attempt_started_at)
                .num_milliseconds()
                .max(0),
        )
        .unwrap_or_default();
        let outcomes: Vec<UnitOutcome> = result
            .per_unit_results
            .iter()
            .map(|unit| UnitOutcome {
                result: unit.clone(),
                elapsed_ms,
            })
            .collect();
        tracker.record(self.id, &outcomes);

        if result.overall_correct {
            self.passed = true;
        }

        tracing::info!(
            exercise_id = %self.id,
            attempt = self.attempt,
            correct = result.overall_correct,
            elapsed_ms,
            "Submission judged"
        );

        Ok(SubmitOutcome::Judged(Judgement {
            attempt: self.attempt,
            elapsed_ms,
            result,
        }))
    }
}
