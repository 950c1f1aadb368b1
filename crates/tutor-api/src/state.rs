use std::sync::Arc;

use tutor_exercise::{InMemoryMasteryTracker, InMemoryRewardLedger};
use tutor_wordbank::{VocabularyPool, WordBankAssembler};

use crate::{
    config::{ApiConfig, Environment},
    registry::ExerciseRegistry,
};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct ApiState {
    pub vocabulary: Arc<VocabularyPool>,
    pub assembler: Arc<WordBankAssembler>,
    pub exercises: ExerciseRegistry,
    pub ledger: Arc<InMemoryRewardLedger>,
    pub tracker: Arc<InMemoryMasteryTracker>,
    /// Points granted by the first completion of an exercise
    pub xp_per_exercise: u32,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig, vocabulary: VocabularyPool) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            assembler: Arc::new(WordBankAssembler::new(&config.wordbank)),
            exercises: ExerciseRegistry::new(),
            ledger: Arc::new(InMemoryRewardLedger::new()),
            tracker: Arc::new(InMemoryMasteryTracker::new()),
            xp_per_exercise: config.xp_per_exercise,
            environment: config.env,
        }
    }
}
