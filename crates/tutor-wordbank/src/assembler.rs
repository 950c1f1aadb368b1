//! Word bank assembly: correct units plus distractors, shuffled once.

use rand::{Rng, seq::SliceRandom};

use crate::{
    config::{DistractorConfig, WordBankConfig},
    distractor::{DistractorSelector, ScopeChain},
    model::{
        SemanticUnit, TargetSpec, VocabularyItem, VocabularyPool, WordBankItem, WordBankResult,
        display_key,
    },
    normalization::{Normalizer, canonical_display},
    resolver::SemanticUnitResolver,
};

/// Inputs of one word bank generation.
#[derive(Debug, Clone, Copy)]
pub struct WordBankRequest<'a> {
    pub target: &'a TargetSpec,
    pub pool: &'a VocabularyPool,
    pub max_size: usize,
    pub scope: &'a ScopeChain,
}

/// Builds word banks. Holds the normalizer shared with the validator.
#[derive(Debug, Clone)]
pub struct WordBankAssembler {
    normalizer: Normalizer,
    distractors: DistractorConfig,
    max_size: usize,
}

impl Default for WordBankAssembler {
    fn default() -> Self {
        Self::new(&WordBankConfig::default())
    }
}

impl WordBankAssembler {
    pub fn new(config: &WordBankConfig) -> Self {
        Self {
            normalizer: Normalizer::with_synonym_groups(&config.synonym_groups),
            distractors: config.distractor_config(),
            max_size: config.max_word_bank_size,
        }
    }

    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Configured number of tiles per bank.
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    pub const fn resolver(&self) -> SemanticUnitResolver<'_> {
        SemanticUnitResolver::new(&self.normalizer)
    }

    /// Semantic units of a target.
    pub fn resolve(&self, target: &TargetSpec, pool: &VocabularyPool) -> Vec<SemanticUnit> {
        self.resolver().resolve(target, pool)
    }

    /// Number of selections a complete submission has.
    pub fn count_semantic_units(&self, target: &TargetSpec, pool: &VocabularyPool) -> usize {
        self.resolver().count_semantic_units(target, pool)
    }

    /// Resolve the target and assemble its bank.
    pub fn generate<R>(&self, request: &WordBankRequest<'_>, rng: &mut R) -> WordBankResult
    where
        R: Rng + ?Sized,
    {
        let units = self.resolve(request.target, request.pool);
        self.assemble(&units, request, rng)
    }

    /// Assemble a bank for already resolved units.
    ///
    /// One tile per unit, in answer order, then up to `max_size - units` distractors.
    /// Candidates colliding with a tile after normalization are skipped in favour
    /// of the next unique one; correct tiles are never dropped. The merged set is
    /// shuffled exactly once.
    pub fn assemble<R>(
        &self,
        units: &[SemanticUnit],
        request: &WordBankRequest<'_>,
        rng: &mut R,
    ) -> WordBankResult
    where
        R: Rng + ?Sized,
    {
        if units.is_empty() {
            tracing::warn!(target_spec = ?request.target, "Target resolved to no semantic units");
        }

        let mut items: Vec<WordBankItem> = units
            .iter()
            .enumerate()
            .map(|(position, unit)| WordBankItem::correct(unit, position))
            .collect();

        let wanted = request.max_size.saturating_sub(items.len());
        let distractors = DistractorSelector::new(&self.normalizer, self.distractors).select(
            units,
            request.pool,
            wanted,
            request.scope,
            rng,
        );
        if distractors.len() < wanted {
            tracing::debug!(
                wanted,
                found = distractors.len(),
                "Not enough distractors in any scope, word bank is short"
            );
        }
        items.extend(distractors.into_iter().map(|item| self.distractor_item(item)));

        // Fisher-Yates over tile positions
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.shuffle(rng);

        let display_options: Vec<String> = order
            .iter()
            .map(|&index| items[index].word_text.clone())
            .collect();
        let display_keys: Vec<String> = display_options
            .iter()
            .enumerate()
            .map(|(position, text)| display_key(text, position))
            .collect();
        let display_key_to_item = display_keys
            .iter()
            .zip(&order)
            .map(|(key, &index)| (key.clone(), items[index].clone()))
            .collect();

        WordBankResult {
            items,
            display_options,
            display_keys,
            display_key_to_item,
        }
    }

    fn distractor_item(&self, item: &VocabularyItem) -> WordBankItem {
        WordBankItem {
            word_text: canonical_display(&item.meaning),
            vocabulary_id: Some(item.id.clone()),
            is_correct: false,
            origin_order: None,
            normalized: self.normalizer.key(&item.meaning).unwrap_or_default(),
            equivalents: self.normalizer.equivalence_class(&item.meaning),
        }
    }
}
