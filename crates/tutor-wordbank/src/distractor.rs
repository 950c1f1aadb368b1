//! Distractor selection with tiered scope fallback.
//!
//! Candidates are drawn from the narrowest scope first (the current lesson) and
//! the scope is widened only while the bank is still short. A candidate is
//! rejected when it:
//! - shares a key with the answer,
//! - collides with an accepted tile after normalization,
//! - shares too many words with an accepted tile ("nice meet you" next to
//!   "nice to meet you"),
//! - contains a word that is a near prefix/suffix of an answer word.

use std::collections::{BTreeSet, HashSet};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    config::DistractorConfig,
    model::{SemanticUnit, VocabularyId, VocabularyItem, VocabularyPool},
    normalization::Normalizer,
};

/// A slice of the vocabulary distractors may be drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "value", rename_all = "snake_case")]
pub enum Scope {
    /// Entries introduced in one lesson
    Lesson(String),
    /// Entries the learner has already studied
    Learned(BTreeSet<VocabularyId>),
    /// Entries of every lesson in one module
    Module(String),
    /// The whole pool
    Global,
}

impl Scope {
    /// Whether an entry belongs to the scope.
    pub fn contains(&self, item: &VocabularyItem) -> bool {
        match self {
            Self::Lesson(lesson_id) => item.lesson_id == *lesson_id,
            Self::Learned(ids) => ids.contains(&item.id),
            Self::Module(module_id) => item.module_id.as_deref() == Some(module_id.as_str()),
            Self::Global => true,
        }
    }

    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lesson(_) => "lesson",
            Self::Learned(_) => "learned",
            Self::Module(_) => "module",
            Self::Global => "global",
        }
    }
}

/// Scopes in widening order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeChain(Vec<Scope>);

impl ScopeChain {
    /// Chain with explicit scopes. An empty chain draws from the whole pool.
    pub const fn new(scopes: Vec<Scope>) -> Self {
        Self(scopes)
    }

    /// Chain with the global scope only.
    pub fn global() -> Self {
        Self(vec![Scope::Global])
    }

    /// Lesson, then learned vocabulary, then module, then the whole pool.
    /// Missing or empty parts are skipped.
    pub fn for_exercise(
        lesson_id: Option<&str>,
        module_id: Option<&str>,
        learned: Option<&BTreeSet<VocabularyId>>,
    ) -> Self {
        let mut scopes = Vec::with_capacity(4);
        if let Some(lesson_id) = lesson_id {
            scopes.push(Scope::Lesson(lesson_id.to_string()));
        }
        if let Some(learned) = learned.filter(|ids| !ids.is_empty()) {
            scopes.push(Scope::Learned(learned.clone()));
        }
        if let Some(module_id) = module_id {
            scopes.push(Scope::Module(module_id.to_string()));
        }
        scopes.push(Scope::Global);
        Self(scopes)
    }

    /// Scopes in widening order.
    pub fn scopes(&self) -> &[Scope] {
        &self.0
    }
}

/// Share of words two keys have in common, relative to the larger word set.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let a_words: HashSet<&str> = a.split_whitespace().collect();
    let b_words: HashSet<&str> = b.split_whitespace().collect();
    let larger = a_words.len().max(b_words.len());
    if larger == 0 {
        return 0.0;
    }

    let shared = a_words.intersection(&b_words).count();
    shared as f64 / larger as f64
}

/// Whether one word starts or ends with the other and their lengths differ by
/// at most `leniency` characters.
pub fn is_affix_match(a: &str, b: &str, leniency: usize) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (short, long) = if a_len <= b_len { (a, b) } else { (b, a) };
    if short.is_empty() || a_len.abs_diff(b_len) > leniency {
        return false;
    }

    long.starts_with(short) || long.ends_with(short)
}

/// Picks plausible but wrong tiles.
#[derive(Debug, Clone, Copy)]
pub struct DistractorSelector<'a> {
    normalizer: &'a Normalizer,
    config: DistractorConfig,
}

impl<'a> DistractorSelector<'a> {
    pub const fn new(normalizer: &'a Normalizer, config: DistractorConfig) -> Self {
        Self { normalizer, config }
    }

    /// Select up to `max_count` distractors for `correct_units`.
    ///
    /// Fewer are returned when no scope of the chain yields enough acceptable
    /// candidates.
    pub fn select<'p, R>(
        &self,
        correct_units: &[SemanticUnit],
        pool: &'p VocabularyPool,
        max_count: usize,
        scope_chain: &ScopeChain,
        rng: &mut R,
    ) -> Vec<&'p VocabularyItem>
    where
        R: Rng + ?Sized,
    {
        let mut chosen = Vec::with_capacity(max_count);
        if max_count == 0 {
            return chosen;
        }

        let global = [Scope::Global];
        let scopes = if scope_chain.scopes().is_empty() {
            &global[..]
        } else {
            scope_chain.scopes()
        };

        let answer_keys: HashSet<&str> = correct_units
            .iter()
            .flat_map(|unit| unit.equivalents.iter().map(String::as_str))
            .collect();
        let answer_words: Vec<&str> = correct_units
            .iter()
            .flat_map(|unit| unit.key.split_whitespace())
            .collect();

        // Keys of every accepted tile, correct ones included
        let mut accepted: Vec<String> = correct_units.iter().map(|unit| unit.key.clone()).collect();
        let mut considered: HashSet<&VocabularyId> = HashSet::new();

        for scope in scopes {
            let mut candidates: Vec<(&'p VocabularyItem, String)> = pool
                .items()
                .iter()
                .filter(|item| scope.contains(item) && considered.insert(&item.id))
                .filter_map(|item| {
                    let keys = self.normalizer.normalize(&item.meaning);
                    let key = keys.first()?.clone();
                    let rejected = keys.iter().any(|candidate| {
                        answer_keys.contains(candidate.as_str())
                            || self.leaks_answer(candidate, &answer_words)
                    });
                    (!rejected).then_some((item, key))
                })
                .collect();

            candidates.shuffle(rng);

            for (item, key) in candidates {
                if accepted.iter().any(|taken| self.is_confusable(taken, &key)) {
                    continue;
                }

                accepted.push(key);
                chosen.push(item);
                if chosen.len() == max_count {
                    return chosen;
                }
            }

            tracing::debug!(
                scope = scope.name(),
                found = chosen.len(),
                wanted = max_count,
                "Distractor scope exhausted"
            );
        }

        chosen
    }

    fn is_confusable(&self, taken: &str, candidate: &str) -> bool {
        taken == candidate || word_overlap(taken, candidate) > self.config.overlap_threshold
    }

    fn leaks_answer(&self, candidate: &str, answer_words: &[&str]) -> bool {
        candidate.split_whitespace().any(|word| {
            answer_words
                .iter()
                .any(|answer| is_affix_match(word, answer, self.config.affix_leniency))
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{model::TargetSpec, resolver::SemanticUnitResolver};

    fn units(normalizer: &Normalizer, pool: &VocabularyPool, text: &str) -> Vec<SemanticUnit> {
        SemanticUnitResolver::new(normalizer).resolve(&TargetSpec::phrase(text), pool)
    }

    fn meanings(items: &[&VocabularyItem]) -> Vec<String> {
        items.iter().map(|item| item.meaning.clone()).collect()
    }

    #[test]
    fn test_word_overlap() {
        assert!((word_overlap("nice to meet you", "nice meet you") - 0.75).abs() < 1e-9);
        assert!((word_overlap("good morning", "good night") - 0.5).abs() < 1e-9);
        assert_eq!(word_overlap("apple", "river"), 0.0);
        assert_eq!(word_overlap("", ""), 0.0);
    }

    #[test]
    fn test_affix_match() {
        assert!(is_affix_match("meet", "meets", 2));
        assert!(is_affix_match("good", "goodly", 2));
        assert!(is_affix_match("you", "you", 2));
        assert!(is_affix_match("ting", "meeting", 3));
        assert!(!is_affix_match("ting", "meeting", 2));
        assert!(!is_affix_match("bread", "butter", 2));
        assert!(!is_affix_match("", "you", 2));
    }

    #[test]
    fn test_rejects_answer_synonyms_near_duplicates_and_leaks() {
        let normalizer = Normalizer::new();
        let pool = VocabularyPool::new(vec![
            VocabularyItem::new("nice", "Nice to meet you", "l1"),
            VocabularyItem::new("hi", "Hi/Nice to meet you", "l1"),
            VocabularyItem::new("near", "nice meet you", "l1"),
            VocabularyItem::new("meets", "meets", "l1"),
            VocabularyItem::new("water", "water", "l1"),
            VocabularyItem::new("bread", "bread", "l1"),
        ]);
        let correct = units(&normalizer, &pool, "Nice to meet you");
        let selector = DistractorSelector::new(&normalizer, DistractorConfig::default());

        let picked = selector.select(&correct, &pool, 10, &ScopeChain::global(), &mut StdRng::seed_from_u64(7));
        let mut picked = meanings(&picked);
        picked.sort();
        assert_eq!(picked, vec!["bread", "water"]);
    }

    #[test]
    fn test_rejects_collisions_between_distractors() {
        let normalizer = Normalizer::new();
        let pool = VocabularyPool::new(vec![
            VocabularyItem::new("a", "Water", "l1"),
            VocabularyItem::new("b", "water!", "l1"),
            VocabularyItem::new("c", "hot water", "l1"),
            VocabularyItem::new("d", "cold water", "l1"),
        ]);
        let correct = units(&normalizer, &pool, "bread");
        let selector = DistractorSelector::new(&normalizer, DistractorConfig::default());

        for seed in 0..20 {
            let picked = selector.select(&correct, &pool, 10, &ScopeChain::global(), &mut StdRng::seed_from_u64(seed));
            let keys: HashSet<String> = picked
                .iter()
                .filter_map(|item| normalizer.key(&item.meaning))
                .collect();
            assert_eq!(keys.len(), picked.len(), "seed {seed}: {:?}", meanings(&picked));
            // "water" and "hot water" overlap by exactly 0.5, which is allowed;
            // "hot water" and "cold water" overlap by 0.5 as well.
            assert_eq!(picked.len(), 3, "seed {seed}");
        }
    }

    #[test]
    fn test_tiered_fallback_prefers_narrow_scope() {
        let normalizer = Normalizer::new();
        let pool = VocabularyPool::new(vec![
            VocabularyItem::new("g1", "river", "l9").in_module("m2"),
            VocabularyItem::new("m1", "table", "l2").in_module("m1"),
            VocabularyItem::new("m2", "chair", "l2").in_module("m1"),
            VocabularyItem::new("l1", "apple", "l1").in_module("m1"),
            VocabularyItem::new("l2", "bread", "l1").in_module("m1"),
            VocabularyItem::new("t", "thanks", "l1").in_module("m1"),
        ]);
        let correct = units(&normalizer, &pool, "thanks");
        let selector = DistractorSelector::new(&normalizer, DistractorConfig::default());
        let chain = ScopeChain::for_exercise(Some("l1"), Some("m1"), None);

        let picked = selector.select(&correct, &pool, 2, &chain, &mut StdRng::seed_from_u64(1));
        let mut picked = meanings(&picked);
        picked.sort();
        assert_eq!(picked, vec!["apple", "bread"]);

        let picked = selector.select(&correct, &pool, 4, &chain, &mut StdRng::seed_from_u64(1));
        let picked = meanings(&picked);
        assert_eq!(picked.len(), 4);
        assert!(!picked.contains(&"river".to_string()));

        let picked = selector.select(&correct, &pool, 10, &chain, &mut StdRng::seed_from_u64(1));
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn test_learned_scope_between_lesson_and_module() {
        let learned: BTreeSet<VocabularyId> = ["old".into()].into_iter().collect();
        let chain = ScopeChain::for_exercise(Some("l1"), Some("m1"), Some(&learned));
        let names: Vec<&str> = chain.scopes().iter().map(Scope::name).collect();
        assert_eq!(names, vec!["lesson", "learned", "module", "global"]);

        let empty = BTreeSet::new();
        let chain = ScopeChain::for_exercise(None, None, Some(&empty));
        assert_eq!(chain, ScopeChain::global());
    }

    #[test]
    fn test_zero_requested_and_exhausted_pool() {
        let normalizer = Normalizer::new();
        let pool = VocabularyPool::new(vec![VocabularyItem::new("t", "thanks", "l1")]);
        let correct = units(&normalizer, &pool, "thanks");
        let selector = DistractorSelector::new(&normalizer, DistractorConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        assert!(selector.select(&correct, &pool, 0, &ScopeChain::global(), &mut rng).is_empty());
        assert!(selector.select(&correct, &pool, 5, &ScopeChain::default(), &mut rng).is_empty());
    }
}
