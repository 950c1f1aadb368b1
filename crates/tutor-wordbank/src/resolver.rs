//! Splits an expected answer into the ordered semantic units the learner must
//! reproduce. Known multi-word phrases are kept whole.

use std::collections::HashMap;

use crate::{
    model::{SemanticUnit, TargetSpec, VocabularyId, VocabularyItem, VocabularyPool},
    normalization::{Normalizer, canonical_display, strip_edge_punctuation},
};

/// Resolves a [`TargetSpec`] into semantic units.
#[derive(Debug, Clone, Copy)]
pub struct SemanticUnitResolver<'a> {
    normalizer: &'a Normalizer,
}

struct Token<'t> {
    display: &'t str,
    key: String,
}

impl<'a> SemanticUnitResolver<'a> {
    pub const fn new(normalizer: &'a Normalizer) -> Self {
        Self { normalizer }
    }

    /// Ordered units of the answer.
    ///
    /// A sequence yields one unit per known id; unknown ids are dropped with a
    /// warning. A phrase is matched greedily, left to right, against the longest
    /// multi-word vocabulary phrase; leftover words become single-word units.
    pub fn resolve(&self, target: &TargetSpec, pool: &VocabularyPool) -> Vec<SemanticUnit> {
        match target {
            TargetSpec::Sequence { ids } => self.resolve_sequence(ids, pool),
            TargetSpec::Phrase { text } => self.resolve_phrase(text, pool),
        }
    }

    /// Number of selections a complete submission has.
    pub fn count_semantic_units(&self, target: &TargetSpec, pool: &VocabularyPool) -> usize {
        self.resolve(target, pool).len()
    }

    /// Unit standing for a whole vocabulary entry.
    pub fn unit_for_item(&self, item: &VocabularyItem) -> Option<SemanticUnit> {
        let keys = self.normalizer.normalize(&item.meaning);
        let key = keys.first()?.clone();

        Some(SemanticUnit {
            text: canonical_display(&item.meaning),
            key,
            equivalents: self.normalizer.expand(keys),
            vocabulary_id: Some(item.id.clone()),
        })
    }

    fn resolve_sequence(&self, ids: &[VocabularyId], pool: &VocabularyPool) -> Vec<SemanticUnit> {
        ids.iter()
            .filter_map(|id| {
                let Some(item) = pool.get(id) else {
                    tracing::warn!(vocabulary_id = %id, "Sequence references unknown vocabulary, dropping it");
                    return None;
                };
                let unit = self.unit_for_item(item);
                if unit.is_none() {
                    tracing::warn!(vocabulary_id = %id, "Vocabulary meaning is empty, dropping it");
                }
                unit
            })
            .collect()
    }

    fn resolve_phrase(&self, text: &str, pool: &VocabularyPool) -> Vec<SemanticUnit> {
        let tokens: Vec<Token<'_>> = text
            .split_whitespace()
            .map(strip_edge_punctuation)
            .filter_map(|display| {
                self.normalizer
                    .key(display)
                    .map(|key| Token { display, key })
            })
            .collect();

        // Canonical keys claim a word before any secondary alternative does,
        // then the first entry wins
        let meanings: Vec<(&VocabularyItem, Vec<String>)> = pool
            .items()
            .iter()
            .map(|item| (item, self.normalizer.normalize(&item.meaning)))
            .collect();
        let mut index: HashMap<String, &VocabularyItem> = HashMap::new();
        let mut longest_phrase = 1;
        for (item, keys) in &meanings {
            if let Some(canonical) = keys.first() {
                index.entry(canonical.clone()).or_insert(*item);
            }
        }
        for (item, keys) in &meanings {
            for key in keys {
                longest_phrase = longest_phrase.max(key.split_whitespace().count());
                index.entry(key.clone()).or_insert(*item);
            }
        }

        let mut units = Vec::with_capacity(tokens.len());
        let mut start = 0;
        while start < tokens.len() {
            let last = tokens.len().min(start + longest_phrase);
            let phrase = (start + 2..=last).rev().find_map(|end| {
                let joined = join_keys(&tokens[start..end]);
                index.get(&joined).map(|item| (end, joined, *item))
            });

            match phrase {
                Some((end, key, item)) => {
                    let display = tokens[start..end]
                        .iter()
                        .map(|token| token.display)
                        .collect::<Vec<_>>()
                        .join(" ");
                    units.push(self.unit_from_text(display, key, Some(item)));
                    start = end;
                }
                None => {
                    let token = &tokens[start];
                    let item = index.get(&token.key).copied();
                    units.push(self.unit_from_text(
                        token.display.to_string(),
                        token.key.clone(),
                        item,
                    ));
                    start += 1;
                }
            }
        }

        units
    }

    fn unit_from_text(
        &self,
        text: String,
        key: String,
        item: Option<&VocabularyItem>,
    ) -> SemanticUnit {
        let mut keys = vec![key.clone()];
        if let Some(item) = item {
            keys.extend(self.normalizer.normalize(&item.meaning));
        }

        SemanticUnit {
            text,
            key,
            equivalents: self.normalizer.expand(keys),
            vocabulary_id: item.map(|item| item.id.clone()),
        }
    }
}

fn join_keys(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|token| token.key.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VocabularyItem;

    fn pool() -> VocabularyPool {
        VocabularyPool::new(vec![
            VocabularyItem::new("nice", "Nice to meet you", "l1"),
            VocabularyItem::new("hello", "Hello/Hi/Salam", "l1"),
            VocabularyItem::new("i", "I", "l1"),
            VocabularyItem::new("am", "am", "l1"),
            VocabularyItem::new("good", "good/fine", "l1"),
            VocabularyItem::new("thanks", "Thank you/Thanks", "l1"),
            VocabularyItem::new("you", "you", "l1"),
        ])
    }

    #[test]
    fn test_phrase_kept_whole() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::phrase("Nice to meet you!"), &pool());

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "Nice to meet you");
        assert_eq!(units[0].key, "nice to meet you");
        assert_eq!(units[0].vocabulary_id, Some("nice".into()));
    }

    #[test]
    fn test_longest_phrase_then_words() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::phrase("Hello, thank you. I am good"), &pool());

        let texts: Vec<&str> = units.iter().map(|unit| unit.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "thank you", "I", "am", "good"]);
        assert!(units[0].accepts("hi"));
        assert!(units[0].accepts("salam"));
        assert!(units[1].accepts("thanks"));
        assert!(units[4].accepts("fine"));
    }

    #[test]
    fn test_canonical_meaning_beats_earlier_alternative() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let pool = VocabularyPool::new(vec![
            VocabularyItem::new("hello", "Hello/Hi/Salam", "l1"),
            VocabularyItem::new("hi", "Hi", "l1"),
        ]);

        let units = resolver.resolve(&TargetSpec::phrase("Hi"), &pool);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].vocabulary_id, Some("hi".into()));

        // Secondary alternatives still resolve when nothing claims them canonically
        let units = resolver.resolve(&TargetSpec::phrase("Salam"), &pool);
        assert_eq!(units[0].vocabulary_id, Some("hello".into()));
    }

    #[test]
    fn test_unknown_words_become_synthetic_units() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::phrase("you and you"), &pool());

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].vocabulary_id, Some("you".into()));
        assert_eq!(units[1].vocabulary_id, None);
        assert_eq!(units[1].key, "and");
        assert_eq!(units[2].key, "you");
    }

    #[test]
    fn test_contraction_token_is_one_unit() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::phrase("I'm good"), &pool());

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "I'm");
        assert!(units[0].accepts("i am"));
    }

    #[test]
    fn test_sequence_one_unit_per_id() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let target = TargetSpec::sequence(["i", "am", "good"]);

        let units = resolver.resolve(&target, &pool());
        assert_eq!(units.len(), 3);
        assert_eq!(units[2].text, "good");
        assert!(units[2].accepts("fine"));
        assert_eq!(resolver.count_semantic_units(&target, &pool()), 3);
    }

    #[test]
    fn test_sequence_multi_word_meaning_is_one_unit() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::sequence(["nice", "hello"]), &pool());

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Nice to meet you");
        assert_eq!(units[1].text, "Hello");
    }

    #[test]
    fn test_sequence_drops_unknown_ids() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        let units = resolver.resolve(&TargetSpec::sequence(["i", "missing", "good"]), &pool());

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].vocabulary_id, Some("good".into()));
    }

    #[test]
    fn test_empty_phrase() {
        let normalizer = Normalizer::new();
        let resolver = SemanticUnitResolver::new(&normalizer);
        assert!(resolver.resolve(&TargetSpec::phrase("  ?! "), &pool()).is_empty());
    }
}
