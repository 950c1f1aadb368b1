//! Data types shared by the resolver, the assembler and the validator.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a vocabulary entry, owned by the curriculum data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyId(pub String);

impl VocabularyId {
    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VocabularyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VocabularyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for VocabularyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vocabulary entry - immutable for the lifetime of a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Unique vocabulary identifier
    pub id: VocabularyId,
    /// English gloss, `/`-delimited when several synonyms are accepted (e.g. `"Hi/Hello"`)
    pub meaning: String,
    /// Romanized form of the target-language word
    #[serde(default)]
    pub transliteration: String,
    /// Pronunciation hint
    #[serde(default)]
    pub phonetic: String,
    /// Lesson this entry is introduced in
    pub lesson_id: String,
    /// Module grouping several lessons, used to widen the distractor scope
    #[serde(default)]
    pub module_id: Option<String>,
}

impl VocabularyItem {
    /// Build an entry with empty pronunciation fields and no module.
    pub fn new(id: impl Into<VocabularyId>, meaning: &str, lesson_id: &str) -> Self {
        Self {
            id: id.into(),
            meaning: meaning.to_string(),
            transliteration: String::new(),
            phonetic: String::new(),
            lesson_id: lesson_id.to_string(),
            module_id: None,
        }
    }

    /// Attach the entry to a module.
    pub fn in_module(mut self, module_id: &str) -> Self {
        self.module_id = Some(module_id.to_string());
        self
    }
}

/// Vocabulary available to one exercise, indexed by id.
///
/// The `version` changes whenever the content changes and is part of the
/// memoization key of a word bank.
#[derive(Debug, Clone, Default)]
pub struct VocabularyPool {
    items: Vec<VocabularyItem>,
    index: HashMap<VocabularyId, usize>,
    version: u64,
}

impl VocabularyPool {
    /// Build a pool at version 0. When ids repeat, the first entry wins.
    pub fn new(items: Vec<VocabularyItem>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.contains_key(&item.id) {
                tracing::warn!(vocabulary_id = %item.id, "Duplicate vocabulary id in pool, keeping the first entry");
                continue;
            }
            index.insert(item.id.clone(), position);
        }

        Self {
            items,
            index,
            version: 0,
        }
    }

    /// Set the content version of the pool.
    pub const fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &VocabularyId) -> Option<&VocabularyItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    /// All entries, in curriculum order.
    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    /// Content version.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of entries.
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool has no entries.
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<VocabularyItem>> for VocabularyPool {
    fn from(items: Vec<VocabularyItem>) -> Self {
        Self::new(items)
    }
}

/// What the learner has to reproduce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSpec {
    /// Free-text translation, split into units against the vocabulary pool
    Phrase {
        /// Expected translation
        text: String,
    },
    /// Explicit ordered vocabulary sequence, one unit per id
    Sequence {
        /// Vocabulary ids in answer order
        ids: Vec<VocabularyId>,
    },
}

impl TargetSpec {
    /// Free-text target.
    pub fn phrase(text: &str) -> Self {
        Self::Phrase {
            text: text.to_string(),
        }
    }

    /// Explicit sequence target.
    pub fn sequence<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<VocabularyId>,
    {
        Self::Sequence {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Smallest learner-facing answer token: a word or a fixed phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticUnit {
    /// Display text
    pub text: String,
    /// Normalized comparison key
    pub key: String,
    /// Keys accepted as interchangeable with this unit (always contains `key`)
    pub equivalents: BTreeSet<String>,
    /// Vocabulary entry the unit resolved to, if any
    pub vocabulary_id: Option<VocabularyId>,
}

impl SemanticUnit {
    /// Whether a normalized key is accepted for this unit.
    pub fn accepts(&self, key: &str) -> bool {
        self.key == key || self.equivalents.contains(key)
    }
}

/// One selectable tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBankItem {
    /// Display string
    pub word_text: String,
    /// Vocabulary entry behind the tile; synthetic free-text tiles have none
    pub vocabulary_id: Option<VocabularyId>,
    /// Whether the tile belongs to the answer
    pub is_correct: bool,
    /// Position in the answer, for correct tiles
    pub origin_order: Option<usize>,
    /// Normalized comparison key
    #[serde(skip)]
    pub normalized: String,
    /// Equivalence class of the tile
    #[serde(skip)]
    pub equivalents: BTreeSet<String>,
}

impl WordBankItem {
    /// Correct tile for the unit at `position` of the answer.
    pub fn correct(unit: &SemanticUnit, position: usize) -> Self {
        Self {
            word_text: unit.text.clone(),
            vocabulary_id: unit.vocabulary_id.clone(),
            is_correct: true,
            origin_order: Some(position),
            normalized: unit.key.clone(),
            equivalents: unit.equivalents.clone(),
        }
    }
}

/// Build the per-occurrence key of a tile.
pub fn display_key(word_text: &str, position: usize) -> String {
    format!("{word_text}-{position}")
}

/// Word bank of one exercise instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBankResult {
    /// Correct tiles in answer order, then distractors
    pub items: Vec<WordBankItem>,
    /// Shuffled tile texts, in display order
    pub display_options: Vec<String>,
    /// Display keys, parallel to `display_options`
    pub display_keys: Vec<String>,
    /// Tile behind each display key
    pub display_key_to_item: BTreeMap<String, WordBankItem>,
}

impl WordBankResult {
    /// Tile behind a display key.
    pub fn item(&self, display_key: &str) -> Option<&WordBankItem> {
        self.display_key_to_item.get(display_key)
    }

    /// Tiles in display order.
    pub fn tiles(&self) -> impl Iterator<Item = (&str, &WordBankItem)> + '_ {
        self.display_keys
            .iter()
            .filter_map(|key| self.item(key).map(|item| (key.as_str(), item)))
    }

    /// Display keys of the correct tiles in answer order.
    pub fn correct_display_keys(&self) -> Vec<String> {
        let mut correct: Vec<(usize, &str)> = self
            .tiles()
            .filter_map(|(key, item)| item.origin_order.map(|order| (order, key)))
            .collect();
        correct.sort_unstable_by_key(|(order, _)| *order);
        correct.into_iter().map(|(_, key)| key.to_string()).collect()
    }

    /// Number of correct tiles.
    pub fn correct_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_correct).count()
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bank has no tiles.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Judgement of one answer position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitResult {
    /// Vocabulary entry expected at this position
    pub vocabulary_id: Option<VocabularyId>,
    /// Expected text at this position
    pub word_text: String,
    /// Text the learner selected at this position
    pub selected_text: String,
    /// Whether the selection is accepted
    pub is_correct: bool,
}

/// Judgement of a full submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All positions correct
    pub overall_correct: bool,
    /// Per-position results, returned even when the answer is wrong
    pub per_unit_results: Vec<UnitResult>,
}

impl ValidationResult {
    /// Positions judged incorrect.
    pub fn incorrect_positions(&self) -> Vec<usize> {
        self.per_unit_results
            .iter()
            .enumerate()
            .filter(|(_, result)| !result.is_correct)
            .map(|(position, _)| position)
            .collect()
    }
}
