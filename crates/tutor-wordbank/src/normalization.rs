//! Text normalization for word bank construction and answer comparison.
//!
//! Every tile and every expected unit goes through the same [`Normalizer`], so a
//! raw string always maps to the same comparison key whichever side of the
//! comparison it sits on. Contractions are expanded (`"I'm"` and `"I am"` share
//! the key `"i am"`), and `/`-delimited meanings such as `"Hi/Hello"` produce one
//! key per alternative.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Contractions and their expanded forms
static CONTRACTIONS: &[(&str, &str)] = &[
    ("i'm", "i am"),
    ("i've", "i have"),
    ("i'll", "i will"),
    ("i'd", "i would"),
    ("you're", "you are"),
    ("you've", "you have"),
    ("you'll", "you will"),
    ("you'd", "you would"),
    ("he's", "he is"),
    ("he'll", "he will"),
    ("she's", "she is"),
    ("she'll", "she will"),
    ("it's", "it is"),
    ("it'll", "it will"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("we'll", "we will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("they'll", "they will"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("here's", "here is"),
    ("what's", "what is"),
    ("who's", "who is"),
    ("where's", "where is"),
    ("how's", "how is"),
    ("isn't", "is not"),
    ("aren't", "are not"),
    ("wasn't", "was not"),
    ("weren't", "were not"),
    ("haven't", "have not"),
    ("hasn't", "has not"),
    ("won't", "will not"),
    ("wouldn't", "would not"),
    ("don't", "do not"),
    ("doesn't", "does not"),
    ("didn't", "did not"),
    ("can't", "cannot"),
    ("couldn't", "could not"),
    ("shouldn't", "should not"),
    ("let's", "let us"),
];

/// Separator between synonyms in a vocabulary meaning
pub const ALTERNATIVE_SEPARATOR: char = '/';

/// Normalize a string into its comparison key.
///
/// Applies the following transformations in order:
/// 1. Lowercase, with typographic apostrophes unified to `'`
/// 2. Contraction expansion (`can't` -> `cannot`)
/// 3. Ligature expansion (`ß` -> `ss`)
/// 4. Unicode NFD decomposition, then everything but letters, digits and
///    whitespace is dropped (accents and punctuation, terminal `. ! ?` included)
/// 5. Collapse and trim whitespace
pub fn normalize_for_comparison(s: &str) -> String {
    let lowered = s.to_lowercase().replace(['\u{2019}', '\u{2018}', '`'], "'");

    lowered
        .split_whitespace()
        .map(expand_contraction)
        .collect::<Vec<_>>()
        .join(" ")
        .replace('ß', "ss")
        .replace('æ', "ae")
        .replace('œ', "oe")
        .nfd()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_contraction(word: &str) -> &str {
    let bare = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
    CONTRACTIONS
        .iter()
        .find(|(contracted, _)| *contracted == bare)
        .map_or(word, |(_, expanded)| *expanded)
}

/// Split a meaning into its non-empty alternatives.
pub fn split_alternatives(text: &str) -> impl Iterator<Item = &str> {
    text.split(ALTERNATIVE_SEPARATOR)
        .map(str::trim)
        .filter(|alternative| !alternative.is_empty())
}

/// Display string of a meaning: its first alternative.
pub fn canonical_display(text: &str) -> String {
    split_alternatives(text)
        .next()
        .map(strip_edge_punctuation)
        .unwrap_or_default()
        .to_string()
}

/// Strip sentence punctuation around a token while keeping inner apostrophes
/// and hyphens (`"you?"` -> `"you"`, `"¡Hola"` -> `"Hola"`).
pub fn strip_edge_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';' | ':' | '¡' | '¿' | '"'))
}

/// Shared normalization rules: the key pipeline plus configured synonym groups.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    synonym_groups: Vec<BTreeSet<String>>,
}

impl Normalizer {
    /// Normalizer without extra synonym groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer with synonym groups, each written like a meaning
    /// (`"hello/hi/salam"`). Groups with fewer than two keys are ignored.
    pub fn with_synonym_groups<S: AsRef<str>>(groups: &[S]) -> Self {
        let synonym_groups = groups
            .iter()
            .map(|group| {
                split_alternatives(group.as_ref())
                    .map(normalize_for_comparison)
                    .filter(|key| !key.is_empty())
                    .collect::<BTreeSet<_>>()
            })
            .filter(|group| group.len() > 1)
            .collect();

        Self { synonym_groups }
    }

    /// One key per alternative of `text`, canonical alternative first, without
    /// duplicates.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in split_alternatives(text).map(normalize_for_comparison) {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Canonical key of `text`, if it has any content.
    pub fn key(&self, text: &str) -> Option<String> {
        self.normalize(text).into_iter().next()
    }

    /// Every key accepted as interchangeable with `text`.
    pub fn equivalence_class(&self, text: &str) -> BTreeSet<String> {
        self.expand(self.normalize(text))
    }

    /// Widen a set of keys with the synonym groups any of them belongs to.
    pub fn expand<I>(&self, keys: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut class: BTreeSet<String> = keys.into_iter().collect();
        let extra: Vec<&String> = self
            .synonym_groups
            .iter()
            .filter(|group| !group.is_disjoint(&class))
            .flatten()
            .collect();
        class.extend(extra.into_iter().cloned());
        class
    }
}
