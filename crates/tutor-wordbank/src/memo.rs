//! Per-instance memoization of word banks.
//!
//! A bank is keyed by the identity of the content it was built for, not by the
//! pool reference, so re-renders reuse the same shuffle and the same
//! distractors while a change of content starts over.

use std::{fmt, sync::Arc};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{distractor::ScopeChain, error::WordBankError, model::TargetSpec, model::WordBankResult};

#[derive(Serialize)]
struct KeyMaterial<'a> {
    target: &'a TargetSpec,
    scope: &'a ScopeChain,
    max_size: usize,
    pool_version: u64,
}

/// Hex SHA-256 of the target, its overrides and the pool version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(
        target: &TargetSpec,
        scope: &ScopeChain,
        max_size: usize,
        pool_version: u64,
    ) -> Result<Self, WordBankError> {
        let material = serde_json::to_vec(&KeyMaterial {
            target,
            scope,
            max_size,
            pool_version,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&material);
        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Holds at most one generated bank together with the key it was built for.
#[derive(Debug, Default)]
pub struct MemoizedWordBank {
    entry: Option<(ContentKey, Arc<WordBankResult>)>,
}

impl MemoizedWordBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the bank cached for `key`, or discard whatever is cached and build
    /// a new one.
    pub fn get_or_generate<F>(&mut self, key: &ContentKey, generate: F) -> Arc<WordBankResult>
    where
        F: FnOnce() -> WordBankResult,
    {
        if let Some((cached_key, bank)) = &self.entry {
            if cached_key == key {
                return Arc::clone(bank);
            }
            tracing::debug!(old = %cached_key, new = %key, "Content changed, discarding memoized word bank");
        }

        let bank = Arc::new(generate());
        self.entry = Some((key.clone(), Arc::clone(&bank)));
        bank
    }

    /// Cached bank, if it was built for `key`.
    pub fn get(&self, key: &ContentKey) -> Option<Arc<WordBankResult>> {
        self.entry
            .as_ref()
            .filter(|(cached_key, _)| cached_key == key)
            .map(|(_, bank)| Arc::clone(bank))
    }

    /// Key of the cached bank.
    pub fn key(&self) -> Option<&ContentKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    /// Drop the cached bank.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn key(text: &str, version: u64) -> ContentKey {
        ContentKey::new(&TargetSpec::phrase(text), &ScopeChain::global(), 8, version).unwrap()
    }

    #[test]
    fn test_content_key_identity() {
        assert_eq!(key("I am good", 1), key("I am good", 1));
        assert_ne!(key("I am good", 1), key("I am good", 2));
        assert_ne!(key("I am good", 1), key("I am fine", 1));
        assert_eq!(key("I am good", 1).as_str().len(), 64);

        let sequence = ContentKey::new(&TargetSpec::sequence(["a"]), &ScopeChain::global(), 8, 1).unwrap();
        let narrower = ContentKey::new(&TargetSpec::sequence(["a"]), &ScopeChain::default(), 8, 1).unwrap();
        assert_ne!(sequence, narrower);
    }

    #[test]
    fn test_generates_once_per_key() {
        let calls = Cell::new(0);
        let generate = || {
            calls.set(calls.get() + 1);
            WordBankResult {
                display_options: vec![format!("call {}", calls.get())],
                ..WordBankResult::default()
            }
        };

        let mut memo = MemoizedWordBank::new();
        let first = memo.get_or_generate(&key("hello", 0), generate);
        let second = memo.get_or_generate(&key("hello", 0), generate);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        let third = memo.get_or_generate(&key("goodbye", 0), generate);
        assert_eq!(calls.get(), 2);
        assert_eq!(third.display_options, vec!["call 2"]);
        assert!(memo.get(&key("hello", 0)).is_none());
        assert_eq!(memo.key(), Some(&key("goodbye", 0)));

        memo.invalidate();
        assert!(memo.key().is_none());
    }
}
