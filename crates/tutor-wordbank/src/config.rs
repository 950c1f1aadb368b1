//! Engine configuration.
//!
//! The overlap threshold and the affix leniency were tuned by hand on the
//! lesson content; both stay configurable until product confirms them.

use serde::{Deserialize, Serialize};

use crate::error::WordBankError;

const fn default_max_word_bank_size() -> usize {
    8
}

const fn default_overlap_threshold() -> f64 {
    0.5
}

const fn default_affix_leniency() -> usize {
    2
}

/// Word bank engine settings, read from `WORDBANK_*` environment variables.
///
/// # Environment Variables
/// - `WORDBANK_MAX_WORD_BANK_SIZE`: tiles per exercise (default 8)
/// - `WORDBANK_OVERLAP_THRESHOLD`: maximum shared-word ratio of a distractor (default 0.5)
/// - `WORDBANK_AFFIX_LENIENCY`: prefix/suffix length difference treated as a leak (default 2)
/// - `WORDBANK_SYNONYM_GROUPS`: comma-separated groups, members `/`-delimited
///   (e.g. `hello/hi/salam,goodbye/bye`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBankConfig {
    #[serde(default = "default_max_word_bank_size")]
    pub max_word_bank_size: usize,
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,
    #[serde(default = "default_affix_leniency")]
    pub affix_leniency: usize,
    #[serde(default)]
    pub synonym_groups: Vec<String>,
}

impl Default for WordBankConfig {
    fn default() -> Self {
        Self {
            max_word_bank_size: default_max_word_bank_size(),
            overlap_threshold: default_overlap_threshold(),
            affix_leniency: default_affix_leniency(),
            synonym_groups: Vec::new(),
        }
    }
}

impl WordBankConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, WordBankError> {
        let config: Self = envy::prefixed("WORDBANK_").from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from explicit `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, WordBankError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed("WORDBANK_").from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), WordBankError> {
        if self.max_word_bank_size == 0 {
            return Err(WordBankError::InvalidConfig(
                "max_word_bank_size must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(WordBankError::InvalidConfig(format!(
                "overlap_threshold must be within 0.0..=1.0, got {}",
                self.overlap_threshold
            )));
        }

        Ok(())
    }

    /// Settings of the distractor filters.
    pub const fn distractor_config(&self) -> DistractorConfig {
        DistractorConfig {
            overlap_threshold: self.overlap_threshold,
            affix_leniency: self.affix_leniency,
        }
    }
}

/// Thresholds of the distractor filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistractorConfig {
    /// Candidates sharing more than this ratio of words with an accepted entry are rejected
    pub overlap_threshold: f64,
    /// Maximum length difference for a prefix/suffix match to count as a leak
    pub affix_leniency: usize,
}

impl Default for DistractorConfig {
    fn default() -> Self {
        WordBankConfig::default().distractor_config()
    }
}
