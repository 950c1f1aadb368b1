//! Word bank engine for sentence and sequence building exercises.
//!
//! This crate turns a target phrase and a vocabulary pool into a bounded,
//! de-duplicated set of answer tiles, and judges the learner's ordered
//! selection against the expected semantic units with synonym and contraction
//! tolerance.

pub mod assembler;
pub mod config;
pub mod distractor;
pub mod error;
pub mod memo;
pub mod model;
pub mod normalization;
pub mod resolver;
pub mod validator;

pub use assembler::{WordBankAssembler, WordBankRequest};
pub use config::{DistractorConfig, WordBankConfig};
pub use distractor::{DistractorSelector, Scope, ScopeChain};
pub use error::WordBankError;
pub use memo::{ContentKey, MemoizedWordBank};
pub use model::{
    SemanticUnit, TargetSpec, UnitResult, ValidationResult, VocabularyId, VocabularyItem,
    VocabularyPool, WordBankItem, WordBankResult,
};
pub use normalization::Normalizer;
pub use resolver::SemanticUnitResolver;
pub use validator::validate;
