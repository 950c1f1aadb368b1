//! Answer validation.

use std::collections::HashSet;

use crate::{
    error::WordBankError,
    model::{SemanticUnit, UnitResult, ValidationResult, WordBankResult},
};

/// Judge an ordered submission of display keys against the expected units.
///
/// A position is correct when the selected tile normalizes to the expected key
/// or shares a member of its equivalence class (synonyms, contractions).
/// Per-unit results are returned whether or not the whole answer is correct.
///
/// A submission whose length differs from the number of units is refused with
/// [`WordBankError::IncompleteSubmission`] instead of being judged.
pub fn validate(
    user_display_keys: &[String],
    expected_units: &[SemanticUnit],
    result: &WordBankResult,
) -> Result<ValidationResult, WordBankError> {
    if user_display_keys.len() != expected_units.len() {
        return Err(WordBankError::IncompleteSubmission {
            expected: expected_units.len(),
            actual: user_display_keys.len(),
        });
    }

    let mut selected = HashSet::with_capacity(user_display_keys.len());
    let per_unit_results = user_display_keys
        .iter()
        .zip(expected_units)
        .map(|(display_key, unit)| {
            if !selected.insert(display_key.as_str()) {
                return Err(WordBankError::DuplicateSelection(display_key.clone()));
            }
            let item = result
                .item(display_key)
                .ok_or_else(|| WordBankError::UnknownDisplayKey(display_key.clone()))?;

            let is_correct =
                unit.accepts(&item.normalized) || !item.equivalents.is_disjoint(&unit.equivalents);

            Ok(UnitResult {
                vocabulary_id: unit.vocabulary_id.clone(),
                word_text: unit.text.clone(),
                selected_text: item.word_text.clone(),
                is_correct,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidationResult {
        overall_correct: per_unit_results.iter().all(|unit| unit.is_correct),
        per_unit_results,
    })
}
