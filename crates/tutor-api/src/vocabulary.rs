//! Loading the vocabulary pool from disk.

use std::{fs, path::Path};

use anyhow::Context;
use sha2::{Digest, Sha256};
use tutor_wordbank::{VocabularyItem, VocabularyPool};

/// Parse a JSON array of vocabulary items.
///
/// The pool version is derived from the file contents, so editing the file
/// and restarting invalidates every memoized word bank key.
pub fn load_vocabulary(path: &Path) -> anyhow::Result<VocabularyPool> {
    let raw = fs::read(path)
        .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
    let pool = parse_vocabulary(&raw)
        .with_context(|| format!("Failed to parse vocabulary file {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        items = pool.len(),
        version = pool.version(),
        "Vocabulary loaded"
    );

    Ok(pool)
}

pub fn parse_vocabulary(raw: &[u8]) -> anyhow::Result<VocabularyPool> {
    let items: Vec<VocabularyItem> = serde_json::from_slice(raw)?;
    Ok(VocabularyPool::new(items).with_version(content_version(raw)))
}

fn content_version(raw: &[u8]) -> u64 {
    let digest = Sha256::digest(raw);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
