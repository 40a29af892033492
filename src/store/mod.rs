//! Chunk store abstraction.
//!
//! The store is the pipeline's only durable state: one row per chunk, with a
//! translation that stays null until the translator succeeds for that row.

mod memory;
mod sqlite;

pub use memory::MemoryChunkStore;
pub use sqlite::SqliteChunkStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Row id, assigned on insertion; ascending ids follow document order.
    pub id: i64,
    /// Source text of this chunk.
    pub original_text: String,
    /// Character count of `original_text`.
    pub length: usize,
    /// Translated text, once available.
    pub translation: Option<String>,
    /// Character count of `translation`.
    pub translation_length: Option<usize>,
}

impl Chunk {
    pub fn is_translated(&self) -> bool {
        self.translation.is_some()
    }
}

/// A chunk still waiting for its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChunk {
    pub id: i64,
    pub original_text: String,
}

/// An original/translation pair for a translated chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedPair {
    pub id: i64,
    pub original_text: String,
    pub translation: String,
}

/// Row counts for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub translated: usize,
}

impl StoreStats {
    pub fn pending(&self) -> usize {
        self.total - self.translated
    }
}

/// Trait for chunk store implementations.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert chunks with null translations, in order. Returns the new ids.
    async fn insert_chunks(&self, chunks: &[String]) -> Result<Vec<i64>>;

    /// All chunks whose translation is still null, in ascending id order.
    async fn pending(&self) -> Result<Vec<PendingChunk>>;

    /// Set the translation of one untranslated chunk and make it durable.
    ///
    /// Fails if the chunk does not exist or already has a translation.
    async fn record_translation(&self, id: i64, translation: &str) -> Result<()>;

    /// Every chunk, in ascending id order.
    async fn all_chunks(&self) -> Result<Vec<Chunk>>;

    /// The first `limit` chunks, in ascending id order.
    async fn preview(&self, limit: usize) -> Result<Vec<Chunk>>;

    /// Original/translation pairs of translated chunks, in ascending id order.
    async fn translated_pairs(&self) -> Result<Vec<TranslatedPair>>;

    /// Total and translated row counts.
    async fn stats(&self) -> Result<StoreStats>;

    /// Non-null translations, in ascending id order.
    async fn translations(&self) -> Result<Vec<String>> {
        Ok(self
            .translated_pairs()
            .await?
            .into_iter()
            .map(|pair| pair.translation)
            .collect())
    }
}
