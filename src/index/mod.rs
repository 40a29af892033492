//! Retrieval index over translated pairs.
//!
//! Each translated pair is indexed as `"{original}\n{translation}"`, split
//! into overlapping windows and embedded. The index lives in its own SQLite
//! database and is always rebuilt from the chunk store as a whole.

mod sqlite;

pub use sqlite::SqliteTranslationIndex;

use crate::chunking::overlapping_windows;
use crate::config::IndexSettings;
use crate::embedding::Embedder;
use crate::error::{Result, SubtransError};
use crate::store::ChunkStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// One embedded window of a translated pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: Uuid,
    /// Chunk store row this window was cut from.
    pub chunk_id: i64,
    /// Position of the window within its chunk's document.
    pub window_order: i32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub indexed_at: DateTime<Utc>,
}

impl IndexDocument {
    pub fn new(chunk_id: i64, window_order: i32, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chunk_id,
            window_order,
            content,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search hit with its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: IndexDocument,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for translation index backends.
#[async_trait]
pub trait TranslationIndex: Send + Sync {
    /// Replace the whole index with `docs`.
    async fn replace_all(&self, docs: &[IndexDocument]) -> Result<usize>;

    /// Top `limit` documents scoring at least `min_score`, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchHit>>;

    /// Number of indexed windows.
    async fn document_count(&self) -> Result<usize>;
}

/// Summary of an index rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub pairs: usize,
    pub documents: usize,
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rebuild the index from every translated pair in the store.
#[instrument(skip_all)]
pub async fn build_index(
    store: &dyn ChunkStore,
    embedder: &dyn Embedder,
    index: &dyn TranslationIndex,
    settings: &IndexSettings,
) -> Result<IndexReport> {
    let pairs = store.translated_pairs().await?;

    let mut windows: Vec<(i64, i32, String)> = Vec::new();
    for pair in &pairs {
        let document = format!("{}\n{}", pair.original_text, pair.translation);
        for (order, window) in overlapping_windows(&document, settings.chunk_size, settings.chunk_overlap)
            .into_iter()
            .enumerate()
        {
            windows.push((pair.id, order as i32, window));
        }
    }

    let texts: Vec<String> = windows.iter().map(|(_, _, text)| text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != windows.len() {
        return Err(SubtransError::Index(format!(
            "Expected {} embeddings, received {}",
            windows.len(),
            embeddings.len()
        )));
    }

    let docs: Vec<IndexDocument> = windows
        .into_iter()
        .zip(embeddings)
        .map(|((chunk_id, order, content), embedding)| {
            IndexDocument::new(chunk_id, order, content, embedding)
        })
        .collect();

    let documents = index.replace_all(&docs).await?;
    info!("Indexed {} windows from {} translated chunks", documents, pairs.len());

    Ok(IndexReport {
        pairs: pairs.len(),
        documents,
    })
}

/// Embed a query and search the index.
pub async fn search_index(
    embedder: &dyn Embedder,
    index: &dyn TranslationIndex,
    query: &str,
    limit: usize,
    min_score: f32,
) -> Result<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Err(SubtransError::InvalidInput("search query is empty".to_string()));
    }
    let embedding = embedder.embed(query).await?;
    index.search(&embedding, limit, min_score).await
}
