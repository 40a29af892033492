//! In-memory chunk store.
//!
//! Useful for testing and dry runs.

use super::{Chunk, ChunkStore, PendingChunk, StoreStats, TranslatedPair};
use crate::error::{Result, SubtransError};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory chunk store.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Chunk>>> {
        self.chunks
            .read()
            .map_err(|e| SubtransError::Storage(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Chunk>>> {
        self.chunks
            .write()
            .map_err(|e| SubtransError::Storage(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn insert_chunks(&self, chunks: &[String]) -> Result<Vec<i64>> {
        let mut store = self.write()?;
        let mut next_id = store.last().map(|c| c.id).unwrap_or(0) + 1;
        let mut ids = Vec::with_capacity(chunks.len());

        for text in chunks {
            store.push(Chunk {
                id: next_id,
                original_text: text.clone(),
                length: text.chars().count(),
                translation: None,
                translation_length: None,
            });
            ids.push(next_id);
            next_id += 1;
        }

        Ok(ids)
    }

    async fn pending(&self) -> Result<Vec<PendingChunk>> {
        Ok(self
            .read()?
            .iter()
            .filter(|c| c.translation.is_none())
            .map(|c| PendingChunk {
                id: c.id,
                original_text: c.original_text.clone(),
            })
            .collect())
    }

    async fn record_translation(&self, id: i64, translation: &str) -> Result<()> {
        let mut store = self.write()?;
        let chunk = store
            .iter_mut()
            .find(|c| c.id == id && c.translation.is_none())
            .ok_or_else(|| {
                SubtransError::Storage(format!(
                    "chunk {} does not exist or is already translated",
                    id
                ))
            })?;

        chunk.translation = Some(translation.to_string());
        chunk.translation_length = Some(translation.chars().count());
        Ok(())
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>> {
        Ok(self.read()?.clone())
    }

    async fn preview(&self, limit: usize) -> Result<Vec<Chunk>> {
        Ok(self.read()?.iter().take(limit).cloned().collect())
    }

    async fn translated_pairs(&self) -> Result<Vec<TranslatedPair>> {
        Ok(self
            .read()?
            .iter()
            .filter_map(|c| {
                c.translation.as_ref().map(|translation| TranslatedPair {
                    id: c.id,
                    original_text: c.original_text.clone(),
                    translation: translation.clone(),
                })
            })
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let store = self.read()?;
        Ok(StoreStats {
            total: store.len(),
            translated: store.iter().filter(|c| c.is_translated()).count(),
        })
    }
}
