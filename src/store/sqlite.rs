//! SQLite-backed chunk store.
//!
//! Runs in autocommit mode, so every translation update is committed before
//! `record_translation` returns.

use super::{Chunk, ChunkStore, PendingChunk, StoreStats, TranslatedPair};
use crate::error::{Result, SubtransError};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id INTEGER PRIMARY KEY,
        original_text TEXT,
        length INTEGER,
        translation TEXT,
        translation_length INTEGER
    );
"#;

const SELECT_CHUNKS: &str =
    "SELECT id, original_text, length, translation, translation_length FROM chunks";

/// SQLite chunk store.
pub struct SqliteChunkStore {
    conn: Mutex<Connection>,
}

impl SqliteChunkStore {
    /// Open (or create) the chunk database and ensure the schema exists.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // The web viewer reads while a run writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened chunk store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory chunk store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SubtransError::Storage(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<Chunk> {
        let original_text: Option<String> = row.get(1)?;
        let length: Option<i64> = row.get(2)?;
        let translation_length: Option<i64> = row.get(4)?;

        Ok(Chunk {
            id: row.get(0)?,
            original_text: original_text.unwrap_or_default(),
            length: length.unwrap_or_default() as usize,
            translation: row.get(3)?,
            translation_length: translation_length.map(|len| len as usize),
        })
    }

    fn query_chunks(&self, sql: &str, limit: Option<usize>) -> Result<Vec<Chunk>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = match limit {
            Some(limit) => stmt.query_map(params![limit as i64], Self::row_to_chunk)?,
            None => stmt.query_map([], Self::row_to_chunk)?,
        };

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn insert_chunks(&self, chunks: &[String]) -> Result<Vec<i64>> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(chunks.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (original_text, length, translation) VALUES (?1, ?2, NULL)",
            )?;
            for chunk in chunks {
                stmt.execute(params![chunk, chunk.chars().count() as i64])?;
                ids.push(tx.last_insert_rowid());
            }
        }

        tx.commit()?;
        info!("Inserted {} chunks", ids.len());
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn pending(&self) -> Result<Vec<PendingChunk>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, original_text FROM chunks WHERE translation IS NULL ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let original_text: Option<String> = row.get(1)?;
            Ok(PendingChunk {
                id: row.get(0)?,
                original_text: original_text.unwrap_or_default(),
            })
        })?;

        let pending = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Found {} pending chunks", pending.len());
        Ok(pending)
    }

    #[instrument(skip(self, translation))]
    async fn record_translation(&self, id: i64, translation: &str) -> Result<()> {
        let conn = self.lock()?;

        let updated = conn.execute(
            r#"
            UPDATE chunks
            SET translation = ?1, translation_length = ?2
            WHERE id = ?3 AND translation IS NULL
            "#,
            params![translation, translation.chars().count() as i64, id],
        )?;

        if updated == 0 {
            return Err(SubtransError::Storage(format!(
                "chunk {} does not exist or is already translated",
                id
            )));
        }

        debug!("Recorded translation for chunk {}", id);
        Ok(())
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>> {
        self.query_chunks(&format!("{} ORDER BY id", SELECT_CHUNKS), None)
    }

    async fn preview(&self, limit: usize) -> Result<Vec<Chunk>> {
        self.query_chunks(&format!("{} ORDER BY id LIMIT ?1", SELECT_CHUNKS), Some(limit))
    }

    async fn translated_pairs(&self) -> Result<Vec<TranslatedPair>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, original_text, translation
            FROM chunks
            WHERE translation IS NOT NULL
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let original_text: Option<String> = row.get(1)?;
            Ok(TranslatedPair {
                id: row.get(0)?,
                original_text: original_text.unwrap_or_default(),
                translation: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;
        let (total, translated): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(translation) FROM chunks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            total: total as usize,
            translated: translated as usize,
        })
    }
}
