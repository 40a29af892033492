//! Status command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{ChunkStore, SqliteChunkStore};
use anyhow::Result;

/// Show row counts and the first rows of the store.
pub async fn run_status(settings: Settings) -> Result<()> {
    let path = settings.sqlite_path();
    if !path.exists() {
        Output::warning(&format!("No chunk database at {}", path.display()));
        return Ok(());
    }

    let store = SqliteChunkStore::new(&path)?;
    let stats = store.stats().await?;

    Output::header("Chunk store");
    Output::kv("Database", &path.display().to_string());
    Output::kv("Chunks", &stats.total.to_string());
    Output::kv("Translated", &stats.translated.to_string());
    Output::kv("Pending", &stats.pending().to_string());

    let preview = store.preview(settings.export.preview_rows).await?;
    if !preview.is_empty() {
        Output::header("Preview");
        for chunk in &preview {
            Output::chunk_row(chunk.id, &chunk.original_text, chunk.translation.as_deref());
        }
    }

    Ok(())
}
