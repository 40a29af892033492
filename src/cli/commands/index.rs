//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::index::{build_index, SqliteTranslationIndex};
use crate::store::SqliteChunkStore;
use anyhow::Result;

/// Rebuild the translation index.
pub async fn run_index(settings: Settings) -> Result<()> {
    preflight::check(Operation::Embed)?;

    let store = SqliteChunkStore::new(&settings.sqlite_path())?;
    let embedder = OpenAIEmbedder::from_settings(&settings.index)?;
    let index = SqliteTranslationIndex::new(&settings.index_path())?;

    let spinner = Output::spinner("Embedding translated chunks...");
    let result = build_index(&store, &embedder, &index, &settings.index).await;
    spinner.finish_and_clear();

    let report = result?;
    if report.pairs == 0 {
        Output::warning("No translated chunks to index.");
    } else {
        Output::success(&format!(
            "Indexed {} windows from {} translated chunks",
            report.documents, report.pairs
        ));
    }

    Ok(())
}
