//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::index::{search_index, SqliteTranslationIndex, TranslationIndex};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Embed)?;

    let index = SqliteTranslationIndex::new(&settings.index_path())?;
    if index.document_count().await? == 0 {
        Output::warning("The index is empty. Run `subtrans index` first.");
        return Ok(());
    }
    let embedder = OpenAIEmbedder::from_settings(&settings.index)?;

    let spinner = Output::spinner("Searching...");
    let results = search_index(&embedder, &index, query, limit, min_score).await;
    spinner.finish_and_clear();

    let hits = results?;
    if hits.is_empty() {
        Output::warning("No results found matching your query.");
        return Ok(());
    }

    Output::success(&format!("Found {} results", hits.len()));
    for hit in &hits {
        Output::search_result(
            hit.document.chunk_id,
            hit.document.window_order,
            hit.score,
            &hit.document.content,
        );
    }

    Ok(())
}
