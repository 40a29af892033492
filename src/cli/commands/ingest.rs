//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubtransError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Chunk the first subtitle file and store it without translating.
pub async fn run_ingest(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let input = match orchestrator.discover_input() {
        Ok(path) => path,
        Err(e @ SubtransError::NoInputFound { .. }) => {
            Output::warning(&e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let result = orchestrator.ingest(&input).await?;

    Output::success(&format!(
        "Stored {} chunks from {} ({} characters)",
        result.chunks_inserted,
        result.source.display(),
        result.characters
    ));
    Output::info("Run `subtrans translate` to translate them.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_input_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.working_dir = dir.path().to_string_lossy().to_string();

        assert!(run_ingest(settings).await.is_ok());
        assert!(!dir.path().join("text_chunks.db").exists());
    }
}
