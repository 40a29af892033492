//! Run command implementation.

use super::translate::{report_failure, report_truncation, track_progress};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubtransError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the full pipeline.
pub async fn run_pipeline(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Translate) {
        Output::warning(&e.to_string());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let progress = Output::progress_bar(0, "Translating");

    let result = orchestrator
        .run_with(|event| track_progress(&progress, event))
        .await;

    let run = match result {
        Ok(run) => {
            progress.finish_and_clear();
            run
        }
        Err(e @ SubtransError::NoInputFound { .. }) => {
            progress.finish_and_clear();
            Output::warning(&e.to_string());
            return Ok(());
        }
        Err(e) => {
            progress.abandon();
            return Err(report_failure(e));
        }
    };

    Output::success(&format!(
        "Read {} ({} characters) into {} chunks",
        run.ingest.source.display(),
        run.ingest.characters,
        run.ingest.chunks_inserted
    ));
    Output::success(&format!("Translated {} chunks", run.translate.translated));
    report_truncation(&run.translate.truncated);
    Output::success(&format!(
        "Exported {} translations to {}",
        run.export.translations,
        run.export.path.display()
    ));

    Output::header("Preview");
    for chunk in &run.preview {
        Output::chunk_row(chunk.id, &chunk.original_text, chunk.translation.as_deref());
    }

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

        assert!(run_pipeline(settings).await.is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
