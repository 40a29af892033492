//! Translate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubtransError;
use crate::orchestrator::{Orchestrator, TranslationEvent};
use anyhow::Result;
use indicatif::ProgressBar;

/// Run the translate command: translate pending rows, then export.
pub async fn run_translate(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Translate) {
        Output::warning(&e.to_string());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let progress = Output::progress_bar(0, "Translating");

    let result = orchestrator
        .resume_with(|event| track_progress(&progress, event))
        .await;

    match result {
        Ok((translate, export)) => {
            progress.finish_and_clear();
            if translate.translated == 0 {
                Output::info("Nothing to translate.");
            } else {
                Output::success(&format!("Translated {} chunks", translate.translated));
            }
            report_truncation(&translate.truncated);
            Output::success(&format!(
                "Exported {} translations to {}",
                export.translations,
                export.path.display()
            ));
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(report_failure(e))
        }
    }
}

/// Advance a progress bar from translation events.
pub(super) fn track_progress(progress: &ProgressBar, event: &TranslationEvent) {
    match event {
        TranslationEvent::Started { pending } => progress.set_length(*pending as u64),
        TranslationEvent::Translated { chunk_id, .. } => {
            progress.set_message(format!("chunk {}", chunk_id));
            progress.inc(1);
        }
    }
}

pub(super) fn report_truncation(ids: &[i64]) {
    if !ids.is_empty() {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        Output::info(&format!(
            "Input was truncated to the token budget for chunks: {}",
            ids.join(", ")
        ));
    }
}

/// Print a pipeline failure and convert it for the caller.
pub(super) fn report_failure(err: SubtransError) -> anyhow::Error {
    Output::error(&err.to_string());
    if let Some(id) = err.failed_chunk_id() {
        Output::info(&format!(
            "Chunks before {} are saved. Run `subtrans translate` to resume.",
            id
        ));
    }
    err.into()
}
