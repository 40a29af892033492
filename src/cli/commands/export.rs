//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Write every translation in the store to the export file.
pub async fn run_export(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let result = orchestrator.export().await?;

    if result.translations == 0 {
        Output::warning("No translations in the store yet.");
    }
    Output::success(&format!(
        "Exported {} translations to {}",
        result.translations,
        result.path.display()
    ));

    Ok(())
}
