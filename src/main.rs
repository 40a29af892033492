//! subtrans CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use subtrans::cli::{commands, Cli, Commands};
use subtrans::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY from a local .env
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("subtrans={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Run => commands::run_pipeline(settings).await?,

        Commands::Ingest => commands::run_ingest(settings).await?,

        Commands::Translate => commands::run_translate(settings).await?,

        Commands::Export => commands::run_export(settings).await?,

        Commands::Status => commands::run_status(settings).await?,

        Commands::Fetch {
            video,
            languages,
            timecode,
        } => {
            commands::run_fetch(&video, languages, timecode, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Index => commands::run_index(settings).await?,

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            commands::run_search(&query, limit, min_score, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
