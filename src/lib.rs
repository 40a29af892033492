//! subtrans - Subtitle Translation Pipeline
//!
//! Reads a subtitle transcript, splits it into line-aligned chunks, translates
//! each chunk with an OpenAI chat model and exports the translations.
//!
//! # Overview
//!
//! subtrans allows you to:
//! - Translate a `<video_id>_subtitle.txt` transcript chunk by chunk
//! - Resume an interrupted translation from the SQLite chunk store
//! - Fetch YouTube captions into subtitle files
//! - Browse translated pairs in a small web viewer
//! - Search translated pairs semantically
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `chunking` - Line-accumulation chunker and overlapping windows
//! - `store` - Durable chunk store (SQLite, in-memory)
//! - `translation` - Translator gateway and token budget
//! - `orchestrator` - Pipeline coordination
//! - `transcript` - Caption fetching via yt-dlp
//! - `embedding` - Embedding generation
//! - `index` - Retrieval index over translated pairs
//!
//! # Example
//!
//! ```rust,no_run
//! use subtrans::config::Settings;
//! use subtrans::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.run().await?;
//!     println!("Exported {} translations", result.export.translations);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod store;
pub mod transcript;
pub mod translation;

pub use error::{GatewayError, Result, SubtransError};
