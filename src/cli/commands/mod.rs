//! CLI command implementations.

mod config;
mod export;
mod fetch;
mod index;
mod ingest;
mod run;
mod search;
mod serve;
mod status;
mod translate;

pub use config::run_config;
pub use export::run_export;
pub use fetch::run_fetch;
pub use index::run_index;
pub use ingest::run_ingest;
pub use run::run_pipeline;
pub use search::run_search;
pub use serve::run_serve;
pub use status::run_status;
pub use translate::run_translate;
