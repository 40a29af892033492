//! Configuration settings for subtrans.

use crate::error::{Result, SubtransError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub input: InputSettings,
    pub chunking: ChunkingSettings,
    pub translation: TranslationSettings,
    pub store: StoreSettings,
    pub export: ExportSettings,
    pub fetch: FetchSettings,
    pub index: IndexSettings,
    pub serve: ServeSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory holding subtitle files, the chunk database and exports.
    pub working_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            working_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Input file discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Regex a file name must match to be picked up as a subtitle file.
    pub pattern: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            pattern: r"^.+_subtitle(_with_timecode)?\.txt$".to_string(),
        }
    }
}

/// Line-accumulation chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Buffer length (characters) that triggers a flush when the next line would exceed it.
    pub flush_threshold: usize,
    /// Hard slice size (characters) applied to every flushed buffer.
    pub chunk_size: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            flush_threshold: 700,
            chunk_size: 1000,
        }
    }
}

/// Translator gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Chat completion model.
    pub model: String,
    /// Language the text is translated into.
    pub target_language: String,
    /// Tokenizer encoding used for the input budget.
    pub encoding: String,
    /// Input token ceiling; longer inputs are truncated.
    pub max_input_tokens: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Alternative API base URL for OpenAI-compatible servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            target_language: "Korean".to_string(),
            encoding: "cl100k_base".to_string(),
            max_input_tokens: 64000,
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
            api_base: None,
        }
    }
}

/// Chunk store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite chunk database, relative to the working directory.
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "text_chunks.db".to_string(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output directory, relative to the working directory.
    pub output_dir: String,
    /// Output file name inside `output_dir`.
    pub file_name: String,
    /// Number of rows printed after a run.
    pub preview_rows: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: "translations".to_string(),
            file_name: "translation_results.txt".to_string(),
            preview_rows: 5,
        }
    }
}

/// Transcript fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Caption languages in order of preference.
    pub languages: Vec<String>,
    /// Prefix every caption line with `[HH:MM:SS]`.
    pub include_timecode: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            include_timecode: false,
        }
    }
}

/// Translation index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Path to the SQLite index database, relative to the working directory.
    pub sqlite_path: String,
    /// Embedding model.
    pub embedding_model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Window size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows.
    pub chunk_overlap: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "translation_index.db".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Web viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory holding a `translation.toml` that overrides the built-in prompts.
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(SubtransError::Config(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.translation.max_input_tokens == 0 {
            return Err(SubtransError::Config(
                "translation.max_input_tokens must be greater than zero".to_string(),
            ));
        }
        if self.index.chunk_size == 0 || self.index.chunk_overlap >= self.index.chunk_size {
            return Err(SubtransError::Config(
                "index.chunk_overlap must be smaller than a non-zero index.chunk_size".to_string(),
            ));
        }
        regex::Regex::new(&self.input.pattern).map_err(|e| {
            SubtransError::Config(format!("input.pattern is not a valid regex: {}", e))
        })?;
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SubtransError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subtrans")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded working directory.
    pub fn working_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.working_dir)
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = Self::expand_path(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir().join(expanded)
        }
    }

    /// Path of the chunk database.
    pub fn sqlite_path(&self) -> PathBuf {
        self.resolve(&self.store.sqlite_path)
    }

    /// Path of the translation index database.
    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.index.sqlite_path)
    }

    /// Path of the exported translation file.
    pub fn export_path(&self) -> PathBuf {
        self.resolve(&self.export.output_dir)
            .join(&self.export.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_pipeline() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.flush_threshold, 700);
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.translation.max_input_tokens, 64000);
        assert_eq!(settings.translation.model, "gpt-4o-mini");
        assert_eq!(settings.export.preview_rows, 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_paths_resolve_against_working_dir() {
        let mut settings = Settings::default();
        settings.general.working_dir = "/data/subs".to_string();

        assert_eq!(settings.sqlite_path(), PathBuf::from("/data/subs/text_chunks.db"));
        assert_eq!(
            settings.export_path(),
            PathBuf::from("/data/subs/translations/translation_results.txt")
        );

        settings.store.sqlite_path = "/var/db/chunks.db".to_string();
        assert_eq!(settings.sqlite_path(), PathBuf::from("/var/db/chunks.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            flush_threshold = 500
            "#,
        )
        .unwrap();
        assert_eq!(settings.chunking.flush_threshold, 500);
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.store.sqlite_path, "text_chunks.db");
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 0;
        assert!(matches!(settings.validate(), Err(SubtransError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.translation.target_language = "Japanese".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.translation.target_language, "Japanese");
    }
}
