//! Pipeline orchestrator for subtrans.
//!
//! Drives one subtitle file through discovery, chunking, storage,
//! translation and export, strictly one step at a time.

use crate::chunking::{ChunkingConfig, LineChunker};
use crate::config::Settings;
use crate::error::{Result, SubtransError};
use crate::store::{Chunk, ChunkStore, SqliteChunkStore};
use crate::translation::{OpenAITranslator, Translator, TruncationNotice};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument};

/// Stages a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Idle,
    FileDiscovered,
    Chunked,
    Inserted,
    Translating,
    Exported,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::FileDiscovered => "file-discovered",
            PipelineStage::Chunked => "chunked",
            PipelineStage::Inserted => "inserted",
            PipelineStage::Translating => "translating",
            PipelineStage::Exported => "exported",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Progress of the translation loop, reported once per chunk.
#[derive(Debug, Clone)]
pub enum TranslationEvent {
    /// The pending rows were loaded.
    Started { pending: usize },
    /// One chunk was translated and committed.
    Translated {
        chunk_id: i64,
        position: usize,
        pending: usize,
        truncation: Option<TruncationNotice>,
    },
}

/// The main orchestrator for the subtrans pipeline.
pub struct Orchestrator {
    settings: Settings,
    /// Opened on first use so a run without input leaves no database behind.
    store: OnceLock<Arc<dyn ChunkStore>>,
    translator: Arc<dyn Translator>,
    chunker: LineChunker,
    input_pattern: Regex,
}

impl Orchestrator {
    /// Create an orchestrator backed by the SQLite store and the OpenAI translator.
    ///
    /// The SQLite database is not opened until a step needs it.
    pub fn new(settings: Settings) -> Result<Self> {
        let translator: Arc<dyn Translator> =
            Arc::new(OpenAITranslator::from_settings(&settings)?);
        Self::build(settings, OnceLock::new(), translator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        store: Arc<dyn ChunkStore>,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        Self::build(settings, OnceLock::from(store), translator)
    }

    fn build(
        settings: Settings,
        store: OnceLock<Arc<dyn ChunkStore>>,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        let input_pattern = Regex::new(&settings.input.pattern)
            .map_err(|e| SubtransError::Config(format!("Invalid input pattern: {}", e)))?;
        let chunker = LineChunker::new(ChunkingConfig::from(&settings.chunking));

        Ok(Self {
            settings,
            store,
            translator,
            chunker,
            input_pattern,
        })
    }

    /// Get the chunk store, opening the SQLite database on first use.
    pub fn store(&self) -> Result<Arc<dyn ChunkStore>> {
        if let Some(store) = self.store.get() {
            return Ok(store.clone());
        }
        let opened: Arc<dyn ChunkStore> =
            Arc::new(SqliteChunkStore::new(&self.settings.sqlite_path())?);
        Ok(self.store.get_or_init(|| opened).clone())
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Find the lexicographically first subtitle file in the working directory.
    #[instrument(skip(self))]
    pub fn discover_input(&self) -> Result<PathBuf> {
        let dir = self.settings.working_dir();
        let mut candidates: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.input_pattern.is_match(name))
            .collect();

        candidates.sort();

        match candidates.into_iter().next() {
            Some(name) => {
                let path = dir.join(name);
                info!(stage = %PipelineStage::FileDiscovered, "Selected input {:?}", path);
                Ok(path)
            }
            None => Err(SubtransError::NoInputFound {
                dir,
                pattern: self.settings.input.pattern.clone(),
            }),
        }
    }

    /// Chunk a subtitle file and insert every chunk as an untranslated row.
    #[instrument(skip(self))]
    pub async fn ingest(&self, path: &Path) -> Result<IngestResult> {
        let text = std::fs::read_to_string(path)?;

        let chunks = self.chunker.chunk(&text);
        info!(stage = %PipelineStage::Chunked, "Created {} chunks", chunks.len());

        let ids = self.store()?.insert_chunks(&chunks).await?;
        info!(stage = %PipelineStage::Inserted, "Stored {} chunks", ids.len());

        Ok(IngestResult {
            source: path.to_path_buf(),
            chunks_inserted: ids.len(),
            characters: text.chars().count(),
        })
    }

    /// Translate every untranslated row, in id order.
    pub async fn translate_pending(&self) -> Result<TranslateResult> {
        self.translate_pending_with(|_| {}).await
    }

    /// Translate every untranslated row, reporting progress after each commit.
    ///
    /// Each translation is committed before the next request is made. The
    /// first failure aborts the loop; rows committed so far stay translated.
    #[instrument(skip_all)]
    pub async fn translate_pending_with<F>(&self, mut on_event: F) -> Result<TranslateResult>
    where
        F: FnMut(&TranslationEvent),
    {
        let pending = self.store()?.pending().await?;
        let total = pending.len();
        info!(stage = %PipelineStage::Translating, "{} chunks awaiting translation", total);
        on_event(&TranslationEvent::Started { pending: total });

        let mut result = TranslateResult::default();

        for (index, chunk) in pending.into_iter().enumerate() {
            let translated = self
                .translator
                .translate(&chunk.original_text)
                .await
                .map_err(|source| SubtransError::Translation {
                    chunk_id: chunk.id,
                    source,
                })?;

            self.store()?.record_translation(chunk.id, &translated.text).await?;

            if let Some(notice) = translated.truncation {
                info!(
                    chunk_id = chunk.id,
                    original_tokens = notice.original_tokens,
                    kept_tokens = notice.kept_tokens,
                    "Chunk was truncated before translation"
                );
                result.truncated.push(chunk.id);
            }

            result.translated += 1;
            info!("Translated chunk {}", chunk.id);
            on_event(&TranslationEvent::Translated {
                chunk_id: chunk.id,
                position: index + 1,
                pending: total,
                truncation: translated.truncation,
            });
        }

        Ok(result)
    }

    /// Write all translations, separated by a blank line, to the export file.
    #[instrument(skip(self))]
    pub async fn export(&self) -> Result<ExportResult> {
        let translations = self.store()?.translations().await?;
        let path = self.settings.export_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, translations.join("\n\n"))?;

        info!(
            stage = %PipelineStage::Exported,
            "Wrote {} translations to {:?}",
            translations.len(),
            path
        );

        Ok(ExportResult {
            path,
            translations: translations.len(),
        })
    }

    /// Read the first rows for display.
    pub async fn preview(&self) -> Result<Vec<Chunk>> {
        self.store()?.preview(self.settings.export.preview_rows).await
    }

    /// Run the full pipeline on the first subtitle file in the working directory.
    pub async fn run(&self) -> Result<RunResult> {
        self.run_with(|_| {}).await
    }

    /// Run the full pipeline, reporting translation progress.
    #[instrument(skip_all)]
    pub async fn run_with<F>(&self, on_event: F) -> Result<RunResult>
    where
        F: FnMut(&TranslationEvent),
    {
        info!(stage = %PipelineStage::Idle, "Starting pipeline");
        let input = self.discover_input()?;
        let ingest = self.ingest(&input).await?;
        let translate = self.translate_pending_with(on_event).await?;
        self.finish_run(ingest, translate).await
    }

    /// Translate what is pending and export, without reading a new file.
    pub async fn resume_with<F>(&self, on_event: F) -> Result<(TranslateResult, ExportResult)>
    where
        F: FnMut(&TranslationEvent),
    {
        let translate = self.translate_pending_with(on_event).await?;
        let export = self.export().await?;
        info!(stage = %PipelineStage::Done, "Pipeline finished");
        Ok((translate, export))
    }

    async fn finish_run(&self, ingest: IngestResult, translate: TranslateResult) -> Result<RunResult> {
        let export = self.export().await?;
        let preview = self.preview().await?;
        info!(stage = %PipelineStage::Done, "Pipeline finished");

        Ok(RunResult {
            ingest,
            translate,
            export,
            preview,
        })
    }
}

/// Result of ingesting a subtitle file.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// File that was read.
    pub source: PathBuf,
    /// Number of rows inserted.
    pub chunks_inserted: usize,
    /// Characters read from the file.
    pub characters: usize,
}

/// Result of a translation pass.
#[derive(Debug, Clone, Default)]
pub struct TranslateResult {
    /// Rows translated in this pass.
    pub translated: usize,
    /// Ids of rows whose input was truncated to the token budget.
    pub truncated: Vec<i64>,
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub path: PathBuf,
    pub translations: usize,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub ingest: IngestResult,
    pub translate: TranslateResult,
    pub export: ExportResult,
    /// First rows of the store after the run.
    pub preview: Vec<Chunk>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::store::MemoryChunkStore;
    use crate::translation::TranslatedText;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Uppercases its input and records every call; fails on a chosen call.
    #[derive(Default)]
    struct ScriptedTranslator {
        calls: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl ScriptedTranslator {
        fn failing_on(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, text: &str) -> std::result::Result<TranslatedText, GatewayError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            if self.fail_on_call == Some(calls.len()) {
                return Err(GatewayError::Network("connection reset".to_string()));
            }
            Ok(TranslatedText::new(text.trim().to_uppercase()))
        }
    }

    fn settings_in(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.working_dir = dir.to_string_lossy().to_string();
        settings
    }

    fn orchestrator(
        settings: Settings,
        store: Arc<dyn ChunkStore>,
        translator: Arc<dyn Translator>,
    ) -> Orchestrator {
        Orchestrator::with_components(settings, store, translator).unwrap()
    }

    #[test]
    fn test_discover_picks_first_subtitle_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore").unwrap();
        std::fs::write(dir.path().join("zzz_subtitle.txt"), "z").unwrap();
        std::fs::write(dir.path().join("abc_subtitle_with_timecode.txt"), "a").unwrap();
        std::fs::write(dir.path().join("abd_subtitle.txt"), "b").unwrap();

        let orch = orchestrator(
            settings_in(dir.path()),
            Arc::new(MemoryChunkStore::new()),
            Arc::new(ScriptedTranslator::default()),
        );

        let found = orch.discover_input().unwrap();
        assert_eq!(found.file_name().unwrap(), "abc_subtitle_with_timecode.txt");
    }

    #[tokio::test]
    async fn test_no_input_found_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryChunkStore::new());
        let translator = Arc::new(ScriptedTranslator::default());
        let orch = orchestrator(settings_in(dir.path()), store.clone(), translator.clone());

        let err = orch.run().await.unwrap_err();
        assert!(matches!(err, SubtransError::NoInputFound { .. }));
        assert_eq!(store.stats().await.unwrap().total, 0);
        assert!(translator.calls().is_empty());
        assert!(!dir.path().join("translations").exists());
    }

    #[tokio::test]
    async fn test_no_input_leaves_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let orch = Orchestrator::new(settings_in(dir.path())).unwrap();

        let err = orch.run().await.unwrap_err();
        assert!(matches!(err, SubtransError::NoInputFound { .. }));
        assert!(!dir.path().join("text_chunks.db").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_store_opened_on_ingest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vid_subtitle.txt"), "Hello\nWorld\n").unwrap();
        let orch = Orchestrator::new(settings_in(dir.path())).unwrap();

        let input = orch.discover_input().unwrap();
        assert!(!dir.path().join("text_chunks.db").exists());

        let result = orch.ingest(&input).await.unwrap();
        assert_eq!(result.chunks_inserted, 1);
        assert!(dir.path().join("text_chunks.db").exists());
        assert_eq!(orch.store().unwrap().stats().await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vid_subtitle.txt"), "Hello\nWorld\n").unwrap();

        let store = Arc::new(MemoryChunkStore::new());
        let orch = orchestrator(
            settings_in(dir.path()),
            store.clone(),
            Arc::new(ScriptedTranslator::default()),
        );

        let result = orch.run().await.unwrap();
        assert_eq!(result.ingest.chunks_inserted, 1);
        assert_eq!(result.translate.translated, 1);
        assert_eq!(result.export.translations, 1);
        assert_eq!(result.preview.len(), 1);

        let exported =
            std::fs::read_to_string(dir.path().join("translations/translation_results.txt"))
                .unwrap();
        assert_eq!(exported, "HELLO\nWORLD");

        let chunk = &store.all_chunks().await.unwrap()[0];
        assert_eq!(chunk.original_text, "Hello\nWorld\n");
        assert_eq!(chunk.translation_length, Some(11));
    }

    #[tokio::test]
    async fn test_translate_fills_every_row() {
        let store = Arc::new(MemoryChunkStore::new());
        store
            .insert_chunks(&["a".to_string(), "bb".to_string(), "ccc".to_string()])
            .await
            .unwrap();

        let orch = orchestrator(
            Settings::default(),
            store.clone(),
            Arc::new(ScriptedTranslator::default()),
        );

        let mut events = Vec::new();
        let result = orch
            .translate_pending_with(|event| events.push(event.clone()))
            .await
            .unwrap();

        assert_eq!(result.translated, 3);
        assert_eq!(events.len(), 4);
        assert!(store.pending().await.unwrap().is_empty());
        for chunk in store.all_chunks().await.unwrap() {
            let translation = chunk.translation.unwrap();
            assert_eq!(chunk.translation_length, Some(translation.chars().count()));
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_rows() {
        let store = Arc::new(MemoryChunkStore::new());
        let chunks: Vec<String> = (1..=5).map(|i| format!("chunk {}", i)).collect();
        store.insert_chunks(&chunks).await.unwrap();

        let orch = orchestrator(
            Settings::default(),
            store.clone(),
            Arc::new(ScriptedTranslator::failing_on(3)),
        );

        let err = orch.translate_pending().await.unwrap_err();
        assert_eq!(err.failed_chunk_id(), Some(3));
        assert!(err.to_string().contains("chunk 3"));

        let all = store.all_chunks().await.unwrap();
        assert!(all[0].is_translated());
        assert!(all[1].is_translated());
        assert!(all[2..].iter().all(|c| !c.is_translated()));
    }

    #[tokio::test]
    async fn test_rerun_only_translates_null_rows() {
        let store = Arc::new(MemoryChunkStore::new());
        let ids = store
            .insert_chunks(&["one".to_string(), "two".to_string(), "three".to_string()])
            .await
            .unwrap();
        store.record_translation(ids[0], "하나").await.unwrap();

        let translator = Arc::new(ScriptedTranslator::default());
        let orch = orchestrator(Settings::default(), store.clone(), translator.clone());

        orch.translate_pending().await.unwrap();
        assert_eq!(translator.calls(), vec!["two".to_string(), "three".to_string()]);

        orch.translate_pending().await.unwrap();
        assert_eq!(translator.calls().len(), 2);

        let all = store.all_chunks().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].translation.as_deref(), Some("하나"));
    }

    #[tokio::test]
    async fn test_export_joins_with_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryChunkStore::new());
        let ids = store
            .insert_chunks(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        store.record_translation(ids[0], "A").await.unwrap();
        store.record_translation(ids[1], "B").await.unwrap();

        let orch = orchestrator(
            settings_in(dir.path()),
            store,
            Arc::new(ScriptedTranslator::default()),
        );

        let result = orch.export().await.unwrap();
        assert_eq!(result.translations, 2);
        assert_eq!(std::fs::read_to_string(&result.path).unwrap(), "A\n\nB");
    }

    #[tokio::test]
    async fn test_resume_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryChunkStore::new());
        store
            .insert_chunks(&["x".to_string(), "y".to_string()])
            .await
            .unwrap();

        let failing = orchestrator(
            settings_in(dir.path()),
            store.clone(),
            Arc::new(ScriptedTranslator::failing_on(2)),
        );
        assert!(failing.translate_pending().await.is_err());

        let retry = orchestrator(
            settings_in(dir.path()),
            store.clone(),
            Arc::new(ScriptedTranslator::default()),
        );
        let (translate, export) = retry.resume_with(|_| {}).await.unwrap();
        assert_eq!(translate.translated, 1);
        assert_eq!(std::fs::read_to_string(export.path).unwrap(), "X\n\nY");
    }

    #[test]
    fn test_stage_order() {
        assert!(PipelineStage::Idle < PipelineStage::FileDiscovered);
        assert!(PipelineStage::Translating < PipelineStage::Exported);
        assert_eq!(PipelineStage::Done.to_string(), "done");
    }
}
