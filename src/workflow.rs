use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::{Config, JobConfig};
use crate::error::{Result, SubtranError};
use crate::store::{JobStatus, ProgressStore};
use crate::subtitle::{
    chunk_cues, export_file_name_with_extension, is_supported_subtitle, parse_subtitles, Chunk,
    SubtitleFile,
};
use crate::translate::{TranslationRequest, Translator, TranslatorFactory};

/// Cooperative cancellation, checked between chunks
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A translated document ready to hand off for saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub text: String,
}

/// Percentage of chunks done, rounded half up
pub fn chunk_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Rebuild subtitle text from chunks and their translations.
///
/// Each cue takes the segment at its position in the chunk's translation,
/// split on `separator`. A missing translation or a short split falls back
/// to the cue's source text.
pub fn reassemble(chunks: &[Chunk<'_>], translations: &[Option<String>], separator: &str) -> String {
    chunks
        .iter()
        .flat_map(|chunk| {
            let segments: Vec<&str> = translations
                .get(chunk.position)
                .and_then(|t| t.as_deref())
                .map(|t| t.split(separator).collect())
                .unwrap_or_default();

            chunk.cues.iter().enumerate().map(move |(i, cue)| {
                let text = segments.get(i).copied().unwrap_or(cue.text.as_str());
                cue.render_with(text)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Workflow {
    job: JobConfig,
    translator: Arc<dyn Translator>,
    store: Arc<ProgressStore>,
    file_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Workflow {
    /// Validate the configuration and connect to the configured endpoint
    pub fn new(config: Config, store: Arc<ProgressStore>) -> Result<Self> {
        config.validate()?;
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        Ok(Self::with_translator(config.job, translator, store))
    }

    pub fn with_translator(
        job: JobConfig,
        translator: Arc<dyn Translator>,
        store: Arc<ProgressStore>,
    ) -> Self {
        Self {
            job,
            translator,
            store,
            file_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    fn file_lock(&self, file: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.file_locks
            .lock()
            .entry(file.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop a file that leaves the working set: its store entries and, when
    /// no run holds it, its lock
    pub fn remove_file(&self, id: &str) -> usize {
        let mut locks = self.file_locks.lock();
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
        self.store.clear_file(id)
    }

    /// Drop the whole working set
    pub fn clear_files(&self) {
        self.file_locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
        self.store.clear();
    }

    /// Translate one file into each language, one language after another.
    ///
    /// Outcomes land in the store only. Job-level errors are logged and the
    /// run stops, leaving whatever was already written.
    pub async fn run_job(&self, file: &SubtitleFile, languages: &[String]) {
        self.run_job_with_cancel(file, languages, &CancelFlag::new()).await
    }

    pub async fn run_job_with_cancel(
        &self,
        file: &SubtitleFile,
        languages: &[String],
        cancel: &CancelFlag,
    ) {
        if languages.is_empty() {
            return;
        }

        // A re-run of the same file waits for the one in flight
        let lock = self.file_lock(&file.id);
        let _guard = lock.lock().await;

        let span = info_span!("job", file = %file.id, run = %Uuid::new_v4());
        match self.try_run_job(file, languages, cancel).instrument(span).await {
            Ok(()) => {}
            Err(SubtranError::Cancelled(at)) => warn!("Translation job cancelled: {}", at),
            Err(e) => error!("Translation job for {} stopped: {}", file.id, e),
        }
    }

    async fn try_run_job(
        &self,
        file: &SubtitleFile,
        languages: &[String],
        cancel: &CancelFlag,
    ) -> Result<()> {
        let cues = parse_subtitles(&file.content);
        let chunks = chunk_cues(&cues, self.job.chunk_size);
        info!(
            "Parsed {} cues into {} chunks, translating to {}",
            cues.len(),
            chunks.len(),
            languages.join(", ")
        );

        for language in languages {
            self.store.reset_job(&file.id, language);
        }

        for language in languages {
            if let Err(e) = self.translate_language(&file.id, &chunks, language, cancel).await {
                if !matches!(e, SubtranError::Cancelled(_)) {
                    self.store.set_status(&file.id, language, JobStatus::Failed);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    async fn translate_language(
        &self,
        file: &str,
        chunks: &[Chunk<'_>],
        language: &str,
        cancel: &CancelFlag,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(SubtranError::Cancelled(format!("{} [{}] before start", file, language)));
        }

        info!("Translating {} to {}", file, language);
        self.store.set_status(file, language, JobStatus::Running);
        self.store.set_progress(file, language, 0);

        let total = chunks.len();
        let mut translations: Vec<Option<String>> = vec![None; total];
        let mut failed_chunks = 0;

        for chunk in chunks {
            if cancel.is_cancelled() {
                self.store.set_status(file, language, JobStatus::Cancelled);
                return Err(SubtranError::Cancelled(format!(
                    "{} [{}] at chunk {}/{}",
                    file,
                    language,
                    chunk.position + 1,
                    total
                )));
            }

            let request = TranslationRequest::new(language, chunk.payload_text(&self.job.separator));
            match self.translator.translate(&request).await {
                Ok(text) => {
                    translations[chunk.position] = Some(text);
                    self.store.set_progress(file, language, chunk_progress(chunk.position + 1, total));
                }
                Err(e) if e.is_terminal() => {
                    // Keep going: this chunk falls back to source text
                    failed_chunks += 1;
                    error!(
                        "Translation failed for {} chunk {}/{}: {}",
                        language,
                        chunk.position + 1,
                        total,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let document = reassemble(chunks, &translations, &self.job.separator);
        self.store.set_result(file, language, document);

        let status = if failed_chunks == 0 {
            JobStatus::Completed
        } else {
            warn!(
                "{} [{}] finished with {}/{} chunks left untranslated",
                file, language, failed_chunks, total
            );
            JobStatus::Partial { failed_chunks }
        };
        self.store.set_status(file, language, status);
        self.store.set_progress(file, language, 100);

        info!("Completed {} [{}]", file, language);
        Ok(())
    }

    /// Run several files at once; each file stays sequential inside
    pub async fn run_files(&self, files: &[SubtitleFile], languages: &[String], cancel: &CancelFlag) {
        join_all(
            files
                .iter()
                .map(|file| self.run_job_with_cancel(file, languages, cancel)),
        )
        .await;
    }

    /// Finished document for a (file, language), named for download
    pub fn export_payload(&self, file: &SubtitleFile, language: &str) -> Option<ExportPayload> {
        let finished = self
            .store
            .get_status(&file.id, language)
            .is_some_and(|status| status.is_finished());
        if !finished {
            return None;
        }
        Some(ExportPayload {
            file_name: export_file_name_with_extension(&file.name, language, &self.job.export_extension),
            text: self.store.get_result(&file.id, language),
        })
    }

    /// Write every available export payload for a file into `output_dir`
    pub async fn write_exports(
        &self,
        file: &SubtitleFile,
        languages: &[String],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir).await?;

        let mut written = Vec::new();
        for language in languages {
            match self.export_payload(file, language) {
                Some(payload) => {
                    let path = output_dir.join(&payload.file_name);
                    fs::write(&path, payload.text).await?;
                    info!("Wrote {}", path.display());
                    written.push(path);
                }
                None => warn!("No translation available for {} [{}]", file.id, language),
            }
        }
        Ok(written)
    }

    /// Run the planned files and write their exports. Two files that would
    /// export to the same path are rejected before anything runs.
    async fn run_planned(
        &self,
        planned: Vec<(SubtitleFile, PathBuf)>,
        languages: &[String],
        cancel: &CancelFlag,
    ) -> Result<Vec<PathBuf>> {
        let mut targets: HashMap<PathBuf, &str> = HashMap::new();
        for (file, dir) in &planned {
            // Same directory and same name means every export collides
            if let Some(other) = targets.insert(dir.join(&file.name), &file.id) {
                return Err(SubtranError::Config(format!(
                    "{} and {} would both export to {}",
                    other,
                    file.id,
                    dir.display()
                )));
            }
        }

        let files: Vec<SubtitleFile> = planned.iter().map(|(file, _)| file.clone()).collect();
        self.run_files(&files, languages, cancel).await;

        let mut written = Vec::new();
        for (file, dir) in &planned {
            written.extend(self.write_exports(file, languages, dir).await?);
        }
        Ok(written)
    }

    /// Translate subtitle files and write the results next to each input,
    /// or into `output_dir` when given
    pub async fn process_files<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        languages: &[String],
        output_dir: Option<&Path>,
        cancel: &CancelFlag,
    ) -> Result<Vec<PathBuf>> {
        let mut planned = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            match SubtitleFile::from_path(input).await {
                Ok(file) => {
                    let dir = match output_dir {
                        Some(dir) => dir.to_path_buf(),
                        None => input
                            .parent()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| PathBuf::from(".")),
                    };
                    planned.push((file, dir));
                }
                Err(e) => warn!("Skipping {}: {}", input.display(), e),
            }
        }

        self.run_planned(planned, languages, cancel).await
    }

    /// Translate every `.srt`/`.vtt` file under a directory. Files are
    /// identified by their path relative to `input_dir`, and `output_dir`
    /// mirrors the input's subdirectories.
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        languages: &[String],
        output_dir: Option<&Path>,
        cancel: &CancelFlag,
    ) -> Result<Vec<PathBuf>> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubtranError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let inputs: Vec<PathBuf> = WalkDir::new(input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported_subtitle(e.path()))
            .map(|e| e.into_path())
            .collect();

        info!("Found {} subtitle files to translate", inputs.len());

        let mut planned = Vec::new();
        for input in &inputs {
            let relative = input.strip_prefix(input_dir).unwrap_or(input);
            match SubtitleFile::from_path(input).await {
                Ok(file) => {
                    let parent = input.parent().unwrap_or(input_dir);
                    let dir = match output_dir {
                        Some(dir) => dir.join(relative.parent().unwrap_or(Path::new(""))),
                        None => parent.to_path_buf(),
                    };
                    planned.push((file.with_id(relative.display().to_string()), dir));
                }
                Err(e) => warn!("Skipping {}: {}", input.display(), e),
            }
        }

        self.run_planned(planned, languages, cancel).await
    }
}
