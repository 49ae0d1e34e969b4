use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 1024;

/// Lifecycle of one (file, language) job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Requested but not started yet
    Pending,
    Running,
    /// Finished with every chunk translated
    Completed,
    /// Finished, but these chunks fell back to source text
    Partial { failed_chunks: usize },
    Cancelled,
    /// Stopped by a job-level error
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial { .. })
    }
}

/// Published after every progress write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub file: String,
    pub language: String,
    pub progress: u8,
    pub status: JobStatus,
}

/// Point-in-time view of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub language: String,
    pub progress: u8,
    pub status: JobStatus,
    pub result: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct JobEntry {
    progress: u8,
    status: JobStatus,
    result: Option<String>,
    updated_at: DateTime<Utc>,
}

impl Default for JobEntry {
    fn default() -> Self {
        Self {
            progress: 0,
            status: JobStatus::Pending,
            result: None,
            updated_at: Utc::now(),
        }
    }
}

/// Process-wide progress and result cache keyed by file identity and
/// language code.
///
/// Last write wins. Each key is written by a single job run at a time, the
/// lock only makes the map itself safe to share. Entries live until the
/// caller clears them.
pub struct ProgressStore {
    jobs: RwLock<HashMap<String, HashMap<String, JobEntry>>>,
    events: broadcast::Sender<ProgressEvent>,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            jobs: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Receive a `ProgressEvent` for every subsequent progress write
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    fn update<F>(&self, file: &str, language: &str, f: F) -> JobEntry
    where
        F: FnOnce(&mut JobEntry),
    {
        let mut jobs = self.jobs.write();
        let entry = jobs
            .entry(file.to_string())
            .or_default()
            .entry(language.to_string())
            .or_default();
        f(entry);
        entry.updated_at = Utc::now();
        entry.clone()
    }

    fn read<T, F>(&self, file: &str, language: &str, f: F) -> Option<T>
    where
        F: FnOnce(&JobEntry) -> T,
    {
        self.jobs.read().get(file).and_then(|langs| langs.get(language)).map(f)
    }

    /// Set progress (clamped to 100) and notify subscribers
    pub fn set_progress(&self, file: &str, language: &str, progress: u8) {
        let progress = progress.min(100);
        let entry = self.update(file, language, |e| e.progress = progress);

        debug!("Progress {} [{}]: {}%", file, language, progress);
        // No subscribers is fine
        let _ = self.events.send(ProgressEvent {
            file: file.to_string(),
            language: language.to_string(),
            progress,
            status: entry.status,
        });
    }

    pub fn get_progress(&self, file: &str, language: &str) -> u8 {
        self.read(file, language, |e| e.progress).unwrap_or(0)
    }

    pub fn set_result(&self, file: &str, language: &str, text: String) {
        self.update(file, language, |e| e.result = Some(text));
    }

    /// Final translated text, empty until the job has finished
    pub fn get_result(&self, file: &str, language: &str) -> String {
        self.read(file, language, |e| e.result.clone())
            .flatten()
            .unwrap_or_default()
    }

    pub fn set_status(&self, file: &str, language: &str, status: JobStatus) {
        self.update(file, language, |e| e.status = status);
    }

    pub fn get_status(&self, file: &str, language: &str) -> Option<JobStatus> {
        self.read(file, language, |e| e.status)
    }

    /// Discard a job's previous run: progress 0, no result, pending
    pub fn reset_job(&self, file: &str, language: &str) {
        self.update(file, language, |e| {
            e.progress = 0;
            e.status = JobStatus::Pending;
            e.result = None;
        });
    }

    /// Jobs recorded for a file, ordered by language code
    pub fn snapshot(&self, file: &str) -> Vec<JobSnapshot> {
        let jobs = self.jobs.read();
        let mut snapshots: Vec<JobSnapshot> = jobs
            .get(file)
            .map(|langs| {
                langs
                    .iter()
                    .map(|(language, e)| JobSnapshot {
                        language: language.clone(),
                        progress: e.progress,
                        status: e.status,
                        result: e.result.clone(),
                        updated_at: e.updated_at,
                    })
                    .collect()
            })
            .unwrap_or_default();
        snapshots.sort_by(|a, b| a.language.cmp(&b.language));
        snapshots
    }

    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.jobs.read().keys().cloned().collect();
        files.sort();
        files
    }

    /// Drop everything recorded for a file leaving the working set
    pub fn clear_file(&self, file: &str) -> usize {
        self.jobs.write().remove(file).map(|langs| langs.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        self.jobs.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_unknown_keys() {
        let store = ProgressStore::new();
        assert_eq!(store.get_progress("a.srt", "fr"), 0);
        assert_eq!(store.get_result("a.srt", "fr"), "");
        assert_eq!(store.get_status("a.srt", "fr"), None);
    }

    #[test]
    fn test_last_write_wins_per_key() {
        let store = ProgressStore::new();
        store.set_progress("a.srt", "fr", 40);
        store.set_progress("a.srt", "fr", 60);
        store.set_progress("a.srt", "de", 10);
        store.set_result("a.srt", "fr", "one".to_string());
        store.set_result("a.srt", "fr", "two".to_string());

        assert_eq!(store.get_progress("a.srt", "fr"), 60);
        assert_eq!(store.get_progress("a.srt", "de"), 10);
        assert_eq!(store.get_result("a.srt", "fr"), "two");
        assert_eq!(store.get_progress("b.srt", "fr"), 0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let store = ProgressStore::new();
        store.set_progress("a.srt", "fr", 250);
        assert_eq!(store.get_progress("a.srt", "fr"), 100);
    }

    #[test]
    fn test_reset_discards_previous_run() {
        let store = ProgressStore::new();
        store.set_progress("a.srt", "fr", 100);
        store.set_result("a.srt", "fr", "done".to_string());
        store.set_status("a.srt", "fr", JobStatus::Completed);

        store.reset_job("a.srt", "fr");

        assert_eq!(store.get_progress("a.srt", "fr"), 0);
        assert_eq!(store.get_result("a.srt", "fr"), "");
        assert_eq!(store.get_status("a.srt", "fr"), Some(JobStatus::Pending));
    }

    #[test]
    fn test_clear_file_only_touches_that_file() {
        let store = ProgressStore::new();
        store.set_progress("a.srt", "fr", 10);
        store.set_progress("a.srt", "de", 20);
        store.set_progress("b.srt", "fr", 30);

        assert_eq!(store.clear_file("a.srt"), 2);
        assert_eq!(store.files(), vec!["b.srt".to_string()]);
        assert_eq!(store.get_progress("b.srt", "fr"), 30);

        store.clear();
        assert!(store.files().is_empty());
    }

    #[test]
    fn test_snapshot_sorted_by_language() {
        let store = ProgressStore::new();
        store.set_progress("a.srt", "fr", 50);
        store.set_progress("a.srt", "de", 100);
        store.set_status("a.srt", "de", JobStatus::Partial { failed_chunks: 1 });

        let snapshot = store.snapshot("a.srt");
        let languages: Vec<&str> = snapshot.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(languages, vec!["de", "fr"]);
        assert!(snapshot[0].status.is_finished());
        assert_eq!(snapshot[1].progress, 50);
    }

    #[tokio::test]
    async fn test_progress_writes_are_published() {
        let store = ProgressStore::new();
        let mut events = store.subscribe();

        store.set_status("a.srt", "fr", JobStatus::Running);
        store.set_progress("a.srt", "fr", 0);
        store.set_status("a.srt", "fr", JobStatus::Completed);
        store.set_progress("a.srt", "fr", 100);

        let first = events.recv().await.unwrap();
        assert_eq!((first.progress, first.status), (0, JobStatus::Running));
        let second = events.recv().await.unwrap();
        assert_eq!((second.progress, second.status), (100, JobStatus::Completed));
        assert!(events.try_recv().is_err());
    }
}
