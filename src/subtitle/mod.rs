// Subtitle text model
//
// - Parser: raw SRT/VTT-like text into ordered cues
// - Chunker: fixed-size, order-preserving batches of cues
// - Rendering: cue blocks back into subtitle text

pub mod chunker;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

pub use chunker::*;
pub use parser::*;

use crate::error::{Result, SubtranError};

/// Extensions accepted as subtitle input
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["srt", "vtt"];

/// Marks a line as a cue's time range
pub const TIMING_SEPARATOR: &str = "-->";

/// One timed subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    /// Sequence number from the source file, carried through unchanged
    pub index: u64,
    /// Time range line, verbatim
    pub time: String,
    /// Source text, lines joined with single spaces
    pub text: String,
}

impl Cue {
    pub fn new(index: u64, time: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            time: time.into(),
            text: text.into(),
        }
    }

    /// Render as `index\ntime\ntext\n`
    pub fn render_with(&self, text: &str) -> String {
        format!("{}\n{}\n{}\n", self.index, self.time, text)
    }
}

/// Join rendered cue blocks with a blank line between them
pub fn render_cues(cues: &[Cue]) -> String {
    cues.iter()
        .map(|cue| cue.render_with(&cue.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A subtitle file in the working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleFile {
    /// Job identity in the store; unique within a working set
    pub id: String,
    /// Bare file name, used for display and export naming
    pub name: String,
    pub content: String,
}

impl SubtitleFile {
    /// A file whose identity is its name
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            content: content.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Read a `.srt`/`.vtt` file from disk
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SubtranError::FileNotFound(path.display().to_string()));
        }
        if !is_supported_subtitle(path) {
            return Err(SubtranError::UnsupportedFormat(path.display().to_string()));
        }

        let name = path
            .file_name()
            .ok_or_else(|| SubtranError::FileNotFound(path.display().to_string()))?
            .to_string_lossy()
            .to_string();
        let content = fs::read_to_string(path).await?;

        Ok(Self {
            id: path.display().to_string(),
            name,
            content,
        })
    }
}

/// Whether the path carries one of the accepted subtitle extensions
pub fn is_supported_subtitle<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Name of the exported payload: `translated-{file_name}-{lang}.srt`
pub fn export_file_name(file_name: &str, language: &str) -> String {
    export_file_name_with_extension(file_name, language, "srt")
}

pub fn export_file_name_with_extension(file_name: &str, language: &str, extension: &str) -> String {
    format!("translated-{}-{}.{}", file_name, language, extension)
}
