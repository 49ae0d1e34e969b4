//! Subtran - Chunked Subtitle Translation
//!
//! Parses SRT/VTT-like subtitle text into cues, sends fixed-size batches of
//! cue text to a remote translation endpoint with bounded retry, and
//! reassembles cue-aligned output per target language while tracking
//! progress for every file × language job.

pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod subtitle;
pub mod translate;
pub mod workflow;
