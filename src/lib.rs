//! Transcript Fetch - best-effort caption transcript retrieval for YouTube videos
//!
//! This library lists a video's caption tracks, picks a language (the first listed
//! track, falling back to common English locales) and returns the caption text as
//! a single plain-text string or a classified error.

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod output;
pub mod sources;
pub mod utils;

pub use cli::{Cli, OutputFormat};
pub use config::{Config, ProxyConfig, ProxyCredentials};
pub use fetcher::{candidate_languages, FetchedTranscript, TranscriptFetcher, FALLBACK_LANGUAGES};
pub use sources::{CaptionEntry, CaptionTrack, SourceError, TranscriptSource, VideoId};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Classified outcome of a failed transcript fetch
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Transcripts are disabled for this video.")]
    TranscriptsDisabled,

    #[error("Video is unavailable.")]
    VideoUnavailable,

    #[error("{0}")]
    Unknown(String),
}

impl TranscriptError {
    /// Process exit code used when `--strict-exit` is requested
    pub fn exit_code(&self) -> i32 {
        match self {
            TranscriptError::TranscriptsDisabled => 3,
            TranscriptError::VideoUnavailable => 4,
            TranscriptError::Unknown(_) => 5,
        }
    }
}
