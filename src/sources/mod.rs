use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod youtube;

use crate::TranscriptError;

/// Caller-supplied video identifier or URL. Only guaranteed to be non-empty;
/// sources decide how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Returns `None` for empty or whitespace-only input
    pub fn new(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One caption track available for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code such as `en` or `pt-BR`
    pub language_code: String,

    /// Human readable language name, if the source provides one
    pub language: Option<String>,

    /// Whether the source flags this track as the video's default
    pub is_default: bool,

    /// Whether the track was produced by speech recognition
    pub is_generated: bool,
}

impl CaptionTrack {
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            language: None,
            is_default: false,
            is_generated: false,
        }
    }
}

/// A single caption fragment with timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Failures raised by a transcript source
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Video {0} is no longer available")]
    VideoUnavailable(String),

    #[error("No transcript found for video {video_id} in any of the requested languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("YouTube is blocking requests for video {0} from this IP address")]
    RequestBlocked(String),

    #[error("Video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("Could not get past the cookie consent page for video {0}")]
    ConsentRequired(String),

    #[error("Captions for video {0} require a PO token")]
    PoTokenRequired(String),

    #[error("Could not parse the YouTube response for video {video_id}: {detail}")]
    Unparsable { video_id: String, detail: String },

    #[error("HTTP {status} while requesting {url}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<SourceError> for TranscriptError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::TranscriptsDisabled(_) => TranscriptError::TranscriptsDisabled,
            SourceError::VideoUnavailable(_) => TranscriptError::VideoUnavailable,
            other => TranscriptError::Unknown(other.to_string()),
        }
    }
}

/// Collaborator that lists caption tracks and downloads caption entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// List the caption tracks of a video, in the order the source reports them
    async fn list_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>, SourceError>;

    /// Fetch the entries of the first track matching one of `languages`, tried in order
    async fn fetch_entries(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<Vec<CaptionEntry>, SourceError>;
}
