//! Best-effort transcript retrieval.
//!
//! The first caption track a source lists decides the preferred language. The
//! transcript is then requested for that language followed by a fixed list of
//! English variants, and every failure comes back as a [`TranscriptError`].

use serde::{Deserialize, Serialize};

use crate::sources::{CaptionEntry, CaptionTrack, TranscriptSource, VideoId};
use crate::utils::format_duration;
use crate::TranscriptError;

/// Languages tried after the preferred one, in order
pub const FALLBACK_LANGUAGES: [&str; 4] = ["en", "en-US", "en-GB", "en-IN"];

/// Candidate list for a fetch: the preferred language, then the fallbacks.
/// Duplicates are kept.
pub fn candidate_languages(preferred: &str) -> Vec<String> {
    let mut languages = Vec::with_capacity(1 + FALLBACK_LANGUAGES.len());
    languages.push(preferred.to_string());
    languages.extend(FALLBACK_LANGUAGES.iter().map(|code| code.to_string()));
    languages
}

/// Caption entries of a fetched transcript plus the languages that were asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video_id: VideoId,
    pub languages: Vec<String>,
    pub entries: Vec<CaptionEntry>,
}

impl FetchedTranscript {
    /// Entry texts joined by single spaces, in caption order
    pub fn to_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// End time of the last entry, in seconds
    pub fn duration(&self) -> f64 {
        self.entries.iter().map(CaptionEntry::end).fold(0.0, f64::max)
    }
}

/// Fetches transcripts through a [`TranscriptSource`]. Holds no state besides
/// the source, so one fetcher can serve concurrent calls.
pub struct TranscriptFetcher<S> {
    source: S,
}

impl<S: TranscriptSource> TranscriptFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Plain-text transcript of `video`
    pub async fn fetch_transcript(&self, video: &VideoId) -> Result<String, TranscriptError> {
        let transcript = self.fetch_captions(video).await?;
        Ok(transcript.to_plain_text())
    }

    /// Caption tracks of `video`, in the order the source lists them
    pub async fn list_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>, TranscriptError> {
        Ok(self.source.list_tracks(video).await?)
    }

    /// Structured transcript of `video`, keeping entry timings
    pub async fn fetch_captions(&self, video: &VideoId) -> Result<FetchedTranscript, TranscriptError> {
        let tracks = self.list_tracks(video).await?;

        // Upstream order decides; the is_default flag is not consulted.
        let preferred = tracks.first().ok_or_else(|| {
            TranscriptError::Unknown(format!("no caption tracks available for video {}", video))
        })?;

        let languages = candidate_languages(&preferred.language_code);
        tracing::debug!("Requesting {} captions in {:?}", video, languages);

        let entries = self.source.fetch_entries(video, &languages).await?;

        let transcript = FetchedTranscript {
            video_id: video.clone(),
            languages,
            entries,
        };
        tracing::debug!(
            "Fetched {} caption entries spanning {}",
            transcript.entries.len(),
            format_duration(transcript.duration())
        );

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockTranscriptSource, SourceError};

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ").unwrap()
    }

    fn tracks(codes: &[&str]) -> Vec<CaptionTrack> {
        codes.iter().map(|code| CaptionTrack::new(*code)).collect()
    }

    fn hello_world() -> Vec<CaptionEntry> {
        vec![
            CaptionEntry::new("Hello", 0.0, 1.5),
            CaptionEntry::new("world", 1.5, 2.0),
        ]
    }

    #[test]
    fn test_candidate_languages() {
        assert_eq!(
            candidate_languages("fr"),
            vec!["fr", "en", "en-US", "en-GB", "en-IN"]
        );
    }

    #[test]
    fn test_candidate_languages_keeps_duplicates() {
        assert_eq!(
            candidate_languages("en"),
            vec!["en", "en", "en-US", "en-GB", "en-IN"]
        );
    }

    #[test]
    fn test_first_listed_track_is_preferred() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_list_tracks()
            .times(1)
            .returning(|_| Ok(tracks(&["fr", "de"])));
        source
            .expect_fetch_entries()
            .withf(|_, languages| {
                languages.iter().map(String::as_str).collect::<Vec<_>>()
                    == vec!["fr", "en", "en-US", "en-GB", "en-IN"]
            })
            .times(1)
            .returning(|_, _| Ok(hello_world()));

        let fetcher = TranscriptFetcher::new(source);
        let text = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_default_flag_does_not_reorder() {
        let mut listed = tracks(&["es", "en"]);
        listed[1].is_default = true;

        let mut source = MockTranscriptSource::new();
        source.expect_list_tracks().returning(move |_| Ok(listed.clone()));
        source
            .expect_fetch_entries()
            .withf(|_, languages| languages.first().map(String::as_str) == Some("es"))
            .returning(|_, _| Ok(hello_world()));

        let fetcher = TranscriptFetcher::new(source);
        let captions = tokio_test::block_on(fetcher.fetch_captions(&video())).unwrap();
        assert_eq!(captions.languages[0], "es");
    }

    #[test]
    fn test_transcripts_disabled_skips_fetch() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_list_tracks()
            .returning(|v| Err(SourceError::TranscriptsDisabled(v.to_string())));
        source.expect_fetch_entries().never();

        let fetcher = TranscriptFetcher::new(source);
        let err = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap_err();
        assert_eq!(err, TranscriptError::TranscriptsDisabled);
    }

    #[test]
    fn test_video_unavailable_during_discovery() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_list_tracks()
            .returning(|v| Err(SourceError::VideoUnavailable(v.to_string())));
        source.expect_fetch_entries().never();

        let fetcher = TranscriptFetcher::new(source);
        let err = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap_err();
        assert_eq!(err, TranscriptError::VideoUnavailable);
    }

    #[test]
    fn test_other_discovery_failures_are_wrapped() {
        let mut source = MockTranscriptSource::new();
        source.expect_list_tracks().returning(|v| {
            Err(SourceError::RequestBlocked(v.to_string()))
        });
        source.expect_fetch_entries().never();

        let fetcher = TranscriptFetcher::new(source);
        let err = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap_err();
        assert_eq!(
            err,
            TranscriptError::Unknown(
                "YouTube is blocking requests for video dQw4w9WgXcQ from this IP address".to_string()
            )
        );
    }

    #[test]
    fn test_empty_track_list() {
        let mut source = MockTranscriptSource::new();
        source.expect_list_tracks().returning(|_| Ok(Vec::new()));
        source.expect_fetch_entries().never();

        let fetcher = TranscriptFetcher::new(source);
        let err = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap_err();
        assert!(matches!(err, TranscriptError::Unknown(ref m) if m.contains("no caption tracks")));
    }

    #[test]
    fn test_fetch_failures_use_same_mapping() {
        let mut source = MockTranscriptSource::new();
        source.expect_list_tracks().returning(|_| Ok(tracks(&["ja"])));
        source
            .expect_fetch_entries()
            .returning(|v, languages| {
                Err(SourceError::NoTranscriptFound {
                    video_id: v.to_string(),
                    languages: languages.to_vec(),
                })
            });

        let fetcher = TranscriptFetcher::new(source);
        match tokio_test::block_on(fetcher.fetch_transcript(&video())) {
            Err(TranscriptError::Unknown(message)) => {
                assert!(message.contains("dQw4w9WgXcQ"));
                assert!(message.contains("en-IN"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_disabled_after_listing() {
        let mut source = MockTranscriptSource::new();
        source.expect_list_tracks().returning(|_| Ok(tracks(&["en"])));
        source
            .expect_fetch_entries()
            .returning(|v, _| Err(SourceError::TranscriptsDisabled(v.to_string())));

        let fetcher = TranscriptFetcher::new(source);
        let err = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap_err();
        assert_eq!(err, TranscriptError::TranscriptsDisabled);
    }

    #[test]
    fn test_repeated_fetches_are_identical() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_list_tracks()
            .times(2)
            .returning(|_| Ok(tracks(&["en"])));
        source
            .expect_fetch_entries()
            .times(2)
            .returning(|_, _| Ok(hello_world()));

        let fetcher = TranscriptFetcher::new(source);
        let first = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap();
        let second = tokio_test::block_on(fetcher.fetch_transcript(&video())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_plain_text_keeps_every_word_in_order() {
        let transcript = FetchedTranscript {
            video_id: video(),
            languages: candidate_languages("en"),
            entries: vec![
                CaptionEntry::new("we're no strangers", 0.0, 2.0),
                CaptionEntry::new("to love", 2.0, 1.0),
            ],
        };
        assert_eq!(transcript.to_plain_text(), "we're no strangers to love");
        assert_eq!(transcript.duration(), 3.0);
    }
}
