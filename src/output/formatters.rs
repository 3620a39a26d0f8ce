use anyhow::Context;

use crate::Result;

use crate::fetcher::FetchedTranscript;
use crate::sources::CaptionTrack;
use crate::utils::format_timestamp;

/// Space-joined caption text
pub fn format_as_text(transcript: &FetchedTranscript) -> String {
    transcript.to_plain_text()
}

pub fn format_as_json(transcript: &FetchedTranscript) -> Result<String> {
    serde_json::to_string_pretty(transcript).context("Failed to serialize transcript")
}

pub fn format_as_srt(transcript: &FetchedTranscript) -> String {
    let mut out = String::new();
    for (index, entry) in transcript.entries.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp(entry.start, ','),
            format_timestamp(entry.end(), ','),
            entry.text
        ));
    }
    out.trim_end().to_string()
}

pub fn format_as_vtt(transcript: &FetchedTranscript) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for entry in &transcript.entries {
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp(entry.start, '.'),
            format_timestamp(entry.end(), '.'),
            entry.text
        ));
    }
    out.trim_end().to_string()
}

/// One line per track: code, name and flags, tab separated
pub fn format_track_list(tracks: &[CaptionTrack]) -> String {
    tracks
        .iter()
        .map(|track| {
            let mut flags = Vec::new();
            if track.is_default {
                flags.push("default");
            }
            if track.is_generated {
                flags.push("auto-generated");
            }
            format!(
                "{}\t{}\t{}",
                track.language_code,
                track.language.as_deref().unwrap_or("-"),
                flags.join(",")
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
