use crate::Result;

use crate::cli::OutputFormat;
use crate::fetcher::FetchedTranscript;
use crate::sources::CaptionTrack;

pub mod formatters;

pub use formatters::*;

/// Render a fetched transcript in the requested format
pub fn render(transcript: &FetchedTranscript, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(transcript),
        OutputFormat::Json => format_as_json(transcript)?,
        OutputFormat::Srt => format_as_srt(transcript),
        OutputFormat::Vtt => format_as_vtt(transcript),
    };
    Ok(content)
}

/// Print transcript to console
pub fn print_to_console(transcript: &FetchedTranscript, format: OutputFormat) -> Result<()> {
    println!("{}", render(transcript, format)?);
    Ok(())
}

/// Print caption tracks to console
pub fn print_tracks(tracks: &[CaptionTrack], format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(tracks)?,
        _ => format_track_list(tracks),
    };
    println!("{}", content);
    Ok(())
}
