use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_fetch::sources::youtube::YoutubeSource;
use transcript_fetch::{output, Cli, Config, Result, TranscriptError, TranscriptFetcher, VideoId};

/// Printed when no video identifier is given
const MISSING_VIDEO_MESSAGE: &str = "Error: No video URL provided.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the transcript
    let default_filter = if cli.verbose {
        "transcript_fetch=debug,get_transcript=debug"
    } else {
        "transcript_fetch=warn,get_transcript=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.show_config {
        Config::from_env()?.display();
        return Ok(());
    }

    let Some(video) = cli.video.as_deref().and_then(VideoId::new) else {
        println!("{}", MISSING_VIDEO_MESSAGE);
        std::process::exit(1);
    };

    let config = Config::from_env()?;
    let source = match YoutubeSource::new(&config) {
        Ok(source) => source,
        Err(e) => return report(TranscriptError::from(e), cli.strict_exit),
    };
    let fetcher = TranscriptFetcher::new(source);

    tracing::info!("Fetching transcript for: {}", video);

    if cli.list {
        match fetcher.list_tracks(&video).await {
            Ok(tracks) => output::print_tracks(&tracks, cli.format)?,
            Err(e) => return report(e, cli.strict_exit),
        }
        return Ok(());
    }

    match fetcher.fetch_captions(&video).await {
        Ok(transcript) => output::print_to_console(&transcript, cli.format)?,
        Err(e) => return report(e, cli.strict_exit),
    }

    Ok(())
}

/// Print a classified error. Exits 0 unless `--strict-exit` was given.
fn report(err: TranscriptError, strict_exit: bool) -> Result<()> {
    println!("Error: {}", err);
    if strict_exit {
        std::process::exit(err.exit_code());
    }
    Ok(())
}
