use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "get-transcript",
    about = "Fetch the caption transcript of a YouTube video",
    version,
    long_about = "Fetches a video's caption transcript through an optional rotating proxy and prints it. \
The video's first listed caption language is preferred, falling back to en, en-US, en-GB and en-IN. \
Proxy credentials are read from PROXY_UNAME and PROXY_PASS."
)]
pub struct Cli {
    /// Video ID or URL (youtube.com/watch, youtu.be, embed, shorts)
    #[arg(value_name = "VIDEO")]
    pub video: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// List available caption tracks instead of fetching a transcript
    #[arg(short, long)]
    pub list: bool,

    /// Show the proxy configuration read from the environment and exit
    #[arg(long)]
    pub show_config: bool,

    /// Exit with a distinct non-zero code for each error kind
    #[arg(long)]
    pub strict_exit: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with timestamps
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
        }
    }
}
