use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Defaults to `process`, asking for the video path
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate subtitles for a single video file
    Process {
        /// Input video file; asked for interactively when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Generate subtitles for every video file in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe audio to a plain text transcript
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Build an SRT file from a transcript and a total duration
    Srt {
        /// Input transcript file
        #[arg(short, long)]
        input: PathBuf,

        /// Total duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List available whisper.cpp models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "legenda.toml")]
        output: PathBuf,
    },
}
