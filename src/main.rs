//! legenda - subtitles for a video file
//!
//! Extracts the audio track with ffmpeg, transcribes it with whisper, and
//! writes an SRT file whose cues are spread uniformly over the video.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use legenda::cli::{Args, Commands};
use legenda::config::Config;
use legenda::error::LegendaError;
use legenda::setup::SetupManager;
use legenda::workflow::{subtitles_from_transcript, Workflow};

const DEFAULT_CONFIG_FILE: &str = "legenda.toml";
const MISSING_FILE_MESSAGE: &str = "File not found. Check the path and try again.";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::from_file(DEFAULT_CONFIG_FILE)?,
        None => Config::default(),
    };

    let command = args.command.unwrap_or(Commands::Process { input: None });

    // A missing video ends the run before anything is written, log files included
    let video = match &command {
        Commands::Process { input } => {
            let input = match input {
                Some(path) => path.clone(),
                None => prompt_for_video().await?,
            };
            match existing_input(input) {
                Some(path) => Some(path),
                None => {
                    println!("{}", MISSING_FILE_MESSAGE);
                    return Ok(());
                }
            }
        }
        _ => None,
    };

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose, Path::new(&config.project.data_dir))?;
    info!("Starting legenda");

    match command {
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
        Commands::Models { download } => {
            let setup_manager = SetupManager::new(&config.project.data_dir)?;
            let models = setup_manager.available_models();
            let models_dir = setup_manager.models_dir();

            println!("\nAvailable Whisper Models:");
            println!("{:<15} {:<25} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
            println!("{}", "-".repeat(65));
            for model in &models {
                let status = if models_dir.join(&model.filename).exists() {
                    "Downloaded"
                } else {
                    "Missing"
                };
                println!("{:<15} {:<25} {:<10.1} {:<10}",
                    model.name, model.filename, model.size_mb, status);
            }

            if download {
                info!("Downloading all missing models...");
                for model in &models {
                    setup_manager.download_model(model).await?;
                }
                info!("All models downloaded successfully");
            }
        }
        Commands::Srt { input, duration, output } => {
            match subtitles_from_transcript(&input, duration, &output).await {
                Ok(0) => println!("Transcript is empty; subtitle file skipped."),
                Ok(_) => println!("Subtitle file saved as {}", output.display()),
                Err(LegendaError::FileNotFound(_)) => println!("{}", MISSING_FILE_MESSAGE),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Process { .. } => {
            let Some(input) = video else {
                anyhow::bail!("No video to process");
            };

            let workflow = build_workflow(&mut config).await?;
            match workflow.process_single_file(&input).await {
                Ok(outcome) if outcome.subtitle_written => {
                    println!("Subtitle file saved as {}", outcome.layout.subtitle_path.display());
                }
                Ok(_) => println!("No speech transcribed; subtitle file skipped."),
                Err(LegendaError::FileNotFound(_)) => println!("{}", MISSING_FILE_MESSAGE),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Batch { input_dir } => {
            let workflow = build_workflow(&mut config).await?;
            let outcomes = workflow.process_directory(&input_dir).await?;
            for outcome in &outcomes {
                if outcome.subtitle_written {
                    println!("Subtitle file saved as {}", outcome.layout.subtitle_path.display());
                } else {
                    println!("No speech transcribed in {}", outcome.layout.name);
                }
            }
            println!("Processed {} video files", outcomes.len());
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = build_workflow(&mut config).await?;
            let duration = workflow.extract_audio(&input, &output).await?;
            println!("Audio saved as {} ({:.3}s)", output.display(), duration);
        }
        Commands::Transcribe { input, output, language } => {
            info!("Transcribing audio: {}", input.display());
            if language.is_some() {
                config.transcriber.language = language;
            }
            let workflow = build_workflow(&mut config).await?;
            workflow.transcribe_audio(&input, &output).await?;
            println!("Transcript saved as {}", output.display());
        }
    }

    info!("legenda completed successfully");
    Ok(())
}

/// Make the model available, then wire the external tools together
async fn build_workflow(config: &mut Config) -> Result<Workflow> {
    let setup_manager = SetupManager::new(&config.project.data_dir)?;
    setup_manager.ensure_model(config).await?;

    Ok(Workflow::from_config(config.clone()).await?)
}

/// The path back when it exists, `None` when the user should be told it is missing
fn existing_input(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Ask for the video path on stdin
async fn prompt_for_video() -> Result<PathBuf> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter the path to the video file: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    // Terminals quote dragged-in paths
    let path = line.trim().trim_matches(|c: char| c == '"' || c == '\'');
    Ok(PathBuf::from(path))
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool, data_dir: &Path) -> Result<WorkerGuard> {
    let log_dir = data_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "legenda.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output stays terse; the file gets source locations
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("legenda.log").display());

    Ok(guard)
}
