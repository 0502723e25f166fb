use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{LegendaError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub media: MediaConfig,
    pub project: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Which speech-to-text tool to drive
    pub implementation: TranscriberImplementation,
    /// Path to transcriber binary (e.g., whisper-cli)
    pub binary_path: String,
    /// Model name ("base", "small", ...) or path to a model file
    pub model: String,
    /// Source language hint; auto-detected when unset
    pub language: Option<String>,
    /// Worker threads passed to the transcriber; tool default when unset
    pub threads: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriberImplementation {
    /// whisper.cpp command-line tool (`whisper-cli`)
    WhisperCpp,
    /// OpenAI Whisper Python command-line tool (`whisper`)
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Sample rate of the extracted audio in Hz
    pub sample_rate: u32,
    /// Channel count of the extracted audio
    pub channels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// File name of the temporary audio track inside the project folder
    pub audio_file_name: String,
    /// Keep the extracted audio instead of deleting it after transcription
    pub keep_audio: bool,
    /// Directory holding downloaded models and logs
    pub data_dir: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            implementation: TranscriberImplementation::WhisperCpp,
            binary_path: "whisper-cli".to_string(),
            model: "base".to_string(),
            language: None,
            threads: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            audio_file_name: "audio.wav".to_string(),
            keep_audio: false,
            data_dir: ".legenda".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LegendaError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| LegendaError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LegendaError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| LegendaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
