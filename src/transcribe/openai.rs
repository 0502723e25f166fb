// OpenAI Whisper Python implementation
// Drives the `whisper` command installed with the openai-whisper package

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{LegendaError, Result};
use super::{TranscriberTrait, Transcription, TranscriptionMapper, check_tool, read_json_output, run_transcriber};

/// OpenAI Whisper specific JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub language: Option<String>,
}

/// Mapper for OpenAI Whisper format
pub struct OpenAIWhisperMapper;

impl TranscriptionMapper<OpenAIWhisperOutput> for OpenAIWhisperMapper {
    fn to_transcription(whisper_output: OpenAIWhisperOutput) -> Result<Transcription> {
        Ok(Transcription {
            text: whisper_output.text,
            language: whisper_output.language,
        })
    }
}

/// OpenAI Whisper implementation
pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json");

        if let Some(lang) = &self.config.language {
            cmd.arg("--language").arg(lang);
        }
        if let Some(threads) = self.config.threads {
            cmd.arg("--threads").arg(threads.to_string());
        }

        cmd
    }
}

#[async_trait]
impl TranscriberTrait for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        info!("Transcribing {} with OpenAI Whisper model {}", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| LegendaError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        run_transcriber(self.build_command(audio_path, output_dir), "whisper").await?;

        // whisper names its output after the input file
        let audio_stem = audio_path.file_stem()
            .ok_or_else(|| LegendaError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let whisper_output: OpenAIWhisperOutput = read_json_output(&json_file).await?;
        let transcription = OpenAIWhisperMapper::to_transcription(whisper_output)?;

        info!("Transcription completed: {} characters", transcription.text.len());
        Ok(transcription)
    }

    async fn check_availability(&self) -> Result<()> {
        check_tool(&self.config.binary_path).await.map_err(|e| {
            LegendaError::Transcriber(format!(
                "OpenAI Whisper not available. Install with: pip install openai-whisper\nError: {}",
                e
            ))
        })?;
        info!("OpenAI Whisper command-line tool is available");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}
