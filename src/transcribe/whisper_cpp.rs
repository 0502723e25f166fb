use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{LegendaError, Result};
use super::{TranscriberTrait, Transcription, TranscriptionMapper, check_tool, read_json_output, run_transcriber};

// Structs for parsing whisper.cpp JSON output (`-oj`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: Option<WhisperCppResult>,
    #[serde(default)]
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub text: String,
}

/// Mapper for Whisper.cpp format
pub struct WhisperCppMapper;

impl TranscriptionMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_transcription(whisper_output: WhisperCppOutput) -> Result<Transcription> {
        // Segment texts carry their own leading spaces
        let text = whisper_output
            .transcription
            .iter()
            .map(|seg| seg.text.as_str())
            .collect::<String>();

        Ok(Transcription {
            text,
            language: whisper_output.result.and_then(|r| r.language),
        })
    }
}

/// Transcriber driving the whisper.cpp command-line tool
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_base: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("-m").arg(&self.config.model)
            .arg("-f").arg(audio_path)
            .arg("-oj")
            .arg("-of").arg(output_base)
            // whisper-cli assumes English unless told otherwise
            .arg("-l").arg(self.config.language.as_deref().unwrap_or("auto"));

        if let Some(threads) = self.config.threads {
            cmd.arg("-t").arg(threads.to_string());
        }

        cmd
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        info!("Transcribing {} with whisper.cpp model {}", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| LegendaError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_base = temp_dir.path().join("transcript");

        run_transcriber(self.build_command(audio_path, &output_base), "whisper.cpp").await?;

        let whisper_output: WhisperCppOutput =
            read_json_output(output_base.with_extension("json")).await?;
        let transcription = WhisperCppMapper::to_transcription(whisper_output)?;

        info!(
            "Transcription completed: {} characters, language {}",
            transcription.text.len(),
            transcription.language.as_deref().unwrap_or("unknown")
        );
        Ok(transcription)
    }

    async fn check_availability(&self) -> Result<()> {
        check_tool(&self.config.binary_path).await?;
        info!("whisper.cpp is available");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "whisper.cpp"
    }
}
