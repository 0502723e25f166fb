// Speech-to-text over external command-line tools
//
// Implementations are selected through the factory:
// - WhisperCpp: whisper.cpp `whisper-cli`
// - OpenAI: OpenAI Whisper Python `whisper`
//
// Each backend parses its own JSON output and maps it to `Transcription`
// through a `TranscriptionMapper`. Segment timing reported by the tools is
// not kept; cue timing is allocated from the media duration instead.

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{TranscriberConfig, TranscriberImplementation};
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe audio file to one contiguous text
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription>;

    /// Check that the underlying tool can be executed
    async fn check_availability(&self) -> Result<()>;

    /// Human readable backend name
    fn name(&self) -> &'static str;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the transcriber selected by the configuration
    pub fn create_transcriber(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        match config.implementation {
            TranscriberImplementation::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config))
            }
            TranscriberImplementation::OpenAI => {
                Box::new(openai::OpenAITranscriber::new(config))
            }
        }
    }
}
