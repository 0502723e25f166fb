use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{LegendaError, Result};
use super::{first_line_of, parse_duration_output, MediaCommandBuilder, MediaProcessorTrait};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<f64> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        self.command_builder
            .extract_audio(video_path, audio_path, self.config.sample_rate, self.config.channels)
            .execute()
            .await?;

        let duration = self.probe_duration(video_path).await?;

        info!("Audio extraction completed ({:.3}s of media)", duration);
        Ok(duration)
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        debug!("Probing duration of {}", media_path.display());

        let stdout = self.command_builder
            .probe_duration(media_path)
            .execute_capture()
            .await?;

        parse_duration_output(&stdout)
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| LegendaError::Media(format!("Media processor not found: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute_capture().await?;
        Ok(first_line_of(&stdout))
    }
}
