use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::config::{Config, TranscriberImplementation};
use crate::error::{LegendaError, Result};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub struct SetupManager {
    client: Client,
    data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
}

impl ModelInfo {
    fn ggml(name: &str, size_mb: f64) -> Self {
        let filename = format!("ggml-{}.bin", name);
        Self {
            name: name.to_string(),
            url: format!("{}/{}", MODEL_BASE_URL, filename),
            filename,
            size_mb,
        }
    }
}

impl SetupManager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(data_dir.join("models"))?;

        let client = Client::builder()
            .user_agent(concat!("legenda/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, data_dir })
    }

    /// Directory holding downloaded models
    pub fn models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }

    /// Make the configured whisper.cpp model available locally and point the
    /// configuration at the file. OpenAI Whisper manages its own models.
    pub async fn ensure_model(&self, config: &mut Config) -> Result<()> {
        if config.transcriber.implementation != TranscriberImplementation::WhisperCpp {
            return Ok(());
        }

        let model_path = self.resolve_model_path(&config.transcriber.model);
        if !model_path.exists() {
            info!("Transcription model not found: {}", config.transcriber.model);
            let model = self.find_model(&config.transcriber.model)?;
            self.download_model(&model).await?;
        }

        config.transcriber.model = model_path.to_string_lossy().to_string();
        info!("Using whisper.cpp model {}", config.transcriber.model);
        Ok(())
    }

    pub fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo::ggml("tiny", 75.0),
            ModelInfo::ggml("tiny.en", 75.0),
            ModelInfo::ggml("base", 142.0),
            ModelInfo::ggml("base.en", 142.0),
            ModelInfo::ggml("small", 466.0),
            ModelInfo::ggml("small.en", 466.0),
            ModelInfo::ggml("medium", 1500.0),
            ModelInfo::ggml("medium.en", 1500.0),
            ModelInfo::ggml("large-v1", 2900.0),
            ModelInfo::ggml("large-v2", 2900.0),
            ModelInfo::ggml("large-v3", 2900.0),
        ]
    }

    fn find_model(&self, name: &str) -> Result<ModelInfo> {
        self.available_models()
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| LegendaError::Config(format!(
                "Unknown whisper model '{}' and no such file exists",
                name
            )))
    }

    /// Resolve a model name to the file it is stored in.
    /// Anything that already looks like a path is returned as is.
    pub fn resolve_model_path(&self, model: &str) -> PathBuf {
        if model.contains('/') || model.contains('\\') || model.ends_with(".bin") {
            return PathBuf::from(model);
        }

        self.models_dir().join(format!("ggml-{}.bin", model))
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<PathBuf> {
        let local_path = self.models_dir().join(&model.filename);

        if local_path.exists() {
            info!("Model {} already exists at {}", model.name, local_path.display());
            return Ok(local_path);
        }

        info!("Downloading {} model ({:.1} MB)...", model.name, model.size_mb);

        let response = self.client.get(&model.url).send().await?;
        if !response.status().is_success() {
            return Err(LegendaError::Config(format!(
                "Failed to download model {}: HTTP {}",
                model.name, response.status()
            )));
        }

        let total = response
            .content_length()
            .unwrap_or((model.size_mb * 1_000_000.0) as u64);
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        // Stream into a temporary file so an interrupted download never looks complete
        let temp_path = local_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            pb.inc(bytes.len() as u64);
        }
        file.flush().await?;
        drop(file);

        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.name));
        info!("Successfully downloaded {} to {}", model.name, local_path.display());

        Ok(local_path)
    }
}
