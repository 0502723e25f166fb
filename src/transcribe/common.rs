use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{LegendaError, Result};

/// Service-agnostic transcription result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Full transcript text, segments concatenated in order
    pub text: String,
    /// Detected or requested language, when the tool reports one
    pub language: Option<String>,
}

/// Trait for converting service-specific transcription formats
pub trait TranscriptionMapper<T> {
    fn to_transcription(service_result: T) -> Result<Transcription>;
}

/// Run a transcriber command to completion
pub async fn run_transcriber(mut cmd: Command, tool: &str) -> Result<()> {
    debug!("Executing {} command: {:?}", tool, cmd);

    let output = cmd
        .output()
        .await
        .map_err(|e| LegendaError::Transcriber(format!("Failed to execute {}: {}", tool, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LegendaError::Transcriber(format!(
            "{} failed: {}",
            tool,
            stderr.trim()
        )));
    }

    Ok(())
}

/// Read and deserialize a JSON file written by a transcriber
pub async fn read_json_output<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let json_content = tokio::fs::read_to_string(path).await.map_err(|e| {
        LegendaError::Transcriber(format!("Failed to read output {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&json_content)
        .map_err(|e| LegendaError::Transcriber(format!("Failed to parse transcriber JSON: {}", e)))
}

/// Check that a tool answers `--help`
pub async fn check_tool(binary_path: &str) -> Result<()> {
    let output = Command::new(binary_path)
        .arg("--help")
        .output()
        .await
        .map_err(|e| LegendaError::Transcriber(format!("{} command not found: {}", binary_path, e)))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(LegendaError::Transcriber(format!(
            "{} is not usable: {}",
            binary_path,
            stderr.trim()
        )))
    }
}
