use thiserror::Error;

#[derive(Error, Debug)]
pub enum LegendaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcriber error: {0}")]
    Transcriber(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Subtitle error: {0}")]
    Subtitle(String),
}

pub type Result<T> = std::result::Result<T, LegendaError>;
