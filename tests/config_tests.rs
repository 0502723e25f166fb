use assert_fs::prelude::*;
use assert_fs::TempDir;

use legenda::config::{Config, TranscriberImplementation};
use legenda::error::LegendaError;

#[test]
fn default_config_file_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.child("legenda.toml");

    Config::default().save_to_file(path.path()).unwrap();
    let loaded = Config::from_file(path.path()).unwrap();

    assert_eq!(loaded.transcriber.implementation, TranscriberImplementation::WhisperCpp);
    assert_eq!(loaded.transcriber.binary_path, "whisper-cli");
    assert_eq!(loaded.transcriber.language, None);
    assert_eq!(loaded.media.ffprobe_path, "ffprobe");
    assert_eq!(loaded.project.audio_file_name, "audio.wav");
    assert!(!loaded.project.keep_audio);
}

#[test]
fn empty_file_is_all_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.child("legenda.toml");
    path.write_str("").unwrap();

    let loaded = Config::from_file(path.path()).unwrap();
    assert_eq!(loaded.transcriber.model, "base");
    assert_eq!(loaded.media.channels, 1);
}

#[test]
fn malformed_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.child("legenda.toml");
    path.write_str("[transcriber]\nimplementation = \"Cloud\"\n").unwrap();

    assert!(matches!(Config::from_file(path.path()), Err(LegendaError::Config(_))));
}
