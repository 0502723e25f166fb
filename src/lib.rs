//! legenda - video to SRT subtitles
//!
//! Extracts the audio track of a video with ffmpeg, transcribes it with
//! whisper.cpp or OpenAI Whisper, and spreads the transcript's sentences
//! uniformly over the video's duration as SRT cues.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod setup;
pub mod subtitle;
pub mod transcribe;
pub mod workflow;
