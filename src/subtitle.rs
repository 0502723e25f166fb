//! Transcript to SRT conversion.
//!
//! The transcript carries no timing of its own, so cues are spread uniformly
//! over the media duration: the text is split on `". "`, every piece gets
//! `duration / count` seconds, and the pieces are laid end to end from zero.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{LegendaError, Result};

const SENTENCE_DELIMITER: &str = ". ";

/// One timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// 1-based position in the file
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// `HH:MM:SS,mmm` time representation used by SRT files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl Timecode {
    /// Truncates below the millisecond; negative and non-finite values clamp to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let total_milliseconds = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 1000.0) as u64
        } else {
            0
        };

        Self {
            hours: total_milliseconds / 3_600_000,
            minutes: (total_milliseconds % 3_600_000) / 60_000,
            seconds: (total_milliseconds % 60_000) / 1_000,
            millis: total_milliseconds % 1_000,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

impl FromStr for Timecode {
    type Err = LegendaError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LegendaError::Subtitle(format!("Invalid timecode: {}", s));

        let (clock, millis) = s.trim().split_once(',').ok_or_else(invalid)?;
        let mut parts = clock.split(':');
        let mut next = || -> Result<u64> {
            parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())
        };
        let hours = next()?;
        let minutes = next()?;
        let seconds = next()?;
        if parts.next().is_some() || millis.len() != 3 || minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        let millis = millis.parse().map_err(|_| invalid())?;

        Ok(Self { hours, minutes, seconds, millis })
    }
}

/// Split a transcript into naive sentences on `". "`.
///
/// The period closing the transcript ends the last sentence the same way.
/// Abbreviations, decimals and periods without a following space are not
/// treated specially, so pieces can be fragments, several sentences, or
/// empty. A blank transcript yields nothing.
pub fn segment(transcript: &str) -> Vec<String> {
    let body = transcript.trim_end();
    let body = body.strip_suffix('.').unwrap_or(body);
    if body.trim().is_empty() {
        return Vec::new();
    }

    body
        .split(SENTENCE_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Spread `segments` uniformly over `[0, total_duration)`.
pub fn allocate(segments: &[String], total_duration: f64) -> Vec<SubtitleCue> {
    if segments.is_empty() {
        return Vec::new();
    }

    let per_segment = total_duration / segments.len() as f64;

    segments
        .iter()
        .enumerate()
        .map(|(i, text)| SubtitleCue {
            index: i + 1,
            start: i as f64 * per_segment,
            end: (i + 1) as f64 * per_segment,
            text: text.trim().to_string(),
        })
        .collect()
}

/// Serialize cues as SRT blocks.
pub fn render(cues: &[SubtitleCue]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            Timecode::from_seconds(cue.start),
            Timecode::from_seconds(cue.end),
            cue.text
        ));
    }

    srt_content
}

/// Write rendered SRT text, replacing any existing file.
pub async fn write_srt<P: AsRef<Path>>(output_path: P, content: &str) -> Result<()> {
    let output_path = output_path.as_ref();
    debug!("Writing {} bytes to {}", content.len(), output_path.display());

    fs::write(output_path, content).await?;
    Ok(())
}

/// Generate an SRT file from a flat transcript.
///
/// Returns the number of cues written. Nothing is written when the transcript
/// produces no cues.
pub async fn generate_srt<P: AsRef<Path>>(
    transcript: &str,
    total_duration: f64,
    output_path: P,
) -> Result<usize> {
    let output_path = output_path.as_ref();

    let cues = allocate(&segment(transcript), total_duration);
    if cues.is_empty() {
        return Ok(0);
    }

    info!(
        "Generating SRT file with {} cues over {:.3}s: {}",
        cues.len(),
        total_duration,
        output_path.display()
    );
    write_srt(output_path, &render(&cues)).await?;

    info!("SRT file generated successfully");
    Ok(cues.len())
}
