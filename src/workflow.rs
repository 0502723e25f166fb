use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{LegendaError, Result};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::{allocate, generate_srt, render, segment, write_srt};
use crate::transcribe::{TranscriberFactory, TranscriberTrait};

const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];

/// Where a run puts its files, derived from the input video
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    /// Video file name without extension
    pub name: String,
    /// `<video dir>/<name>`
    pub folder: PathBuf,
    pub audio_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub video_copy_path: PathBuf,
}

impl ProjectLayout {
    pub fn resolve<P: AsRef<Path>>(video_path: P, audio_file_name: &str) -> Result<Self> {
        let video_path = video_path.as_ref();

        let name = video_path.file_stem()
            .ok_or_else(|| LegendaError::Config("Invalid video filename".to_string()))?
            .to_string_lossy()
            .to_string();
        let file_name = video_path.file_name()
            .ok_or_else(|| LegendaError::Config("Invalid video filename".to_string()))?;
        let parent = video_path.parent().unwrap_or_else(|| Path::new(""));

        let folder = parent.join(&name);

        Ok(Self {
            audio_path: folder.join(audio_file_name),
            subtitle_path: folder.join(format!("{}.srt", name)),
            video_copy_path: folder.join(file_name),
            folder,
            name,
        })
    }
}

/// Summary of one processed video
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub layout: ProjectLayout,
    /// Media duration in seconds
    pub duration: f64,
    pub cue_count: usize,
    /// False when the transcript was empty and no file was written
    pub subtitle_written: bool,
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn TranscriberTrait>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new(
        config: Config,
        media: Box<dyn MediaProcessorTrait>,
        transcriber: Box<dyn TranscriberTrait>,
    ) -> Self {
        Self {
            config,
            transcriber,
            media,
        }
    }

    /// Build the workflow from configuration and check that the external tools respond
    pub async fn from_config(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone());

        let workflow = Self::new(config, media, transcriber);
        workflow.check_tools().await?;

        Ok(workflow)
    }

    /// Fail early when ffmpeg or the transcriber does not respond, and log what will run
    pub async fn check_tools(&self) -> Result<()> {
        self.media.check_availability().await?;
        let version = self.media.get_version_info().await?;
        info!("Using {}", version);

        self.transcriber.check_availability().await?;
        info!("Using {} for transcription", self.transcriber.name());

        Ok(())
    }

    /// Turn one video into `<video dir>/<name>/<name>.srt` next to a copy of the video.
    ///
    /// Nothing is created when the video does not exist. A failure after the
    /// project folder is created leaves whatever was produced so far in place.
    pub async fn process_single_file<P: AsRef<Path>>(&self, video_path: P) -> Result<ProjectOutcome> {
        let video_path = video_path.as_ref();
        info!("Processing single file: {}", video_path.display());

        // Validate input file
        if !video_path.exists() {
            return Err(LegendaError::FileNotFound(video_path.display().to_string()));
        }

        let layout = ProjectLayout::resolve(video_path, &self.config.project.audio_file_name)?;
        fs::create_dir_all(&layout.folder).await?;

        // Step 1: Extract audio and get the total duration
        let duration = self.media.extract_audio(video_path, &layout.audio_path).await?;

        // Step 2: Transcribe
        let transcription = self.transcriber.transcribe(&layout.audio_path).await?;

        // Step 3: Allocate cue timing and write the subtitle file
        let cues = allocate(&segment(&transcription.text), duration);
        let subtitle_written = !cues.is_empty();
        if subtitle_written {
            info!("Writing {} cues over {:.3}s", cues.len(), duration);
            write_srt(&layout.subtitle_path, &render(&cues)).await?;
        } else {
            warn!("Transcript of {} is empty, skipping subtitle generation", video_path.display());
        }

        // Step 4: Copy the source video into the project folder
        fs::copy(video_path, &layout.video_copy_path).await?;

        // Step 5: Remove the temporary audio
        if self.config.project.keep_audio {
            info!("Keeping extracted audio at {}", layout.audio_path.display());
        } else {
            fs::remove_file(&layout.audio_path).await?;
        }

        info!("Project ready in {}", layout.folder.display());
        Ok(ProjectOutcome {
            cue_count: cues.len(),
            subtitle_written,
            duration,
            layout,
        })
    }

    /// Process every video found under a directory, one after another
    pub async fn process_directory<P: AsRef<Path>>(&self, input_dir: P) -> Result<Vec<ProjectOutcome>> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(LegendaError::Config("Input path is not a directory".to_string()));
        }

        let video_files = find_video_files(input_dir);
        info!("Found {} video files to process", video_files.len());

        let mut outcomes = Vec::new();
        for video_path in video_files {
            match self.process_single_file(&video_path).await {
                Ok(outcome) => {
                    info!("Successfully processed: {}", video_path.display());
                    outcomes.push(outcome);
                }
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
        }

        Ok(outcomes)
    }

    /// Extract audio from video file, returning the media duration
    pub async fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> Result<f64> {
        let video_path = video_path.as_ref();
        if !video_path.exists() {
            return Err(LegendaError::FileNotFound(video_path.display().to_string()));
        }

        self.media.extract_audio(video_path, audio_path.as_ref()).await
    }

    /// Transcribe audio file to a plain text file
    pub async fn transcribe_audio<P: AsRef<Path>>(&self, audio_path: P, output_path: P) -> Result<()> {
        let audio_path = audio_path.as_ref();
        if !audio_path.exists() {
            return Err(LegendaError::FileNotFound(audio_path.display().to_string()));
        }

        let transcription = self.transcriber.transcribe(audio_path).await?;
        fs::write(output_path.as_ref(), &transcription.text).await?;

        Ok(())
    }
}

/// Build an SRT file from a transcript text file and a known duration
pub async fn subtitles_from_transcript<P: AsRef<Path>>(
    transcript_path: P,
    total_duration: f64,
    output_path: P,
) -> Result<usize> {
    let transcript_path = transcript_path.as_ref();
    if !transcript_path.exists() {
        return Err(LegendaError::FileNotFound(transcript_path.display().to_string()));
    }
    if !total_duration.is_finite() || total_duration < 0.0 {
        return Err(LegendaError::Config(format!("Invalid duration: {}", total_duration)));
    }

    let transcript = fs::read_to_string(transcript_path).await?;
    generate_srt(&transcript, total_duration, output_path).await
}

/// Video files below `input_dir`, skipping project folders this tool produced
fn find_video_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_project_folder(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    video_files.sort();
    video_files
}

/// A project folder `<dir>/<name>` holds the `<name>.srt` a previous run wrote.
/// A folder holding only `<name>.<ext>` is user content and gets processed.
fn is_project_folder(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    path.join(format!("{}.srt", name)).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaProcessorTrait;
    use crate::transcribe::{MockTranscriberTrait, Transcription};
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn transcript(text: &str) -> Transcription {
        Transcription {
            text: text.to_string(),
            language: Some("en".to_string()),
        }
    }

    /// Media mock that writes a fake audio file and reports `duration`
    fn media_with_duration(duration: f64) -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().times(1).returning(move |_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(duration)
        });
        media
    }

    fn transcriber_returning(text: &str) -> MockTranscriberTrait {
        let text = text.to_string();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(move |audio| {
                assert!(audio.exists(), "audio should exist while transcribing");
                Ok(transcript(&text))
            });
        transcriber
    }

    fn workflow(config: Config, media: MockMediaProcessorTrait, transcriber: MockTranscriberTrait) -> Workflow {
        Workflow::new(config, Box::new(media), Box::new(transcriber))
    }

    #[test]
    fn layout_is_sibling_folder_named_after_video() {
        let layout = ProjectLayout::resolve("/videos/talk.final.mp4", "audio.wav").unwrap();

        assert_eq!(layout.name, "talk.final");
        assert_eq!(layout.folder, PathBuf::from("/videos/talk.final"));
        assert_eq!(layout.audio_path, PathBuf::from("/videos/talk.final/audio.wav"));
        assert_eq!(layout.subtitle_path, PathBuf::from("/videos/talk.final/talk.final.srt"));
        assert_eq!(layout.video_copy_path, PathBuf::from("/videos/talk.final/talk.final.mp4"));
    }

    #[test]
    fn layout_of_bare_file_name() {
        let layout = ProjectLayout::resolve("clip.mkv", "a.wav").unwrap();
        assert_eq!(layout.folder, PathBuf::from("clip"));
        assert_eq!(layout.subtitle_path, PathBuf::from("clip/clip.srt"));
    }

    #[tokio::test]
    async fn check_tools_reads_media_version() {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_check_availability().times(1).returning(|| Ok(()));
        media
            .expect_get_version_info()
            .times(1)
            .returning(|| Ok("ffmpeg version 6.1.1".to_string()));
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_check_availability().times(1).returning(|| Ok(()));
        transcriber.expect_name().return_const("whisper.cpp");

        let wf = workflow(Config::default(), media, transcriber);
        wf.check_tools().await.unwrap();
    }

    #[tokio::test]
    async fn check_tools_stops_when_ffmpeg_is_missing() {
        let mut media = MockMediaProcessorTrait::new();
        media
            .expect_check_availability()
            .returning(|| Err(LegendaError::Media("Media processor not found".to_string())));
        media.expect_get_version_info().never();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_check_availability().never();

        let wf = workflow(Config::default(), media, transcriber);
        assert!(matches!(wf.check_tools().await, Err(LegendaError::Media(_))));
    }

    #[tokio::test]
    async fn processes_video_into_project_folder() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("lecture.mp4");
        video.write_binary(b"fake video").unwrap();

        let wf = workflow(
            Config::default(),
            media_with_duration(10.0),
            transcriber_returning(" A. B."),
        );
        let outcome = wf.process_single_file(video.path()).await.unwrap();

        assert_eq!(outcome.cue_count, 2);
        assert!(outcome.subtitle_written);
        assert_eq!(outcome.duration, 10.0);

        temp.child("lecture/lecture.srt").assert(
            "1\n00:00:00,000 --> 00:00:05,000\nA\n\n2\n00:00:05,000 --> 00:00:10,000\nB\n\n",
        );
        temp.child("lecture/lecture.mp4").assert("fake video");
        assert!(!temp.child("lecture/audio.wav").path().exists());
    }

    #[tokio::test]
    async fn empty_transcript_skips_subtitle_but_finishes() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("silent.mov");
        video.write_binary(b"quiet").unwrap();

        let wf = workflow(Config::default(), media_with_duration(30.0), transcriber_returning(""));
        let outcome = wf.process_single_file(video.path()).await.unwrap();

        assert_eq!(outcome.cue_count, 0);
        assert!(!outcome.subtitle_written);
        assert!(!temp.child("silent/silent.srt").path().exists());
        temp.child("silent/silent.mov").assert("quiet");
        assert!(!temp.child("silent/audio.wav").path().exists());
    }

    #[tokio::test]
    async fn missing_video_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().never();
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().never();

        let wf = workflow(Config::default(), media, transcriber);
        let err = wf.process_single_file(temp.path().join("ghost.mp4")).await.unwrap_err();

        assert!(matches!(err, LegendaError::FileNotFound(_)));
        assert!(!temp.child("ghost").path().exists());
    }

    #[tokio::test]
    async fn transcription_failure_leaves_partial_project() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("broken.mp4");
        video.write_binary(b"data").unwrap();

        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_transcribe()
            .returning(|_| Err(LegendaError::Transcriber("model failed to load".to_string())));

        let wf = workflow(Config::default(), media_with_duration(5.0), transcriber);
        let err = wf.process_single_file(video.path()).await.unwrap_err();

        assert!(matches!(err, LegendaError::Transcriber(_)));
        // No rollback: the folder and audio stay behind
        assert!(temp.child("broken/audio.wav").path().exists());
        assert!(!temp.child("broken/broken.mp4").path().exists());
    }

    #[tokio::test]
    async fn existing_project_folder_is_reused() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("again.mp4");
        video.write_binary(b"v2").unwrap();
        temp.child("again/again.srt").write_str("old").unwrap();

        let wf = workflow(Config::default(), media_with_duration(2.0), transcriber_returning("Only"));
        wf.process_single_file(video.path()).await.unwrap();

        temp.child("again/again.srt")
            .assert("1\n00:00:00,000 --> 00:00:02,000\nOnly\n\n");
    }

    #[tokio::test]
    async fn keep_audio_option() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("keep.mp4");
        video.write_binary(b"v").unwrap();

        let mut config = Config::default();
        config.project.keep_audio = true;
        config.project.audio_file_name = "track.wav".to_string();

        let wf = workflow(config, media_with_duration(1.0), transcriber_returning("Hi"));
        wf.process_single_file(video.path()).await.unwrap();

        temp.child("keep/track.wav").assert("RIFF");
    }

    #[tokio::test]
    async fn batch_processes_each_video_and_skips_projects() {
        let temp = TempDir::new().unwrap();
        temp.child("one.mp4").write_binary(b"1").unwrap();
        temp.child("nested/two.MKV").write_binary(b"2").unwrap();
        temp.child("notes.txt").write_str("not a video").unwrap();
        // Output of an earlier run
        temp.child("old/old.mp4").write_binary(b"copy").unwrap();
        temp.child("old/old.srt").write_str("1\n").unwrap();
        temp.child("old.mp4").write_binary(b"orig").unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().times(3).returning(|_, audio| {
            std::fs::write(audio, b"RIFF")?;
            Ok(4.0)
        });
        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_transcribe()
            .times(3)
            .returning(|_| Ok(transcript("Hello. World")));

        let wf = workflow(Config::default(), media, transcriber);
        let outcomes = wf.process_directory(temp.path()).await.unwrap();

        let mut names: Vec<&str> = outcomes.iter().map(|o| o.layout.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["old", "one", "two"]);
        temp.child("nested/two/two.srt").assert(
            "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,000 --> 00:00:04,000\nWorld\n\n",
        );
    }

    #[tokio::test]
    async fn batch_descends_into_user_folder_named_like_its_video() {
        let temp = TempDir::new().unwrap();
        temp.child("holiday/holiday.mp4").write_binary(b"beach").unwrap();

        let wf = workflow(Config::default(), media_with_duration(6.0), transcriber_returning("Sun. Sea"));
        let outcomes = wf.process_directory(temp.path()).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].layout.name, "holiday");
        temp.child("holiday/holiday/holiday.srt").assert(
            "1\n00:00:00,000 --> 00:00:03,000\nSun\n\n2\n00:00:03,000 --> 00:00:06,000\nSea\n\n",
        );
    }

    #[tokio::test]
    async fn batch_continues_after_failure() {
        let temp = TempDir::new().unwrap();
        temp.child("a.mp4").write_binary(b"a").unwrap();
        temp.child("b.mp4").write_binary(b"b").unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().times(2).returning(|video, audio| {
            if video.ends_with("a.mp4") {
                return Err(LegendaError::Media("unsupported codec".to_string()));
            }
            std::fs::write(audio, b"RIFF")?;
            Ok(1.0)
        });
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_transcribe().times(1).returning(|_| Ok(transcript("Fine")));

        let wf = workflow(Config::default(), media, transcriber);
        let outcomes = wf.process_directory(temp.path()).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].layout.name, "b");
    }

    #[tokio::test]
    async fn batch_rejects_non_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("x.mp4");
        file.write_binary(b"x").unwrap();

        let wf = workflow(Config::default(), MockMediaProcessorTrait::new(), MockTranscriberTrait::new());
        assert!(matches!(
            wf.process_directory(file.path()).await,
            Err(LegendaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn transcribe_audio_writes_text() {
        let temp = TempDir::new().unwrap();
        let audio = temp.child("audio.wav");
        audio.write_binary(b"RIFF").unwrap();
        let output = temp.child("transcript.txt");

        let wf = workflow(
            Config::default(),
            MockMediaProcessorTrait::new(),
            transcriber_returning(" Some words. More words."),
        );
        wf.transcribe_audio(audio.path(), output.path()).await.unwrap();

        output.assert(" Some words. More words.");
    }

    #[tokio::test]
    async fn subtitles_from_transcript_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.child("t.txt");
        input.write_str("Hello world. This is a test. Done").unwrap();
        let output = temp.child("t.srt");

        let count = subtitles_from_transcript(input.path(), 3.0, output.path()).await.unwrap();

        assert_eq!(count, 3);
        output.assert(
            "1\n00:00:00,000 --> 00:00:01,000\nHello world\n\n\
             2\n00:00:01,000 --> 00:00:02,000\nThis is a test\n\n\
             3\n00:00:02,000 --> 00:00:03,000\nDone\n\n",
        );
    }

    #[tokio::test]
    async fn subtitles_from_transcript_rejects_negative_duration() {
        let temp = TempDir::new().unwrap();
        let input = temp.child("t.txt");
        input.write_str("Hi").unwrap();

        let result = subtitles_from_transcript(input.path(), -1.0, temp.child("t.srt").path()).await;
        assert!(matches!(result, Err(LegendaError::Config(_))));
    }
}
