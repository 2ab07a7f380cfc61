//! Split MP3 files into fixed-length segments.
//!
//! A source file `song.mp3` is decoded into a [`Track`], cut into contiguous
//! slices of [`Config::segment_length`] and written as `song/song001.mp3`,
//! `song/song002.mp3`, ... next to the source. Directories are processed one
//! level deep. All status is reported through a [`Reporter`] handle passed to
//! every operation.

mod output;
mod plan;
mod report;
mod split;
mod track;
mod walk;

use std::path::{Path, PathBuf};
use std::time::Duration;

use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

pub use output::{ensure_output_dir, is_mp3, output_dir_for, segment_file_name};
pub use plan::{segment_count, segment_ranges, SegmentRanges};
pub use report::{Event, LogReporter, Reporter, SilentReporter, LOG_TARGET};
pub use split::{plan_file, split_file, PlannedSegment, SegmentOutcome, SplitSummary};
pub use track::{Segment, Track};
pub use walk::{plan_directory, split_directory, BatchSummary};

/// Errors that can occur while splitting audio files.
#[derive(Debug, Error)]
pub enum AudioSplitError {
    /// Wrapper around errors produced by the Symphonia decoding library.
    #[error(transparent)]
    Symphonia(SymphoniaError),

    /// The input could not be opened for reading.
    #[error("failed to open '{}'", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("failed to create directory '{}'", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output path exists but is not a directory.
    #[error("'{}' exists and is not a directory", .0.display())]
    OutputNotDirectory(PathBuf),

    /// A segment file could not be written.
    #[error("failed to create '{}'", .path.display())]
    WriteSegment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory listing could not be read.
    #[error("failed to read directory '{}'", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Error returned when the input is not a recognised MP3 stream.
    #[error("unsupported audio format")]
    UnsupportedFormat,

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Error returned when the codec of the track cannot be handled.
    #[error("unsupported codec")]
    UnsupportedCodec,

    /// Error returned when the decoder track lacks a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// Error returned when the segment length is invalid.
    #[error("duration can not be zero")]
    InvalidSegmentLength,

    /// The segment length is shorter than one MPEG frame of the track, which
    /// would leave slices without audio.
    #[error("duration of {segment_ms} ms is shorter than one {frame_ms} ms mp3 frame")]
    SegmentShorterThanFrame { segment_ms: u64, frame_ms: u64 },

    /// The input path does not exist.
    #[error("{} does not exist", .0.display())]
    MissingInput(PathBuf),

    /// The input file does not carry an `.mp3` extension.
    #[error("extension '{0}' not supported")]
    UnsupportedExtension(String),

    /// Error produced when a file name cannot be derived from the input path.
    #[error("failed to derive a base name for '{}'", .0.display())]
    InvalidInputName(PathBuf),
}

impl From<SymphoniaError> for AudioSplitError {
    fn from(err: SymphoniaError) -> Self {
        match err {
            SymphoniaError::Unsupported(_) => AudioSplitError::UnsupportedFormat,
            other => AudioSplitError::Symphonia(other),
        }
    }
}

/// Settings shared by every file of a run.
#[derive(Clone, Debug)]
pub struct Config {
    segment_length: Duration,
    overwrite: bool,
}

impl Config {
    /// Create a builder with the requested segment length.
    pub fn builder(segment_length: Duration) -> ConfigBuilder {
        ConfigBuilder {
            segment_length,
            overwrite: false,
        }
    }

    /// Shorthand for a configuration that never overwrites.
    pub fn new(segment_length: Duration) -> Result<Self, AudioSplitError> {
        Self::builder(segment_length).build()
    }

    /// Desired length of each segment.
    pub fn segment_length(&self) -> Duration {
        self.segment_length
    }

    /// Desired length of each segment in whole milliseconds.
    pub fn segment_length_ms(&self) -> u64 {
        duration_to_millis(self.segment_length)
    }

    /// Whether existing segment files are replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    segment_length: Duration,
    overwrite: bool,
}

impl ConfigBuilder {
    /// Replace existing segment files instead of skipping them.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Validate and produce the [`Config`].
    ///
    /// Segments are cut on millisecond offsets, so anything shorter than one
    /// millisecond is rejected along with zero.
    pub fn build(self) -> Result<Config, AudioSplitError> {
        if duration_to_millis(self.segment_length) == 0 {
            return Err(AudioSplitError::InvalidSegmentLength);
        }

        Ok(Config {
            segment_length: self.segment_length,
            overwrite: self.overwrite,
        })
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

/// What a validated input path refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// A single MP3 file.
    File(PathBuf),
    /// A directory whose MP3 files are split one by one.
    Directory(PathBuf),
}

impl Input {
    /// Check that `path` exists and is either a directory or an `.mp3` file.
    pub fn classify<P: AsRef<Path>>(path: P) -> Result<Self, AudioSplitError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AudioSplitError::MissingInput(path.to_path_buf()));
        }

        if path.is_dir() {
            return Ok(Input::Directory(path.to_path_buf()));
        }

        if is_mp3(path) {
            Ok(Input::File(path.to_path_buf()))
        } else {
            let extension = path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            Err(AudioSplitError::UnsupportedExtension(extension))
        }
    }
}

/// Validate `path` and split it as a file or as a directory.
pub fn split_path<P: AsRef<Path>>(
    path: P,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, AudioSplitError> {
    match Input::classify(path)? {
        Input::Directory(dir) => split_directory(&dir, config, reporter),
        Input::File(file) => {
            let summary = split_file(&file, config, reporter)?;
            Ok(BatchSummary::from_single(summary))
        }
    }
}

/// Validate `path` and compute the segments a split would produce.
pub fn plan_path<P: AsRef<Path>>(
    path: P,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<Vec<PlannedSegment>, AudioSplitError> {
    match Input::classify(path)? {
        Input::Directory(dir) => plan_directory(&dir, config, reporter),
        Input::File(file) => plan_file(&file, config, reporter),
    }
}
