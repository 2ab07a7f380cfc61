use std::ffi::OsStr;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::output::{ensure_output_dir, output_dir_for, segment_file_name};
use crate::plan::{segment_count, segment_ranges};
use crate::report::{Event, Reporter};
use crate::track::{Segment, Track};
use crate::{AudioSplitError, Config};

/// What happened to one segment file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentOutcome {
    Written,
    Overwritten,
    Skipped,
    Empty,
}

/// Per-file counters returned by [`split_file`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Segments the track was cut into.
    pub segments: usize,
    pub written: usize,
    pub overwritten: usize,
    pub skipped: usize,
    /// Trailing slices past the last frame start that produced no file.
    pub empty: usize,
}

impl SplitSummary {
    fn record(&mut self, outcome: SegmentOutcome) {
        match outcome {
            SegmentOutcome::Written => self.written += 1,
            SegmentOutcome::Overwritten => self.overwritten += 1,
            SegmentOutcome::Skipped => self.skipped += 1,
            SegmentOutcome::Empty => self.empty += 1,
        }
    }
}

/// A segment a split would produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedSegment {
    /// 1-based sequence number.
    pub index: usize,
    /// Millisecond range of the source covered by the segment.
    pub range: Range<u64>,
    /// Target file.
    pub path: PathBuf,
}

/// Split `input` into segments of `config.segment_length()` inside the
/// directory named after it.
///
/// Existing segment files are kept unless the configuration allows
/// overwriting. The first failure aborts the split; segments already written
/// stay on disk.
///
/// A segment length shorter than one frame of the track is rejected before
/// the output directory is created. Longer lengths can only leave the slices
/// after the last frame start empty, so written files are numbered without
/// gaps.
pub fn split_file(
    input: &Path,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<SplitSummary, AudioSplitError> {
    let base_name = base_name(input)?;
    let track = Track::open(input, reporter)?;
    check_frame_length(&track, config)?;
    let output_dir = ensure_output_dir(input, reporter)?;

    let length_ms = track.length_ms();
    let duration_ms = config.segment_length_ms();
    let mut summary = SplitSummary {
        segments: segment_count(length_ms, duration_ms),
        ..SplitSummary::default()
    };
    reporter.report(Event::TrackLoaded {
        path: input,
        duration: track.duration(),
        segments: summary.segments,
    });

    for (offset, range) in segment_ranges(length_ms, duration_ms).enumerate() {
        let index = offset + 1;
        let path = output_dir.join(segment_file_name(base_name, index));
        let segment = track.slice(range);

        let outcome = if segment.is_empty() {
            reporter.report(Event::SegmentEmpty { path: &path, index });
            SegmentOutcome::Empty
        } else if path.is_file() {
            if config.overwrite() {
                reporter.report(Event::SegmentOverwritten { path: &path, index });
                write_segment(&segment, path.as_path())?;
                SegmentOutcome::Overwritten
            } else {
                reporter.report(Event::SegmentSkipped { path: &path, index });
                SegmentOutcome::Skipped
            }
        } else {
            write_segment(&segment, path.as_path())?;
            reporter.report(Event::SegmentWritten { path: &path, index });
            SegmentOutcome::Written
        };
        summary.record(outcome);
    }

    reporter.report(Event::TrackFinished { path: input });
    Ok(summary)
}

/// Decode `input` and list the segments [`split_file`] would write, without
/// creating anything.
pub fn plan_file(
    input: &Path,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<Vec<PlannedSegment>, AudioSplitError> {
    let base_name = base_name(input)?;
    let track = Track::open(input, reporter)?;
    check_frame_length(&track, config)?;
    let output_dir = output_dir_for(input);

    let planned = segment_ranges(track.length_ms(), config.segment_length_ms())
        .enumerate()
        .map(|(offset, range)| PlannedSegment {
            index: offset + 1,
            path: output_dir.join(segment_file_name(base_name, offset + 1)),
            range,
        })
        .collect();
    Ok(planned)
}

fn write_segment(segment: &Segment<'_>, path: &Path) -> Result<(), AudioSplitError> {
    segment
        .write_to(path)
        .map_err(|source| AudioSplitError::WriteSegment {
            path: path.to_path_buf(),
            source,
        })
}

fn check_frame_length(track: &Track, config: &Config) -> Result<(), AudioSplitError> {
    let segment_ms = config.segment_length_ms();
    let frame_ms = track.frame_ms();
    if segment_ms < frame_ms {
        return Err(AudioSplitError::SegmentShorterThanFrame {
            segment_ms,
            frame_ms,
        });
    }
    Ok(())
}

fn base_name(input: &Path) -> Result<&OsStr, AudioSplitError> {
    input
        .file_stem()
        .ok_or_else(|| AudioSplitError::InvalidInputName(input.to_path_buf()))
}
