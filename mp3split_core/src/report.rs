use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

/// Target name attached to every record emitted by [`LogReporter`].
pub const LOG_TARGET: &str = "mp3split";

/// Status notifications emitted while splitting.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    /// A directory is about to be scanned.
    ScanningDirectory { path: &'a Path },
    /// A source file is about to be decoded.
    Opening { path: &'a Path },
    /// The decoder rejected a frame; it is left out of every segment.
    FrameDropped { path: &'a Path, reason: &'a str },
    /// A source file was decoded.
    TrackLoaded {
        path: &'a Path,
        duration: Duration,
        segments: usize,
    },
    /// The output directory is being created.
    CreatingDirectory { path: &'a Path },
    /// The output directory was already present.
    DirectoryExists { path: &'a Path },
    /// A new segment file was written.
    SegmentWritten { path: &'a Path, index: usize },
    /// An existing segment file was replaced.
    SegmentOverwritten { path: &'a Path, index: usize },
    /// An existing segment file was left untouched.
    SegmentSkipped { path: &'a Path, index: usize },
    /// A slice held no frames, so no file was written for it.
    SegmentEmpty { path: &'a Path, index: usize },
    /// Every segment of a source file has been handled.
    TrackFinished { path: &'a Path },
    /// A directory entry is not an MP3 file.
    FileIgnored { path: &'a Path },
}

/// Receiver for [`Event`]s.
///
/// Any `FnMut(Event<'_>)` closure is a reporter, which keeps ad-hoc observers
/// in tests and the CLI short.
pub trait Reporter {
    fn report(&mut self, event: Event<'_>);
}

impl<F> Reporter for F
where
    F: FnMut(Event<'_>),
{
    fn report(&mut self, event: Event<'_>) {
        self(event)
    }
}

/// Reporter that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&mut self, _event: Event<'_>) {}
}

/// Reporter that forwards events to the `log` facade under [`LOG_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: Event<'_>) {
        match event {
            Event::ScanningDirectory { path } => {
                debug!(target: LOG_TARGET, "working on {}", path.display())
            }
            Event::Opening { path } => debug!(target: LOG_TARGET, "opening {}", path.display()),
            Event::FrameDropped { path, reason } => warn!(
                target: LOG_TARGET,
                "dropping undecodable frame in {}: {reason}",
                path.display()
            ),
            Event::TrackLoaded {
                path,
                duration,
                segments,
            } => {
                debug!(
                    target: LOG_TARGET,
                    "{} duration is {:.3} seconds",
                    path.display(),
                    duration.as_secs_f64()
                );
                debug!(target: LOG_TARGET, "{segments} files will be created");
            }
            Event::CreatingDirectory { path } => {
                debug!(target: LOG_TARGET, "creating {}", path.display())
            }
            Event::DirectoryExists { path } => {
                info!(target: LOG_TARGET, "{} already exists", path.display())
            }
            Event::SegmentWritten { path, .. } => {
                debug!(target: LOG_TARGET, "created {}", path.display())
            }
            Event::SegmentOverwritten { path, .. } => debug!(
                target: LOG_TARGET,
                "{} already exists. Overwriting it",
                path.display()
            ),
            Event::SegmentSkipped { path, .. } => debug!(
                target: LOG_TARGET,
                "{} already exists. Ignoring it",
                path.display()
            ),
            Event::SegmentEmpty { path, index } => warn!(
                target: LOG_TARGET,
                "segment {index} of {} holds no audio frames, not writing it",
                path.display()
            ),
            Event::TrackFinished { path } => {
                debug!(target: LOG_TARGET, "finished {}", path.display())
            }
            Event::FileIgnored { path } => info!(
                target: LOG_TARGET,
                "{} is not a mp3 file. Ignoring it",
                path.display()
            ),
        }
    }
}
