use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::output::is_mp3;
use crate::report::{Event, Reporter};
use crate::split::{plan_file, split_file, PlannedSegment, SplitSummary};
use crate::{AudioSplitError, Config};

/// Totals over every file split in one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Source files that were split, in processing order.
    pub files: Vec<PathBuf>,
    /// Directory entries that were not MP3 files.
    pub ignored: Vec<PathBuf>,
    pub segments: usize,
    pub written: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub empty: usize,
}

impl BatchSummary {
    pub(crate) fn from_single(summary: SplitSummary) -> Self {
        let mut batch = Self::default();
        batch.add(summary);
        batch
    }

    fn add(&mut self, summary: SplitSummary) {
        self.segments += summary.segments;
        self.written += summary.written;
        self.overwritten += summary.overwritten;
        self.skipped += summary.skipped;
        self.empty += summary.empty;
    }
}

/// Split every MP3 file directly inside `dir`.
///
/// Subdirectories are not entered. Entries are visited in file-name order and
/// the first failing file aborts the walk.
pub fn split_directory(
    dir: &Path,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, AudioSplitError> {
    let mut batch = BatchSummary::default();
    for file in mp3_files(dir, reporter, &mut batch.ignored)? {
        let summary = split_file(&file, config, reporter)?;
        batch.add(summary);
        batch.files.push(file);
    }
    Ok(batch)
}

/// Dry-run counterpart of [`split_directory`].
pub fn plan_directory(
    dir: &Path,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<Vec<PlannedSegment>, AudioSplitError> {
    let mut ignored = Vec::new();
    let mut planned = Vec::new();
    for file in mp3_files(dir, reporter, &mut ignored)? {
        planned.extend(plan_file(&file, config, reporter)?);
    }
    Ok(planned)
}

fn mp3_files(
    dir: &Path,
    reporter: &mut dyn Reporter,
    ignored: &mut Vec<PathBuf>,
) -> Result<Vec<PathBuf>, AudioSplitError> {
    reporter.report(Event::ScanningDirectory { path: dir });

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| AudioSplitError::ReadDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if is_mp3(path) {
            files.push(path.to_path_buf());
        } else {
            reporter.report(Event::FileIgnored { path });
            ignored.push(path.to_path_buf());
        }
    }
    Ok(files)
}
