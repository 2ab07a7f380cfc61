use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::report::{Event, Reporter};
use crate::AudioSplitError;

const SEGMENT_EXTENSION: &str = "mp3";
const INDEX_WIDTH: usize = 3;

/// Directory that receives the segments of `input`: the input path with its
/// extension removed.
pub fn output_dir_for(input: &Path) -> PathBuf {
    input.with_extension("")
}

/// Create the output directory for `input` and return its path.
///
/// A directory left behind by an earlier run is reused.
pub fn ensure_output_dir(
    input: &Path,
    reporter: &mut dyn Reporter,
) -> Result<PathBuf, AudioSplitError> {
    let dir = output_dir_for(input);
    reporter.report(Event::CreatingDirectory { path: &dir });

    match fs::create_dir(&dir) {
        Ok(()) => Ok(dir),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            if !dir.is_dir() {
                return Err(AudioSplitError::OutputNotDirectory(dir));
            }
            reporter.report(Event::DirectoryExists { path: &dir });
            Ok(dir)
        }
        Err(source) => Err(AudioSplitError::CreateDirectory { path: dir, source }),
    }
}

/// File name of the segment with 1-based `index`, e.g. `song007.mp3`.
///
/// `base_name` is kept byte for byte, so names that are not valid UTF-8 carry
/// over unchanged.
pub fn segment_file_name(base_name: &OsStr, index: usize) -> OsString {
    let mut name = base_name.to_os_string();
    name.push(format!(
        "{index:0width$}.{SEGMENT_EXTENSION}",
        width = INDEX_WIDTH
    ));
    name
}

/// Whether `path` carries an `.mp3` extension, ignoring case.
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(SEGMENT_EXTENSION))
        .unwrap_or(false)
}
