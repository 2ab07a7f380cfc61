mod duration;

use std::path::PathBuf;
use std::time::Duration;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};

pub use duration::parse_duration;

/// Segment length used when `--duration` is not given.
pub const DEFAULT_DURATION: &str = "600";

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split mp3 files into fixed-length segments")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("filename")
                .value_name("FILENAME")
                .help("mp3 file you want to split, or a directory of mp3 files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("DURATION")
                .help("Duration of each piece, in seconds or with units (e.g. 90, 1.5, 10m, 1m30s)")
                .default_value(DEFAULT_DURATION)
                .value_parser(ValueParser::new(parse_duration)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase verbosity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("overwrite")
                .short('o')
                .long("overwrite")
                .help("Overwrite output files if they exist")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print the segments that would be written without creating anything")
                .action(ArgAction::SetTrue),
        )
}

/// Parsed command line.
#[derive(Clone, Debug)]
pub struct Args {
    pub filename: PathBuf,
    pub duration: Duration,
    pub verbose: bool,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl Args {
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            filename: matches
                .get_one::<PathBuf>("filename")
                .cloned()
                .unwrap_or_default(),
            duration: matches
                .get_one::<Duration>("duration")
                .copied()
                .unwrap_or_default(),
            verbose: matches.get_flag("verbose"),
            overwrite: matches.get_flag("overwrite"),
            dry_run: matches.get_flag("dry-run"),
        }
    }
}
