mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::error::ErrorKind;
use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, LevelFilter};
use mp3split_core::{plan_path, split_path, Config, Event, LogReporter, Reporter, LOG_TARGET};

use crate::cli::{build_cli, Args};

/// Forwards events to the log and, when enabled, advances a progress bar by
/// one step per handled segment.
struct CliReporter {
    log: LogReporter,
    progress: Option<ProgressBar>,
}

impl CliReporter {
    fn new(show_progress: bool) -> Self {
        let progress = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_draw_target(ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });

        Self {
            log: LogReporter,
            progress,
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
    }
}

impl Reporter for CliReporter {
    fn report(&mut self, event: Event<'_>) {
        self.log.report(event);

        let Some(bar) = &self.progress else {
            return;
        };
        match event {
            Event::TrackLoaded {
                path,
                duration,
                segments,
            } => {
                bar.reset();
                bar.set_length(segments as u64);
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                bar.set_message(format!("{name} ({})", HumanDuration(duration)));
            }
            Event::SegmentWritten { .. }
            | Event::SegmentOverwritten { .. }
            | Event::SegmentSkipped { .. }
            | Event::SegmentEmpty { .. } => bar.inc(1),
            _ => {}
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::builder(args.duration)
        .overwrite(args.overwrite)
        .build()
        .context("invalid segment duration")?;

    if args.dry_run {
        let plan = plan_path(&args.filename, &config, &mut LogReporter).with_context(|| {
            format!(
                "failed to plan segments for '{}'",
                args.filename.display()
            )
        })?;

        if plan.is_empty() {
            println!("Dry run: no segments would be generated.");
        } else {
            println!("Dry run: would generate {} segment(s):", plan.len());
            for segment in plan {
                println!(
                    "  {} [{} ms - {} ms]",
                    segment.path.display(),
                    segment.range.start,
                    segment.range.end
                );
            }
        }

        return Ok(());
    }

    let mut reporter = CliReporter::new(!args.verbose);
    let result = split_path(&args.filename, &config, &mut reporter)
        .with_context(|| format!("failed to split '{}'", args.filename.display()));
    reporter.finish();

    let batch = result?;
    debug!(
        target: LOG_TARGET,
        "{} file(s): {} segment(s) written, {} overwritten, {} skipped",
        batch.files.len(),
        batch.written,
        batch.overwritten,
        batch.skipped
    );

    Ok(())
}

fn main() -> ExitCode {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };
    let args = Args::from_matches(&matches);

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: LOG_TARGET, "{err:#}");
            ExitCode::FAILURE
        }
    }
}
