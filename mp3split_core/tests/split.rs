use mp3split_core::{
    plan_path, split_directory, split_file, split_path, AudioSplitError, Config, Event,
    SilentReporter, Track,
};
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, no CRC, no padding, mono.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
/// 144 * 128000 / 44100, header included.
const FRAME_LEN: usize = 417;
const SAMPLES_PER_FRAME: u64 = 1_152;
const SAMPLE_RATE: u64 = 44_100;

/// Write `frames` silent MP3 frames to `path`.
///
/// Each frame is a valid header followed by zeroed side information and main
/// data, which decodes to silence. Generating the fixtures keeps binary
/// assets out of the repository.
fn write_silent_mp3<P: AsRef<Path>>(path: P, frames: usize) -> Result<(), Box<dyn Error>> {
    let mut frame = vec![0u8; FRAME_LEN];
    frame[..FRAME_HEADER.len()].copy_from_slice(&FRAME_HEADER);

    let mut file = File::create(path)?;
    for _ in 0..frames {
        file.write_all(&frame)?;
    }
    Ok(())
}

fn frame_start_ms(frame: u64) -> u64 {
    frame * SAMPLES_PER_FRAME * 1_000 / SAMPLE_RATE
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    entries.sort();
    Ok(entries)
}

#[test]
fn track_reports_duration_of_decoded_frames() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("tone.mp3");
    write_silent_mp3(&input, 100)?;

    let track = Track::open(&input, &mut SilentReporter)?;
    assert_eq!(track.sample_rate(), 44_100);
    assert_eq!(track.frame_count(), 100);
    // 115_200 samples at 44.1 kHz is 2612.24 ms; the partial millisecond counts.
    assert_eq!(track.length_ms(), 2_613);
    assert_eq!(track.frame_ms(), 27);

    let first = track.slice(0..1_000);
    let second = track.slice(1_000..2_000);
    let third = track.slice(2_000..2_613);
    assert_eq!(third.range(), 2_000..2_613);
    assert_eq!(
        first.frame_count() + second.frame_count() + third.frame_count(),
        100
    );
    assert!(third.frame_count() < first.frame_count());
    Ok(())
}

#[test]
fn split_writes_numbered_segments_with_short_remainder() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 100)?;

    let config = Config::new(Duration::from_secs(1))?;
    let summary = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(summary.segments, 3);
    assert_eq!(summary.written, 3);

    let output_dir = work_dir.path().join("song");
    let outputs = sorted_entries(&output_dir)?;
    let names: Vec<_> = outputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["song001.mp3", "song002.mp3", "song003.mp3"]);

    // A frame lands in the segment that contains its first sample.
    let frames_per_segment: Vec<u64> = [0..1_000u64, 1_000..2_000, 2_000..2_613]
        .iter()
        .map(|range| {
            (0..100u64)
                .filter(|&frame| range.contains(&frame_start_ms(frame)))
                .count() as u64
        })
        .collect();
    assert_eq!(frames_per_segment, [39, 38, 23]);

    for (path, frames) in outputs.iter().zip(frames_per_segment) {
        assert_eq!(fs::metadata(path)?.len(), frames * FRAME_LEN as u64);
    }

    // Every segment is a playable stream on its own.
    for path in &outputs {
        let segment = Track::open(path, &mut SilentReporter)?;
        assert!(segment.length_ms() <= 1_000 + 27);
    }
    Ok(())
}

#[test]
fn rerun_without_overwrite_keeps_existing_files() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 60)?;

    let config = Config::new(Duration::from_millis(500))?;
    split_file(&input, &config, &mut SilentReporter)?;

    let first = work_dir.path().join("song").join("song001.mp3");
    fs::write(&first, b"sentinel")?;
    let before: Vec<Vec<u8>> = sorted_entries(&work_dir.path().join("song"))?
        .iter()
        .map(fs::read)
        .collect::<Result<_, _>>()?;

    let mut skipped = Vec::new();
    let mut reporter = |event: Event<'_>| {
        if let Event::SegmentSkipped { index, .. } = event {
            skipped.push(index);
        }
    };
    let summary = split_file(&input, &config, &mut reporter)?;
    assert_eq!(summary.skipped, summary.segments);
    assert_eq!(summary.written, 0);
    assert_eq!(skipped, (1..=summary.segments).collect::<Vec<_>>());

    let after: Vec<Vec<u8>> = sorted_entries(&work_dir.path().join("song"))?
        .iter()
        .map(fs::read)
        .collect::<Result<_, _>>()?;
    assert_eq!(before, after);
    assert_eq!(fs::read(&first)?, b"sentinel");
    Ok(())
}

#[test]
fn rerun_with_overwrite_replaces_every_file() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 60)?;

    let config = Config::builder(Duration::from_millis(500))
        .overwrite(true)
        .build()?;
    let initial = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(initial.written, initial.segments);

    let outputs = sorted_entries(&work_dir.path().join("song"))?;
    for path in &outputs {
        fs::write(path, b"stale")?;
    }

    let summary = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(summary.overwritten, summary.segments);
    for path in &outputs {
        assert_ne!(fs::read(path)?, b"stale");
    }
    Ok(())
}

#[test]
fn segments_shorter_than_a_frame_are_rejected() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("blip.mp3");
    write_silent_mp3(&input, 5)?;

    let config = Config::new(Duration::from_millis(20))?;
    let err = split_file(&input, &config, &mut SilentReporter)
        .expect_err("20 ms is shorter than a 26.1 ms frame");
    match err {
        AudioSplitError::SegmentShorterThanFrame {
            segment_ms,
            frame_ms,
        } => {
            assert_eq!(segment_ms, 20);
            assert_eq!(frame_ms, 27);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!work_dir.path().join("blip").exists());

    let err = plan_path(&input, &config, &mut SilentReporter).unwrap_err();
    assert!(matches!(err, AudioSplitError::SegmentShorterThanFrame { .. }));

    // At one frame length only the slice past the last frame start is empty,
    // so the written files are numbered without gaps.
    let config = Config::new(Duration::from_millis(27))?;
    let summary = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(summary.segments, 5);
    assert_eq!(summary.written, 4);
    assert_eq!(summary.empty, 1);

    let output_dir = work_dir.path().join("blip");
    let expected: Vec<_> = (1..=4)
        .map(|index| output_dir.join(format!("blip{index:03}.mp3")))
        .collect();
    assert_eq!(sorted_entries(&output_dir)?, expected);
    Ok(())
}

#[test]
fn sub_millisecond_tail_gets_its_own_trailing_slice() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 100)?;

    // The track runs 2612.24 ms, so a 2612 ms length leaves a final slice
    // that starts after the last frame.
    let config = Config::new(Duration::from_millis(2_612))?;
    let plan = plan_path(&input, &config, &mut SilentReporter)?;
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[1].range, 2_612..2_613);

    let summary = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(summary.segments, 2);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.empty, 1);

    let output_dir = work_dir.path().join("song");
    assert_eq!(sorted_entries(&output_dir)?, [output_dir.join("song001.mp3")]);
    Ok(())
}

#[test]
fn segments_are_verbatim_frame_runs_of_the_source() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 100)?;

    let config = Config::new(Duration::from_secs(1))?;
    split_file(&input, &config, &mut SilentReporter)?;

    let source = fs::read(&input)?;
    let output_dir = work_dir.path().join("song");
    let first = fs::read(output_dir.join("song001.mp3"))?;
    let second = fs::read(output_dir.join("song002.mp3"))?;
    assert_eq!(first, source[..39 * FRAME_LEN]);
    assert_eq!(second, source[39 * FRAME_LEN..77 * FRAME_LEN]);
    Ok(())
}

#[test]
fn segment_write_failure_aborts_the_split() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 100)?;

    let output_dir = work_dir.path().join("song");
    fs::create_dir_all(output_dir.join("song002.mp3"))?;

    let config = Config::new(Duration::from_secs(1))?;
    let err = split_file(&input, &config, &mut SilentReporter)
        .expect_err("a directory blocks the second segment");
    match err {
        AudioSplitError::WriteSegment { path, .. } => {
            assert_eq!(path, output_dir.join("song002.mp3"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(output_dir.join("song001.mp3").is_file());
    assert!(output_dir.join("song002.mp3").is_dir());
    assert!(!output_dir.join("song003.mp3").exists());
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_file_names_are_carried_into_segment_names() -> Result<(), Box<dyn Error>> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let work_dir = tempdir()?;
    let input = work_dir.path().join(OsStr::from_bytes(b"caf\xe9.mp3"));
    write_silent_mp3(&input, 40)?;

    let config = Config::new(Duration::from_secs(1))?;
    let summary = split_file(&input, &config, &mut SilentReporter)?;
    assert_eq!(summary.written, 2);

    let output_dir = work_dir.path().join(OsStr::from_bytes(b"caf\xe9"));
    assert_eq!(
        sorted_entries(&output_dir)?,
        [
            output_dir.join(OsStr::from_bytes(b"caf\xe9001.mp3")),
            output_dir.join(OsStr::from_bytes(b"caf\xe9002.mp3")),
        ]
    );
    Ok(())
}

#[test]
fn split_reports_unsupported_format_for_garbage() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("fake.mp3");
    File::create(&input)?.write_all(b"not an audio file")?;

    let config = Config::new(Duration::from_secs(1))?;
    let err = split_file(&input, &config, &mut SilentReporter)
        .expect_err("garbage input should fail");
    assert!(matches!(err, AudioSplitError::UnsupportedFormat));
    assert!(!work_dir.path().join("fake").exists());
    Ok(())
}

#[test]
fn directory_split_only_touches_mp3_files() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let dir = work_dir.path();
    write_silent_mp3(dir.join("a.mp3"), 40)?;
    fs::write(dir.join("b.wav"), b"RIFF")?;
    write_silent_mp3(dir.join("c.MP3"), 40)?;
    fs::create_dir(dir.join("nested"))?;
    write_silent_mp3(dir.join("nested").join("d.mp3"), 40)?;

    let mut ignored = Vec::new();
    let mut reporter = |event: Event<'_>| {
        if let Event::FileIgnored { path } = event {
            ignored.push(path.to_path_buf());
        }
    };
    let config = Config::new(Duration::from_secs(60))?;
    let batch = split_directory(dir, &config, &mut reporter)?;

    assert_eq!(batch.files, [dir.join("a.mp3"), dir.join("c.MP3")]);
    assert_eq!(batch.ignored, [dir.join("b.wav")]);
    assert_eq!(ignored, [dir.join("b.wav")]);
    assert_eq!(batch.written, 2);

    assert!(dir.join("a").join("a001.mp3").is_file());
    assert!(dir.join("c").join("c001.mp3").is_file());
    assert!(!dir.join("b").exists());
    assert!(!dir.join("nested").join("d").exists());
    Ok(())
}

#[test]
fn directory_split_stops_at_first_failure() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let dir = work_dir.path();
    write_silent_mp3(dir.join("a.mp3"), 40)?;
    fs::write(dir.join("b.mp3"), b"definitely not mpeg audio")?;
    write_silent_mp3(dir.join("c.mp3"), 40)?;

    let config = Config::new(Duration::from_secs(1))?;
    let err = split_path(dir, &config, &mut SilentReporter)
        .expect_err("the corrupt file aborts the batch");
    assert!(matches!(err, AudioSplitError::UnsupportedFormat));

    assert!(dir.join("a").join("a001.mp3").is_file());
    assert!(!dir.join("c").exists());
    Ok(())
}

#[test]
fn split_path_validates_input_before_touching_disk() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let config = Config::new(Duration::from_secs(1))?;

    let missing = work_dir.path().join("missing.mp3");
    let err = split_path(&missing, &config, &mut SilentReporter).unwrap_err();
    assert!(matches!(err, AudioSplitError::MissingInput(_)));

    let wav = work_dir.path().join("tone.wav");
    fs::write(&wav, b"RIFF")?;
    let err = split_path(&wav, &config, &mut SilentReporter).unwrap_err();
    assert!(matches!(err, AudioSplitError::UnsupportedExtension(_)));

    assert_eq!(sorted_entries(work_dir.path())?, [wav]);
    Ok(())
}

#[test]
fn plan_lists_segments_without_writing() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input = work_dir.path().join("song.mp3");
    write_silent_mp3(&input, 100)?;

    let config = Config::new(Duration::from_secs(1))?;
    let plan = plan_path(&input, &config, &mut SilentReporter)?;

    let output_dir = work_dir.path().join("song");
    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].path, output_dir.join("song001.mp3"));
    assert_eq!(plan[2].path, output_dir.join("song003.mp3"));
    assert_eq!(plan[0].range, 0..1_000);
    assert_eq!(plan[2].range, 2_000..2_613);
    assert!(!output_dir.exists());
    Ok(())
}
