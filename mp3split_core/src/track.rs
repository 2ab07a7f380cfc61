//! Decoded MP3 tracks and millisecond slicing.
//!
//! An MPEG audio stream is a sequence of frames that each carry their own
//! header, so a run of consecutive frames is itself a playable MP3 stream.
//! [`Track::open`] runs every frame through the decoder to establish the
//! timeline and keeps the frames that decode; [`Segment::write_to`] writes a
//! slice of them back out without touching the bitstream.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_MP3};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::report::{Event, Reporter};
use crate::AudioSplitError;

#[derive(Debug)]
struct Frame {
    /// Position of the first sample of this frame within the track.
    start: u64,
    data: Box<[u8]>,
}

/// A decoded MP3 file held in memory.
#[derive(Debug)]
pub struct Track {
    sample_rate: u32,
    total_samples: u64,
    /// Longest decoded frame, in samples.
    frame_samples: u64,
    frames: Vec<Frame>,
}

impl Track {
    /// Decode the MP3 file at `path`.
    pub fn open(path: &Path, reporter: &mut dyn Reporter) -> Result<Self, AudioSplitError> {
        reporter.report(Event::Opening { path });

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let file = File::open(path).map_err(|source| AudioSplitError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or(AudioSplitError::MissingDefaultTrack)?;
        if track.codec_params.codec != CODEC_TYPE_MP3 {
            return Err(AudioSplitError::UnsupportedCodec);
        }
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or(AudioSplitError::MissingSampleRate)?;
        let track_id = track.id;

        let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut frames = Vec::new();
        let mut position: u64 = 0;
        let mut frame_samples: u64 = 0;

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                    break
                }
                Err(err) => return Err(err.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded_frames = match decoder.decode(&packet) {
                Ok(decoded) => decoded.frames() as u64,
                Err(SymphoniaError::DecodeError(reason)) => {
                    reporter.report(Event::FrameDropped { path, reason });
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            frames.push(Frame {
                start: position,
                data: packet.data,
            });
            position += decoded_frames;
            frame_samples = frame_samples.max(decoded_frames);
        }

        Ok(Self {
            sample_rate,
            total_samples: position,
            frame_samples,
            frames,
        })
    }

    /// Sample rate of the decoded audio.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of MPEG frames kept from the source.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Playing time of the decoded audio.
    pub fn duration(&self) -> Duration {
        let rate = u64::from(self.sample_rate);
        let secs = self.total_samples / rate;
        let nanos = (self.total_samples % rate) * 1_000_000_000 / rate;
        Duration::new(secs, nanos as u32)
    }

    /// Playing time in milliseconds, rounded up so a sub-millisecond tail
    /// still counts toward the last segment.
    pub fn length_ms(&self) -> u64 {
        let rate = u128::from(self.sample_rate);
        let ms = (u128::from(self.total_samples) * 1_000 + rate - 1) / rate;
        ms.try_into().unwrap_or(u64::MAX)
    }

    /// Playing time of the longest frame in milliseconds, rounded up.
    ///
    /// Frame starts, truncated to milliseconds, are never further apart than
    /// this, so every range at least this long that begins before the last
    /// frame start holds a frame.
    pub fn frame_ms(&self) -> u64 {
        let rate = u128::from(self.sample_rate);
        let ms = (u128::from(self.frame_samples) * 1_000 + rate - 1) / rate;
        ms.try_into().unwrap_or(u64::MAX)
    }

    /// Frames whose first sample falls inside `[range.start, range.end)`
    /// milliseconds.
    ///
    /// Adjacent ranges yield adjacent, non-overlapping segments.
    pub fn slice(&self, range: Range<u64>) -> Segment<'_> {
        let first = self
            .frames
            .partition_point(|frame| self.samples_to_ms(frame.start) < range.start);
        let last = self
            .frames
            .partition_point(|frame| self.samples_to_ms(frame.start) < range.end)
            .max(first);

        Segment {
            range,
            frames: &self.frames[first..last],
        }
    }

    fn samples_to_ms(&self, samples: u64) -> u64 {
        let ms = u128::from(samples) * 1_000 / u128::from(self.sample_rate);
        ms.try_into().unwrap_or(u64::MAX)
    }
}

/// A millisecond range of a [`Track`].
#[derive(Debug)]
pub struct Segment<'a> {
    range: Range<u64>,
    frames: &'a [Frame],
}

impl Segment<'_> {
    /// Millisecond range requested for this segment.
    pub fn range(&self) -> Range<u64> {
        self.range.clone()
    }

    /// Number of MPEG frames in the segment.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Write the segment as a standalone MP3 stream, replacing `path` if it
    /// exists.
    ///
    /// Frames are copied verbatim, not re-encoded. A frame whose
    /// `main_data_begin` points back into the bit reservoir depends on bytes of
    /// the frame before it; when that frame opens a segment other than the
    /// first, players mute or drop it (about 26 ms at 44.1 kHz).
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut output = BufWriter::new(File::create(path)?);
        for frame in self.frames {
            output.write_all(&frame.data)?;
        }
        output.flush()
    }
}
