//! Audio decoding and duration probing using symphonia.

use crate::constants::time::MS_PER_SECOND;
use crate::error::{Error, Result};
use crate::pipeline::CancelToken;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, SeekMode, SeekTo, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::debug;

/// Sample layout of a decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    let ms = u128::from(frames) * u128::from(MS_PER_SECOND) / u128::from(sample_rate);
    u64::try_from(ms).unwrap_or(u64::MAX)
}

fn ms_to_frame(ms: u64, sample_rate: u32) -> u64 {
    let frame = u128::from(ms) * u128::from(sample_rate) / u128::from(MS_PER_SECOND);
    u64::try_from(frame).unwrap_or(u64::MAX)
}

/// Convert a packet timestamp to a frame position.
fn ts_to_frame(ts: u64, time_base: Option<TimeBase>, sample_rate: u32) -> u64 {
    match time_base {
        Some(tb) if !(tb.numer == 1 && tb.denom == sample_rate) => {
            let time = tb.calc_time(ts);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let frac = (time.frac * f64::from(sample_rate)).round() as u64;
            time.seconds * u64::from(sample_rate) + frac
        }
        _ => ts,
    }
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    Ok(probed.format)
}

fn first_audio_track(format: &dyn FormatReader, path: &Path) -> Result<Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .cloned()
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })
}

/// Next packet, or `None` at end of stream.
fn next_packet(format: &mut dyn FormatReader, path: &Path) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        Err(e) => Err(Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        }),
    }
}

/// Determine the total duration of an audio file in milliseconds.
///
/// Uses the frame count from the container header when present and falls
/// back to summing packet durations.
pub fn probe_duration_ms(path: &Path) -> Result<u64> {
    let mut format = open_format(path)?;
    let track = first_audio_track(format.as_ref(), path)?;
    let params = &track.codec_params;

    if let (Some(n_frames), Some(sample_rate)) = (params.n_frames, params.sample_rate) {
        return Ok(frames_to_ms(n_frames, sample_rate));
    }

    debug!("No frame count in header of {}, scanning packets", path.display());

    let mut total_ts: u64 = 0;
    while let Some(packet) = next_packet(format.as_mut(), path)? {
        if packet.track_id() == track.id {
            total_ts = total_ts.saturating_add(packet.dur());
        }
    }

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(total_ts);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frac_ms = (time.frac * 1000.0) as u64;
        return Ok(time.seconds * MS_PER_SECOND + frac_ms);
    }

    if let Some(sample_rate) = params.sample_rate {
        return Ok(frames_to_ms(total_ts, sample_rate));
    }

    Err(Error::DurationUnknown {
        path: path.to_path_buf(),
    })
}

/// Decode the frames between `start_ms` and `end_ms` of the first audio
/// track, handing interleaved f32 chunks to `sink` as they are decoded.
///
/// Only one packet is held in memory at a time. The reader seeks close to
/// `start_ms` and trims packet edges so the output starts and ends on the
/// exact frames. Returns the stream layout, which is also known when no frame
/// fell inside the range.
pub fn decode_range(
    path: &Path,
    start_ms: u64,
    end_ms: u64,
    cancel: &CancelToken,
    mut sink: impl FnMut(&[f32], PcmFormat) -> Result<()>,
) -> Result<PcmFormat> {
    let mut format = open_format(path)?;
    let track = first_audio_track(format.as_ref(), path)?;
    let params = &track.codec_params;

    let sample_rate = params.sample_rate.ok_or_else(|| Error::AudioDecode {
        path: path.to_path_buf(),
        source: "missing sample rate".into(),
    })?;
    #[allow(clippy::cast_possible_truncation)]
    let mut layout = PcmFormat {
        sample_rate,
        channels: params.channels.map_or(1, |c| c.count().max(1) as u16),
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let start = ms_to_frame(start_ms, sample_rate);
    let end = ms_to_frame(end_ms, sample_rate);
    if end <= start {
        return Ok(layout);
    }

    if start > 0 {
        #[allow(clippy::cast_precision_loss)]
        let frac = (start_ms % MS_PER_SECOND) as f64 / MS_PER_SECOND as f64;
        let time = Time::new(start_ms / MS_PER_SECOND, frac);
        let seek = format.seek(
            SeekMode::Accurate,
            SeekTo::Time {
                time,
                track_id: Some(track.id),
            },
        );
        match seek {
            Ok(_) => decoder.reset(),
            // Packet timestamps still place every frame; we just read more
            Err(e) => debug!("Seek failed in {}, decoding from the start: {e}", path.display()),
        }
    }

    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    while let Some(packet) = next_packet(format.as_mut(), path)? {
        cancel.check()?;

        if packet.track_id() != track.id {
            continue;
        }

        let first = ts_to_frame(packet.ts(), params.time_base, sample_rate);
        if first >= end {
            break;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame; skip it
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet in {}: {e}", path.display());
                continue;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        let spec = *decoded.spec();
        let frames = decoded.frames() as u64;
        if first + frames <= start {
            continue;
        }

        let channels = spec.channels.count();
        #[allow(clippy::cast_possible_truncation)]
        let channel_count = channels as u16;
        layout.channels = channel_count;

        let needed = decoded.capacity() * channels;
        if sample_buf.as_ref().is_none_or(|b| b.capacity() < needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        #[allow(clippy::cast_possible_truncation)]
        let (from, to) = (
            start.saturating_sub(first) as usize,
            (end.min(first + frames) - first) as usize,
        );
        sink(&buf.samples()[from * channels..to * channels], layout)?;
    }

    Ok(layout)
}
