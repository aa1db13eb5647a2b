//! Segment encoders.

use super::SegmentEncoder;
use super::decode::{PcmFormat, decode_range};
use super::process::run_tool;
use crate::config::{OutputFormat, Quality};
use crate::constants::export::WAV_BITS_PER_SAMPLE;
use crate::constants::time::MS_PER_SECOND;
use crate::error::{Error, Result};
use crate::pipeline::CancelToken;
use crate::segments::Segment;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Build the encoder for an output format.
pub fn encoder_for(format: OutputFormat, ffmpeg: &Path, quality: Quality) -> Box<dyn SegmentEncoder> {
    match format {
        OutputFormat::Mp3 => Box::new(FfmpegMp3Encoder::new(ffmpeg, quality)),
        OutputFormat::Wav => Box::new(WavEncoder::new()),
    }
}

/// Cuts and re-encodes segments to MP3 with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegMp3Encoder {
    program: PathBuf,
    quality: Quality,
}

impl FfmpegMp3Encoder {
    /// Create an encoder running the given ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>, quality: Quality) -> Self {
        Self {
            program: program.into(),
            quality,
        }
    }

    fn build_command(&self, audio: &Path, segment: &Segment, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
            .arg("-ss")
            .arg(seconds_arg(segment.start_ms))
            .arg("-i")
            .arg(audio)
            .arg("-t")
            .arg(seconds_arg(segment.duration_ms()))
            .args(["-map", "0:a:0", "-vn", "-c:a", "libmp3lame"])
            .arg("-b:a")
            .arg(self.quality.bitrate_arg())
            .arg("-metadata")
            .arg(format!("title={}", segment.label))
            .arg("-metadata")
            .arg(format!("track={}", segment.index))
            .args(["-f", "mp3"])
            .arg(output);
        command
    }
}

impl SegmentEncoder for FfmpegMp3Encoder {
    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn encode(
        &self,
        audio: &Path,
        segment: &Segment,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        let result = run_tool(self.build_command(audio, segment, output), cancel, |_, _| {})?;

        if result.status.success() {
            Ok(())
        } else {
            Err(Error::EncodeFailed {
                path: output.to_path_buf(),
                reason: format!("ffmpeg {}", result.failure_reason()),
            })
        }
    }
}

/// Format milliseconds as an ffmpeg seconds argument, e.g. `90.250`.
fn seconds_arg(ms: u64) -> String {
    format!("{}.{:03}", ms / MS_PER_SECOND, ms % MS_PER_SECOND)
}

/// Writes segments as 16-bit PCM WAV without external tools.
///
/// Each segment is decoded straight into its file, so memory use does not
/// grow with the length of the recording.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    /// Create a WAV encoder.
    pub fn new() -> Self {
        Self
    }
}

impl SegmentEncoder for WavEncoder {
    fn extension(&self) -> &'static str {
        "wav"
    }

    fn encode(
        &self,
        audio: &Path,
        segment: &Segment,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        let wav_error = |e| Error::WavWriteFailed {
            path: output.to_path_buf(),
            source: e,
        };

        debug!("Decoding {} for {}", audio.display(), segment.file_stem());
        let mut writer: Option<WavWriter<BufWriter<File>>> = None;
        let layout = decode_range(
            audio,
            segment.start_ms,
            segment.end_ms,
            cancel,
            |samples, layout| {
                if writer.is_none() {
                    writer = Some(WavWriter::create(output, wav_spec(layout)).map_err(wav_error)?);
                }
                match writer.as_mut() {
                    Some(writer) => write_samples(writer, samples).map_err(wav_error),
                    None => Ok(()),
                }
            },
        )?;

        let writer = match writer {
            Some(writer) => writer,
            None => WavWriter::create(output, wav_spec(layout)).map_err(wav_error)?,
        };
        writer.finalize().map_err(wav_error)
    }
}

fn wav_spec(layout: PcmFormat) -> WavSpec {
    WavSpec {
        channels: layout.channels,
        sample_rate: layout.sample_rate,
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Convert interleaved f32 samples to i16 and append them.
fn write_samples<W>(writer: &mut WavWriter<W>, samples: &[f32]) -> hound::Result<()>
where
    W: Write + Seek,
{
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let sample_i16 = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(sample_i16)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn segment(start_ms: u64, end_ms: u64) -> Segment {
        Segment {
            index: 1,
            label: "Intro".to_string(),
            start_ms,
            end_ms,
        }
    }

    fn write_mono_wav(path: &Path, sample_rate: u32, frames: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..frames {
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_seconds_arg() {
        assert_eq!(seconds_arg(0), "0.000");
        assert_eq!(seconds_arg(90_250), "90.250");
        assert_eq!(seconds_arg(3_723_007), "3723.007");
    }

    #[test]
    fn test_ffmpeg_command_cuts_segment() {
        let encoder = FfmpegMp3Encoder::new("ffmpeg", Quality::Kbps256);
        let command = encoder.build_command(
            Path::new("audio_temp.mp3"),
            &segment(60_000, 90_000),
            Path::new("out/01 - Intro.mp3.part"),
        );

        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "60.000");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "30.000");
        assert!(args.contains(&"256k".to_string()));
        assert!(args.contains(&"title=Intro".to_string()));
        assert_eq!(args.last().unwrap(), "out/01 - Intro.mp3.part");
    }

    #[test]
    fn test_encoder_for_format() {
        let ffmpeg = Path::new("ffmpeg");
        assert_eq!(encoder_for(OutputFormat::Mp3, ffmpeg, Quality::Kbps320).extension(), "mp3");
        assert_eq!(encoder_for(OutputFormat::Wav, ffmpeg, Quality::Kbps320).extension(), "wav");
    }

    #[test]
    fn test_wav_encoder_writes_segment_frames() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.wav");
        write_mono_wav(&source, 1000, 3000);

        let encoder = WavEncoder::new();
        assert_eq!(encoder.probe_duration_ms(&source).unwrap(), 3000);

        let output = dir.path().join("01 - Intro.wav");
        encoder
            .encode(&source, &segment(1000, 2500), &output, &CancelToken::new())
            .unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().sample_rate, 1000);
        assert_eq!(reader.duration(), 1500);
    }

    #[test]
    fn test_wav_encoder_segments_tile_the_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.wav");
        write_mono_wav(&source, 1000, 3000);

        let encoder = WavEncoder::new();
        let mut total = 0;
        for (i, (start, end)) in [(0, 1250), (1250, 2000), (2000, 3000)].into_iter().enumerate() {
            let output = dir.path().join(format!("{i}.wav"));
            encoder
                .encode(&source, &segment(start, end), &output, &CancelToken::new())
                .unwrap();
            total += hound::WavReader::open(&output).unwrap().duration();
        }
        assert_eq!(total, 3000);
    }

    #[test]
    fn test_wav_encoder_honours_cancellation() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.wav");
        write_mono_wav(&source, 1000, 2000);

        let cancel = CancelToken::new();
        cancel.cancel();

        let result = WavEncoder::new().encode(
            &source,
            &segment(0, 2000),
            &dir.path().join("out.wav"),
            &cancel,
        );
        assert!(matches!(result, Err(Error::Interrupted)));
    }
}
