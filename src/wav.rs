// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::info;

use crate::error::LoopError;
use crate::track::{SampleBuffer, Track};
use crate::util::duration_minutes_seconds;

/// Error types for WAV container operations
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Track(#[from] LoopError),
}

/// The header fields of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    spec: WavSpec,
    total_frames: u32,
}

impl WavInfo {
    /// Header fields for a 16-bit integer PCM file.
    pub fn pcm16(channels: u16, sample_rate: u32, total_frames: u32) -> WavInfo {
        WavInfo {
            spec: WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            total_frames,
        }
    }

    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Bytes per frame.
    pub fn block_align(&self) -> u32 {
        u32::from(self.spec.channels) * u32::from(self.spec.bits_per_sample).div_ceil(8)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.spec.sample_rate * self.block_align()
    }

    /// Size of the sample payload in bytes.
    pub fn data_size(&self) -> u64 {
        u64::from(self.total_frames) * u64::from(self.block_align())
    }

    pub fn duration(&self) -> Duration {
        if self.spec.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(f64::from(self.total_frames) / f64::from(self.spec.sample_rate))
    }
}

impl fmt::Display for WavInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.spec.sample_format {
            SampleFormat::Int => "int",
            SampleFormat::Float => "float",
        };
        writeln!(f, "Channels: {}", self.spec.channels)?;
        writeln!(f, "Sample rate: {}Hz", self.spec.sample_rate)?;
        writeln!(f, "Bits per sample: {}", self.spec.bits_per_sample)?;
        writeln!(f, "Sample format: {}", format)?;
        writeln!(f, "Byte rate: {}", self.byte_rate())?;
        writeln!(f, "Block align: {}", self.block_align())?;
        writeln!(f, "Frames: {}", self.total_frames)?;
        writeln!(f, "Data size: {} bytes", self.data_size())?;
        write!(f, "Duration: {}", duration_minutes_seconds(self.duration()))
    }
}

/// Reads only the header fields of a WAV file.
pub fn read_info<P: AsRef<Path>>(path: P) -> Result<WavInfo, WavError> {
    let reader = WavReader::open(path)?;
    Ok(WavInfo {
        spec: reader.spec(),
        total_frames: reader.duration(),
    })
}

/// Decodes a 16-bit integer PCM WAV file into a track.
pub fn read_track<P: AsRef<Path>>(path: P) -> Result<(Track, WavInfo), WavError> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(WavError::UnsupportedFormat(format!(
            "{}: only 16-bit integer PCM is supported, found {} bits",
            path.display(),
            spec.bits_per_sample
        )));
    }

    let total_frames = reader.duration();
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<i16>, hound::Error>>()?;
    let track = Track::new(samples, spec.channels, spec.sample_rate)?;
    info!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        frames = track.total_frames(),
        "Read track"
    );

    Ok((track, WavInfo { spec, total_frames }))
}

/// Writes a buffer using the format of the given headers. Size fields are recomputed from
/// the buffer, not taken from the headers.
pub fn write_track<P: AsRef<Path>>(
    path: P,
    info: &WavInfo,
    buffer: &SampleBuffer,
) -> Result<(), WavError> {
    if buffer.channels() != info.channels() {
        return Err(LoopError::ChannelMismatch {
            expected: info.channels(),
            actual: buffer.channels(),
        }
        .into());
    }

    let path = path.as_ref();
    let mut writer = WavWriter::create(path, info.spec)?;
    for sample in buffer.samples() {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    info!(path = %path.display(), frames = buffer.frames(), "Wrote track");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_wav_with_bits;

    #[test]
    fn test_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        let samples: Vec<i16> = (0..200).map(|i| (i * 37 - 3000) as i16).collect();
        let buffer = SampleBuffer::new(samples.clone(), 2)?;
        let info = WavInfo::pcm16(2, 8_000, 100);

        write_track(&path, &info, &buffer)?;
        let (track, read_info) = read_track(&path)?;

        assert_eq!(read_info, info);
        assert_eq!(track.channels(), 2);
        assert_eq!(track.sample_rate(), 8_000);
        assert_eq!(track.total_frames(), 100);
        assert_eq!(track.buffer().samples(), samples.as_slice());
        Ok(())
    }

    #[test]
    fn test_rejects_non_16_bit() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("float.wav");
        write_wav_with_bits(path.clone(), vec![vec![0.5f32, -0.5]], 44_100, 32)?;

        assert!(matches!(
            read_track(&path),
            Err(WavError::UnsupportedFormat(_))
        ));
        // Headers can still be inspected.
        let info = read_info(&path)?;
        assert_eq!(info.bits_per_sample(), 32);
        assert_eq!(info.total_frames(), 2);
        Ok(())
    }

    #[test]
    fn test_reads_interleaved_fixture() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        write_wav_with_bits(path.clone(), vec![vec![1i16, 2, 3], vec![-1i16, -2, -3]], 8_000, 16)?;

        let (track, info) = read_track(&path)?;
        assert_eq!(info.channels(), 2);
        assert_eq!(track.total_frames(), 3);
        assert_eq!(track.buffer().samples(), &[1, -1, 2, -2, 3, -3]);
        Ok(())
    }

    #[test]
    fn test_write_checks_channels() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = SampleBuffer::new(vec![1, 2, 3], 1).unwrap();
        let result = write_track(
            dir.path().join("out.wav"),
            &WavInfo::pcm16(2, 8_000, 0),
            &buffer,
        );
        assert!(matches!(
            result,
            Err(WavError::Track(LoopError::ChannelMismatch { .. }))
        ));
    }

    #[test]
    fn test_header_fields() {
        let info = WavInfo::pcm16(2, 44_100, 441_000);
        assert_eq!(info.block_align(), 4);
        assert_eq!(info.byte_rate(), 176_400);
        assert_eq!(info.data_size(), 1_764_000);
        assert_eq!(info.duration(), Duration::from_secs(10));

        let text = info.to_string();
        assert!(text.contains("Channels: 2"));
        assert!(text.contains("Sample rate: 44100Hz"));
        assert!(text.contains("Duration: 0:10"));
    }
}
