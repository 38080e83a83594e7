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
use std::time::Duration;

use tracing::warn;

use crate::error::LoopError;

pub mod buffer;

pub use buffer::SampleBuffer;

/// A fully decoded track held in memory.
///
/// All offsets handed to a track are frame indices, never byte or sample indices.
#[derive(Debug)]
pub struct Track {
    buffer: SampleBuffer,
    sample_rate: u32,
}

impl Track {
    /// Creates a track from interleaved samples.
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Track, LoopError> {
        Track::from_buffer(SampleBuffer::new(samples, channels)?, sample_rate)
    }

    /// Creates a track that owns the given buffer.
    pub fn from_buffer(buffer: SampleBuffer, sample_rate: u32) -> Result<Track, LoopError> {
        if sample_rate == 0 {
            return Err(LoopError::InvalidSampleRate);
        }

        Ok(Track {
            buffer,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.buffer.channels()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The length of the track in frames.
    pub fn total_frames(&self) -> usize {
        self.buffer.frames()
    }

    /// The whole track as one buffer.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// The playing time of the track.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_frames() as f64 / self.sample_rate as f64)
    }

    /// Converts a duration to a whole number of frames at this track's sample rate, rounding down.
    pub fn frames_for(&self, duration: Duration) -> usize {
        frames_for(duration, self.sample_rate)
    }

    /// Copies `duration` frames starting at `offset` out of the track.
    ///
    /// An offset past the end of the track is an error. A region that runs past the end is
    /// cut short and the returned region reports itself as truncated.
    pub fn read(&self, offset: usize, duration: usize) -> Result<Region, LoopError> {
        let total_frames = self.total_frames();
        if offset > total_frames {
            return Err(LoopError::InvalidRange {
                offset,
                total_frames,
            });
        }

        let available = total_frames - offset;
        let frames = duration.min(available);
        if frames < duration {
            warn!(
                offset,
                requested = duration,
                read = frames,
                "Reached the end of the track before reading all frames"
            );
        }

        let buffer = SampleBuffer::new(
            self.buffer.window(offset, frames).to_vec(),
            self.channels(),
        )?;

        Ok(Region {
            buffer,
            requested_frames: duration,
        })
    }
}

/// Converts a duration to a whole number of frames at the given sample rate, rounding down.
pub fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_nanos() * u128::from(sample_rate) / 1_000_000_000) as usize
}

/// The result of a track read. Owns its samples.
#[derive(Debug)]
pub struct Region {
    buffer: SampleBuffer,
    requested_frames: usize,
}

impl Region {
    /// True if fewer frames were available than were requested.
    pub fn is_truncated(&self) -> bool {
        self.buffer.frames() < self.requested_frames
    }

    pub fn requested_frames(&self) -> usize {
        self.requested_frames
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}
