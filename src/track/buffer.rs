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
use crate::error::LoopError;

/// An owned run of interleaved 16-bit samples.
///
/// Samples are stored frame by frame: for a stereo buffer the layout is
/// L, R, L, R, ... The sample count is always a whole number of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    channels: u16,
}

impl SampleBuffer {
    /// Creates a buffer from interleaved samples.
    pub fn new(samples: Vec<i16>, channels: u16) -> Result<SampleBuffer, LoopError> {
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(LoopError::InvalidBuffer {
                samples: samples.len(),
                channels,
            });
        }

        Ok(SampleBuffer { samples, channels })
    }

    /// Creates an empty buffer with room for the given number of frames.
    pub(crate) fn with_capacity(channels: u16, frames: usize) -> SampleBuffer {
        SampleBuffer {
            samples: Vec::with_capacity(frames * channels as usize),
            channels,
        }
    }

    /// The number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// The number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The raw interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Returns all channels of the frame at the given index.
    pub fn frame(&self, index: usize) -> Option<&[i16]> {
        let channels = self.channels as usize;
        let start = index.checked_mul(channels)?;
        self.samples.get(start..start + channels)
    }

    /// Returns a single sample addressed by frame and channel.
    pub fn sample(&self, frame: usize, channel: u16) -> Option<i16> {
        if channel >= self.channels {
            return None;
        }
        self.frame(frame).map(|f| f[channel as usize])
    }

    /// Returns the interleaved samples of `frames` frames starting at `start`.
    /// The view is cut short at the end of the buffer.
    pub fn window(&self, start: usize, frames: usize) -> &[i16] {
        let channels = self.channels as usize;
        let len = self.samples.len();
        let from = start.saturating_mul(channels).min(len);
        let to = start
            .saturating_add(frames)
            .saturating_mul(channels)
            .min(len);
        &self.samples[from..to]
    }

    /// Appends every frame of another buffer with the same channel layout.
    pub fn append(&mut self, other: &SampleBuffer) -> Result<(), LoopError> {
        if other.channels != self.channels {
            return Err(LoopError::ChannelMismatch {
                expected: self.channels,
                actual: other.channels,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_partial_frames() {
        assert_eq!(
            SampleBuffer::new(vec![1, 2, 3], 2),
            Err(LoopError::InvalidBuffer {
                samples: 3,
                channels: 2
            })
        );
        assert!(SampleBuffer::new(vec![1, 2], 0).is_err());
        assert!(SampleBuffer::new(vec![], 2).unwrap().is_empty());
    }

    #[test]
    fn test_frame_accessors() {
        let buffer = SampleBuffer::new(vec![1, -1, 2, -2, 3, -3], 2).unwrap();
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.frame(1), Some(&[2, -2][..]));
        assert_eq!(buffer.frame(3), None);
        assert_eq!(buffer.sample(2, 1), Some(-3));
        assert_eq!(buffer.sample(0, 2), None);
    }

    #[test]
    fn test_window_is_channel_aligned() {
        let buffer = SampleBuffer::new(vec![0, 1, 2, 3, 4, 5, 6, 7], 2).unwrap();
        assert_eq!(buffer.window(1, 2), &[2, 3, 4, 5]);
        // Cut short at the end.
        assert_eq!(buffer.window(3, 5), &[6, 7]);
        assert!(buffer.window(10, 5).is_empty());
    }

    #[test]
    fn test_append_checks_channels() {
        let mut buffer = SampleBuffer::new(vec![1, 2], 2).unwrap();
        buffer
            .append(&SampleBuffer::new(vec![3, 4], 2).unwrap())
            .unwrap();
        assert_eq!(buffer.samples(), &[1, 2, 3, 4]);

        let mono = SampleBuffer::new(vec![5], 1).unwrap();
        assert_eq!(
            buffer.append(&mono),
            Err(LoopError::ChannelMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
