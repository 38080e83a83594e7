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

/// Errors raised by the loop search and composition core.
///
/// All of these are structural: the same input always produces the same error,
/// so callers never retry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("offset {offset} is outside of the track ({total_frames} frames)")]
    InvalidRange { offset: usize, total_frames: usize },

    #[error("loop region is empty or inverted (start {start}, end {end})")]
    DegenerateLoop { start: usize, end: usize },

    #[error("track has {total_frames} frames, at least {required_frames} are needed to search")]
    InsufficientTrackLength {
        total_frames: usize,
        required_frames: usize,
    },

    #[error("buffer has {actual} channels, expected {expected}")]
    ChannelMismatch { expected: u16, actual: u16 },

    #[error("{samples} samples cannot be split into frames of {channels} channels")]
    InvalidBuffer { samples: usize, channels: u16 },

    #[error("sample rate must be greater than 0")]
    InvalidSampleRate,

    #[error("loop search was cancelled")]
    Cancelled,
}

/// Errors raised while extending a file on disk.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Loop(#[from] LoopError),

    #[error(transparent)]
    Wav(#[from] crate::wav::WavError),

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
