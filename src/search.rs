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

use crate::error::LoopError;

pub mod candidate;
pub mod refine;
pub mod scorer;


pub use candidate::{find_loop, scan_window, Candidate, SearchResult};
pub use refine::{refine, Alignment};
pub use scorer::{channel_stride, score, WindowScore};

/// The frame range `[start, end)` that gets repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSpec {
    start: usize,
    end: usize,
}

impl LoopSpec {
    /// Creates a loop spec. The end must lie strictly after the start.
    pub fn new(start: usize, end: usize) -> Result<LoopSpec, LoopError> {
        if end <= start {
            return Err(LoopError::DegenerateLoop { start, end });
        }
        Ok(LoopSpec { start, end })
    }

    /// The first frame of the loop.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The first frame after the loop.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The loop length in frames.
    pub fn frames(&self) -> usize {
        self.end - self.start
    }
}

impl fmt::Display for LoopSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Frame-based search parameters for one track, resolved from the search configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Window sizes to run the coarse scan with, smallest first.
    pub window_sizes: Vec<usize>,
    /// Distance between coarse scan positions. Must not exceed the sample rate.
    pub step: usize,
    /// Scorer stride used by the coarse scan, in samples.
    pub coarse_stride: usize,
    /// Scorer stride used for refinement and re-scoring, in samples.
    pub fine_stride: usize,
    /// Length of the anchor handed to the refiner. The search region is twice this.
    pub refine_frames: usize,
}

impl SearchParams {
    /// The smallest configured window size.
    pub fn min_window(&self) -> usize {
        self.window_sizes.iter().copied().min().unwrap_or(0)
    }
}
