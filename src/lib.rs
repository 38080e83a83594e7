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
//! Finds loop points in a piece of audio and extends it by repeating the loop.

use std::path::Path;
use std::time::Duration;

use tracing::info;

pub mod cancel;
pub mod compose;
pub mod config;
pub mod error;
pub mod looper;
pub mod search;
pub mod track;
pub mod util;
pub mod validate;
pub mod wav;

#[cfg(test)]
mod testutil;

use crate::config::SearchConfig;
use crate::error::ProcessError;
use crate::looper::{LoopRequest, Looper};
use crate::search::LoopSpec;

/// What `process` did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub spec: LoopSpec,
    pub repeat_count: u32,
    pub sample_rate: u32,
    pub total_frames: usize,
}

impl Outcome {
    /// Duration of the written file.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_frames as u128 * 1_000_000_000 / u128::from(self.sample_rate);
        Duration::from_nanos(nanos as u64)
    }
}

/// Reads `input`, extends it to at least `min_length` and writes the result to `output` in the
/// input's format.
pub fn process(
    input: &Path,
    output: &Path,
    request: LoopRequest,
    min_length: Duration,
    config: &SearchConfig,
) -> Result<Outcome, ProcessError> {
    let (track, wav_info) = wav::read_track(input)?;
    let params = config.resolve(track.sample_rate())?;

    let extension = Looper::new(params).run(&track, request, min_length)?;
    let spec = extension.spec();
    let repeat_count = extension.repeat_count();
    let buffer = extension.into_buffer();
    let total_frames = buffer.frames();

    wav::write_track(output, &wav_info, &buffer)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        frames = total_frames,
        "Extended track"
    );

    Ok(Outcome {
        spec,
        repeat_count,
        sample_rate: track.sample_rate(),
        total_frames,
    })
}
