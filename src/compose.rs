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
use tracing::{info, span, Level};

use crate::error::LoopError;
use crate::track::SampleBuffer;

/// An intro, a loop repeated `repeat_count` times and an ending, not yet spliced together.
#[derive(Debug)]
pub struct ExtendedAudio {
    intro: SampleBuffer,
    loop_segment: SampleBuffer,
    ending: SampleBuffer,
    repeat_count: u32,
}

impl ExtendedAudio {
    pub fn intro(&self) -> &SampleBuffer {
        &self.intro
    }

    pub fn loop_segment(&self) -> &SampleBuffer {
        &self.loop_segment
    }

    pub fn ending(&self) -> &SampleBuffer {
        &self.ending
    }

    /// How many times the loop is played. Always at least 1.
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// The length of the spliced output in frames.
    pub fn total_frames(&self) -> usize {
        self.intro.frames()
            + self.repeat_count as usize * self.loop_segment.frames()
            + self.ending.frames()
    }

    /// Splices intro, loop repeats and ending into one buffer. No blending is done at the
    /// joins, so a discontinuity in the source shows up as-is in the output.
    pub fn into_buffer(self) -> Result<SampleBuffer, LoopError> {
        let mut buffer =
            SampleBuffer::with_capacity(self.loop_segment.channels(), self.total_frames());
        buffer.append(&self.intro)?;
        for _ in 0..self.repeat_count {
            buffer.append(&self.loop_segment)?;
        }
        buffer.append(&self.ending)?;
        Ok(buffer)
    }
}

/// Works out how often the loop has to repeat to reach `min_total_frames` and bundles the
/// three segments together.
///
/// The loop is always repeated at least once, even if intro and ending alone are already long
/// enough. An empty loop is rejected.
pub fn compose(
    intro: SampleBuffer,
    loop_segment: SampleBuffer,
    ending: SampleBuffer,
    min_total_frames: usize,
) -> Result<ExtendedAudio, LoopError> {
    let span = span!(Level::INFO, "compose");
    let _enter = span.enter();

    if loop_segment.is_empty() {
        return Err(LoopError::DegenerateLoop {
            start: intro.frames(),
            end: intro.frames(),
        });
    }
    for segment in [&intro, &ending] {
        if segment.channels() != loop_segment.channels() {
            return Err(LoopError::ChannelMismatch {
                expected: loop_segment.channels(),
                actual: segment.channels(),
            });
        }
    }

    let repeat_count = repeat_count(
        intro.frames(),
        loop_segment.frames(),
        ending.frames(),
        min_total_frames,
    );
    info!(
        intro = intro.frames(),
        loop_frames = loop_segment.frames(),
        ending = ending.frames(),
        repeat_count,
        "Composed extended audio"
    );

    Ok(ExtendedAudio {
        intro,
        loop_segment,
        ending,
        repeat_count,
    })
}

/// ceil((min_total - intro - ending) / loop), but never less than 1. `loop_frames` must be > 0.
fn repeat_count(intro: usize, loop_frames: usize, ending: usize, min_total_frames: usize) -> u32 {
    let missing = min_total_frames.saturating_sub(intro + ending);
    let repeats = missing.div_ceil(loop_frames).max(1);
    u32::try_from(repeats).unwrap_or(u32::MAX)
}
