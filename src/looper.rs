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

use tracing::{info, span, Level};

use crate::cancel::CancelHandle;
use crate::compose::compose;
use crate::error::LoopError;
use crate::search::{find_loop, refine, LoopSpec, SearchParams, SearchResult};
use crate::track::{SampleBuffer, Track};

/// How the loop points are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRequest {
    /// Approximate loop points given by the user. The end is refined, the start is kept.
    Manual { start: Duration, end: Duration },
    /// Search the whole track for loop points.
    Auto,
}

/// An extended track, ready to be written out.
#[derive(Debug)]
pub struct Extension {
    spec: LoopSpec,
    repeat_count: u32,
    buffer: SampleBuffer,
}

impl Extension {
    pub fn spec(&self) -> LoopSpec {
        self.spec
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}

/// Finds loop points in a track and extends it to a minimum length.
pub struct Looper {
    params: SearchParams,
    cancel: CancelHandle,
}

impl Looper {
    pub fn new(params: SearchParams) -> Looper {
        Looper {
            params,
            cancel: CancelHandle::new(),
        }
    }

    /// Uses the given handle to cancel searches started by this looper.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Looper {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels searches started by this looper.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs the automatic loop search.
    pub fn find(&self, track: &Track) -> Result<SearchResult, LoopError> {
        find_loop(track, &self.params, &self.cancel)
    }

    /// Determines the loop points and builds a track at least `min_length` long.
    pub fn run(
        &self,
        track: &Track,
        request: LoopRequest,
        min_length: Duration,
    ) -> Result<Extension, LoopError> {
        let span = span!(Level::INFO, "extend");
        let _enter = span.enter();

        let spec = match request {
            LoopRequest::Manual { start, end } => {
                self.refine_manual(track, track.frames_for(start), track.frames_for(end))?
            }
            LoopRequest::Auto => self.find(track)?.spec,
        };
        info!(start = spec.start(), end = spec.end(), "Using loop points");

        let total_frames = track.total_frames();
        let extended = compose(
            track.read(0, spec.start())?.into_buffer(),
            track.read(spec.start(), spec.frames())?.into_buffer(),
            track.read(spec.end(), total_frames - spec.end())?.into_buffer(),
            track.frames_for(min_length),
        )?;
        let repeat_count = extended.repeat_count();

        Ok(Extension {
            spec,
            repeat_count,
            buffer: extended.into_buffer()?,
        })
    }

    /// Keeps the user's start and moves the end to where the audio after it best matches the
    /// audio after the start.
    fn refine_manual(
        &self,
        track: &Track,
        start: usize,
        end: usize,
    ) -> Result<LoopSpec, LoopError> {
        LoopSpec::new(start, end)?;

        let refine_frames = self.params.refine_frames;
        let anchor = track.read(start, refine_frames)?;
        let region = track.read(end, refine_frames * 2)?;
        let alignment = refine(
            anchor.buffer().samples(),
            region.buffer().samples(),
            track.channels(),
            self.params.fine_stride,
        );
        info!(
            start,
            requested_end = end,
            end = end + alignment.offset,
            score = %alignment.score,
            "Refined manual loop end"
        );

        LoopSpec::new(start, end + alignment.offset)
    }
}
