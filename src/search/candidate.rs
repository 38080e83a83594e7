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
use tracing::{debug, info, span, Level};

use super::refine::refine;
use super::scorer::{channel_stride, score, WindowScore};
use super::{LoopSpec, SearchParams};
use crate::cancel::CancelHandle;
use crate::error::LoopError;
use crate::track::{SampleBuffer, Track};

/// A scored pair of window positions, in frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub score: WindowScore,
}

/// The outcome of a full automatic search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub spec: LoopSpec,
    /// The fine score of the chosen start and end.
    pub score: WindowScore,
    /// The window size, in frames, whose coarse scan produced the result.
    pub window: usize,
}

/// Slides a pair of `window`-frame windows across the buffer and returns the most similar pair.
///
/// Every start in `[0, total - window]` and every end in `[start + window, total - window]` is
/// visited in steps of `step` frames. Equal scores prefer the larger end so the loop spans as
/// much of the track as possible instead of catching two neighbouring repeats of one phrase.
/// The stride is widened with [`channel_stride`] so every channel contributes to the score.
pub fn scan_window(
    buffer: &SampleBuffer,
    window: usize,
    step: usize,
    stride: usize,
    cancel: &CancelHandle,
) -> Result<Candidate, LoopError> {
    let span = span!(Level::INFO, "coarse scan", window);
    let _enter = span.enter();

    let total_frames = buffer.frames();
    let required_frames = window.max(1) * 2;
    if total_frames < required_frames {
        return Err(LoopError::InsufficientTrackLength {
            total_frames,
            required_frames,
        });
    }

    let window = window.max(1);
    let step = step.max(1);
    let stride = channel_stride(stride, buffer.channels());
    let last = total_frames - window;
    let mut best: Option<Candidate> = None;

    for start in (0..=last).step_by(step) {
        if cancel.is_cancelled() {
            return Err(LoopError::Cancelled);
        }

        let anchor = buffer.window(start, window);
        for end in (start + window..=last).step_by(step) {
            let current = score(anchor, buffer.window(end, window), stride);
            let better = match best {
                None => true,
                Some(b) => current < b.score || (current == b.score && end > b.end),
            };
            if better {
                best = Some(Candidate {
                    start,
                    end,
                    score: current,
                });
            }
        }

        debug!(
            window,
            percent = start as f64 * 100.0 / last.max(1) as f64,
            best_score = %best.map(|b| b.score).unwrap_or_default(),
            "Coarse scan"
        );
    }

    best.ok_or(LoopError::InsufficientTrackLength {
        total_frames,
        required_frames,
    })
}

/// Finds loop start and end points across the whole track.
///
/// The coarse scan runs once per configured window size. Each coarse result is stepped back
/// by half a step, its end refined against a short anchor at the start, and the refined pair
/// re-scored at the fine stride so results from different window sizes compare fairly. The
/// lowest re-score wins; equal scores keep the earlier window size.
pub fn find_loop(
    track: &Track,
    params: &SearchParams,
    cancel: &CancelHandle,
) -> Result<SearchResult, LoopError> {
    let span = span!(Level::INFO, "find loop");
    let _enter = span.enter();

    let total_frames = track.total_frames();
    let required_frames = params.min_window().max(1) * 2;
    if total_frames < required_frames {
        return Err(LoopError::InsufficientTrackLength {
            total_frames,
            required_frames,
        });
    }

    let half_step = params.step / 2;
    let mut best: Option<SearchResult> = None;

    for &window in params.window_sizes.iter() {
        if cancel.is_cancelled() {
            return Err(LoopError::Cancelled);
        }
        if total_frames < window * 2 {
            debug!(window, total_frames, "Track too short for window size, skipping");
            continue;
        }

        let coarse = scan_window(
            track.buffer(),
            window,
            params.step,
            params.coarse_stride,
            cancel,
        )?;
        info!(
            window,
            start = coarse.start,
            end = coarse.end,
            score = %coarse.score,
            "Coarse candidate"
        );

        // The refiner only looks forward, so start it from before the coarse estimate.
        let start = coarse.start.saturating_sub(half_step);
        let end = coarse.end.saturating_sub(half_step);

        let end = {
            let anchor = track.read(start, params.refine_frames)?;
            let region = track.read(end, params.refine_frames * 2)?;
            let alignment = refine(
                anchor.buffer().samples(),
                region.buffer().samples(),
                track.channels(),
                params.fine_stride,
            );
            end + alignment.offset
        };

        let fine = rescore(track.buffer(), start, end, params);
        info!(window, start, end, score = %fine, "Refined candidate");

        if best.map_or(true, |b| fine < b.score) {
            best = Some(SearchResult {
                spec: LoopSpec::new(start, end)?,
                score: fine,
                window,
            });
        }
    }

    let best = best.ok_or(LoopError::InsufficientTrackLength {
        total_frames,
        required_frames,
    })?;
    info!(
        start = best.spec.start(),
        end = best.spec.end(),
        window = best.window,
        score = %best.score,
        "Loop search completed"
    );
    Ok(best)
}

/// Scores the refine-length windows at the start and end of a loop at the fine stride.
fn rescore(buffer: &SampleBuffer, start: usize, end: usize, params: &SearchParams) -> WindowScore {
    let a = buffer.window(start, params.refine_frames);
    let b = buffer.window(end, params.refine_frames);
    let len = a.len().min(b.len());
    score(
        &a[..len],
        &b[..len],
        channel_stride(params.fine_stride, buffer.channels()),
    )
}
