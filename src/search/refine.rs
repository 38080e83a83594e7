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
use tracing::debug;

use super::scorer::{channel_stride, score, WindowScore};

/// The best match of an anchor inside a search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Frame offset relative to the start of the search window.
    pub offset: usize,
    pub score: WindowScore,
}

/// Finds the frame offset inside `search` where `anchor` matches best.
///
/// Every frame offset in `[0, search_frames - anchor_frames)` is tried, with at least offset 0
/// tried when the search window is no longer than the anchor. Ties keep the earliest offset and
/// the scan stops at the first exact match. Cost grows with the product of both window lengths,
/// so both must already be localized; never pass a whole track.
///
/// The returned offset is relative. Callers add it to the absolute frame at which `search`
/// was read. The stride is widened with [`channel_stride`] for multichannel input.
pub fn refine(anchor: &[i16], search: &[i16], channels: u16, stride: usize) -> Alignment {
    let stride = channel_stride(stride, channels);
    let channels = channels.max(1) as usize;
    let anchor_frames = anchor.len() / channels;
    let search_frames = search.len() / channels;
    let candidates = if search_frames > anchor_frames {
        search_frames - anchor_frames
    } else {
        1
    };

    let mut best = Alignment {
        offset: 0,
        score: WindowScore::ZERO,
    };
    for offset in 0..candidates {
        let window = &search[offset * channels..];
        let len = anchor.len().min(window.len());
        let current = score(&anchor[..len], &window[..len], stride);

        if offset == 0 || current < best.score {
            best = Alignment {
                offset,
                score: current,
            };
        }
        if current == WindowScore::ZERO {
            break;
        }
    }

    debug!(
        offset = best.offset,
        score = %best.score,
        candidates,
        "Refined loop end"
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, seed: u32) -> Vec<i16> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 16) as i16
            })
            .collect()
    }

    #[test]
    fn test_finds_embedded_anchor() {
        let search = noise(400, 7);
        for k in [0, 1, 57, 199] {
            let anchor = &search[k..k + 200];
            let alignment = refine(anchor, &search, 1, 1);
            assert!(alignment.offset <= k);
            assert_eq!(alignment.offset, k);
            assert_eq!(alignment.score, WindowScore::ZERO);
        }
    }

    #[test]
    fn test_offsets_are_frames_not_samples() {
        // Stereo: the anchor starts at frame 30, which is sample 60.
        let search = noise(2 * 200, 11);
        let anchor = &search[60..60 + 2 * 50];
        let alignment = refine(anchor, &search, 2, 1);
        assert_eq!(alignment.offset, 30);
        assert_eq!(alignment.score, WindowScore::ZERO);
    }

    #[test]
    fn test_ties_prefer_earliest_offset() {
        // A constant signal matches equally everywhere.
        let search = vec![3; 100];
        let anchor = vec![1; 20];
        let alignment = refine(&anchor, &search, 1, 1);
        assert_eq!(alignment.offset, 0);
        assert_eq!(alignment.score.value(), 4.0);
    }

    #[test]
    fn test_short_search_window() {
        let anchor = noise(50, 3);
        let search = anchor[..20].to_vec();
        let alignment = refine(&anchor, &search, 1, 1);
        assert_eq!(alignment.offset, 0);
        assert_eq!(alignment.score, WindowScore::ZERO);

        let alignment = refine(&anchor, &[], 1, 1);
        assert_eq!(alignment.offset, 0);
    }

    #[test]
    fn test_closest_match_without_exact_repeat() {
        let mut search = noise(300, 5);
        let anchor = search[120..170].to_vec();
        // Perturb the true match slightly so no offset scores zero.
        search[125] = search[125].wrapping_add(3);
        let alignment = refine(&anchor, &search, 1, 1);
        assert_eq!(alignment.offset, 120);
        assert!(alignment.score > WindowScore::ZERO);
    }
}
