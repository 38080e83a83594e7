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

/// The dissimilarity of two windows. Zero means identical, larger means more different.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct WindowScore(f64);

impl WindowScore {
    pub const ZERO: WindowScore = WindowScore(0.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for WindowScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Scores two windows of interleaved samples against each other.
///
/// Every `stride`th sample is compared and the squared differences are averaged over the
/// number of samples actually compared, so scores stay comparable across window lengths and
/// strides. A stride of 0 is treated as 1. Windows are expected to be the same length; if
/// they are not, only the common prefix is compared.
pub fn score(a: &[i16], b: &[i16], stride: usize) -> WindowScore {
    debug_assert_eq!(a.len(), b.len(), "scored windows differ in length");

    let mut sum: u64 = 0;
    let mut compared: u64 = 0;
    for (x, y) in a.iter().zip(b.iter()).step_by(stride.max(1)) {
        let diff = i64::from(*x) - i64::from(*y);
        // At most 65535^2 per sample, so u64 holds billions of samples.
        sum += diff.unsigned_abs() * diff.unsigned_abs();
        compared += 1;
    }

    if compared == 0 {
        return WindowScore::ZERO;
    }
    WindowScore(sum as f64 / compared as f64)
}

/// Returns the smallest stride no less than `stride` that shares no factor with the channel
/// count, so that stepping through interleaved samples lands on every channel in turn.
pub fn channel_stride(stride: usize, channels: u16) -> usize {
    let channels = usize::from(channels.max(1));
    let mut stride = stride.max(1);
    while gcd(stride, channels) != 1 {
        stride += 1;
    }
    stride
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_windows_score_zero() {
        let window = [5, -3, 1000, i16::MIN, i16::MAX, 0, 7];
        for stride in 1..10 {
            assert_eq!(score(&window, &window, stride), WindowScore::ZERO);
        }
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = [1, 2, 3, 4, 5, 6, 7, 8];
        let b = [8, -7, 6, -5, 4, -3, 2, -1];
        for stride in 1..5 {
            assert_eq!(score(&a, &b, stride), score(&b, &a, stride));
        }
    }

    #[test]
    fn test_mean_squared_difference() {
        let a = [0, 0, 0, 0];
        let b = [1, 2, 3, 4];
        // (1 + 4 + 9 + 16) / 4
        assert_eq!(score(&a, &b, 1).value(), 7.5);
        // Positions 0 and 2: (1 + 9) / 2
        assert_eq!(score(&a, &b, 2).value(), 5.0);
    }

    #[test]
    fn test_uneven_stride_divides_by_compared_count() {
        let a = [0, 0, 0, 0, 0];
        let b = [2, 9, 9, 4, 9];
        // Positions 0 and 3 only: (4 + 16) / 2
        assert_eq!(score(&a, &b, 3).value(), 10.0);
    }

    #[test]
    fn test_extreme_samples_do_not_overflow() {
        let a = vec![i16::MIN; 10_000];
        let b = vec![i16::MAX; 10_000];
        assert_eq!(score(&a, &b, 1).value(), 65535.0 * 65535.0);
    }

    #[test]
    fn test_empty_and_zero_stride() {
        assert_eq!(score(&[], &[], 4), WindowScore::ZERO);
        assert_eq!(score(&[0, 0], &[2, 2], 0).value(), 4.0);
    }

    #[test]
    fn test_channel_stride() {
        assert_eq!(channel_stride(100, 1), 100);
        assert_eq!(channel_stride(100, 2), 101);
        assert_eq!(channel_stride(101, 2), 101);
        assert_eq!(channel_stride(1, 2), 1);
        assert_eq!(channel_stride(0, 2), 1);
        assert_eq!(channel_stride(4, 6), 5);
        assert_eq!(channel_stride(9, 6), 11);
    }

    #[test]
    fn test_channel_stride_samples_every_channel() {
        // Left channels match, right channels differ.
        let a: Vec<i16> = (0..400).map(|i| if i % 2 == 0 { 10 } else { 500 }).collect();
        let b: Vec<i16> = (0..400).map(|i| if i % 2 == 0 { 10 } else { -500 }).collect();
        assert_eq!(score(&a, &b, 100), WindowScore::ZERO);
        assert!(score(&a, &b, channel_stride(100, 2)) > WindowScore::ZERO);
    }
}
