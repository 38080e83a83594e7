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
use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::search::SearchParams;
use crate::track::frames_for;

const DEFAULT_MIN_WINDOW: Duration = Duration::from_secs(10);
const DEFAULT_MAX_WINDOW: Duration = Duration::from_secs(25);
const DEFAULT_WINDOW_STEP: Duration = Duration::from_secs(5);
const DEFAULT_STEPS_PER_SECOND: u32 = 6;
const DEFAULT_COARSE_STRIDE: usize = 100;
const DEFAULT_FINE_STRIDE: usize = 1;
const DEFAULT_REFINE_WINDOW: Duration = Duration::from_secs(1);
const DEFAULT_MIN_LENGTH: Duration = Duration::from_secs(120);

/// A YAML representation of the loop search configuration.
#[derive(Deserialize, Clone, Default, Debug)]
pub struct SearchConfig {
    /// The smallest window size the coarse scan is run with (default: 10s).
    min_window: Option<String>,

    /// The largest window size the coarse scan is run with (default: 25s).
    max_window: Option<String>,

    /// The increment between window sizes (default: 5s).
    window_step: Option<String>,

    /// How many coarse scan positions there are per second of audio (default: 6).
    /// Must be at least 1 so that a step never exceeds one second.
    steps_per_second: Option<u32>,

    /// Scorer stride in samples for the coarse scan (default: 100).
    coarse_stride: Option<usize>,

    /// Scorer stride in samples for refinement and re-scoring (default: 1).
    fine_stride: Option<usize>,

    /// Length of the anchor used to refine a loop end (default: 1s).
    refine_window: Option<String>,

    /// The minimum output length when none is given on the command line (default: 120s).
    min_length: Option<String>,
}

impl SearchConfig {
    /// Parses a search configuration from a file.
    pub fn deserialize(path: &Path) -> Result<SearchConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<SearchConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the smallest window size.
    pub fn min_window(&self) -> Result<Duration, ConfigError> {
        parse_duration("min_window", &self.min_window, DEFAULT_MIN_WINDOW)
    }

    /// Returns the largest window size.
    pub fn max_window(&self) -> Result<Duration, ConfigError> {
        parse_duration("max_window", &self.max_window, DEFAULT_MAX_WINDOW)
    }

    /// Returns the window size increment.
    pub fn window_step(&self) -> Result<Duration, ConfigError> {
        parse_duration("window_step", &self.window_step, DEFAULT_WINDOW_STEP)
    }

    /// Returns the number of coarse scan positions per second.
    pub fn steps_per_second(&self) -> u32 {
        self.steps_per_second.unwrap_or(DEFAULT_STEPS_PER_SECOND)
    }

    /// Returns the coarse scorer stride.
    pub fn coarse_stride(&self) -> usize {
        self.coarse_stride.unwrap_or(DEFAULT_COARSE_STRIDE)
    }

    /// Returns the fine scorer stride.
    pub fn fine_stride(&self) -> usize {
        self.fine_stride.unwrap_or(DEFAULT_FINE_STRIDE)
    }

    /// Returns the refine anchor length.
    pub fn refine_window(&self) -> Result<Duration, ConfigError> {
        parse_duration("refine_window", &self.refine_window, DEFAULT_REFINE_WINDOW)
    }

    /// Returns the default minimum output length.
    pub fn min_length(&self) -> Result<Duration, ConfigError> {
        parse_duration("min_length", &self.min_length, DEFAULT_MIN_LENGTH)
    }

    /// Checks that the configured values describe a usable search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_window = self.min_window()?;
        let max_window = self.max_window()?;
        if min_window.is_zero() {
            return Err(ConfigError::Invalid("min_window must be greater than 0".into()));
        }
        if max_window < min_window {
            return Err(ConfigError::Invalid(format!(
                "max_window ({:?}) is smaller than min_window ({:?})",
                max_window, min_window
            )));
        }
        if self.window_step()?.is_zero() {
            return Err(ConfigError::Invalid("window_step must be greater than 0".into()));
        }
        if self.steps_per_second() == 0 {
            return Err(ConfigError::Invalid(
                "steps_per_second must be at least 1".into(),
            ));
        }
        if self.coarse_stride() == 0 || self.fine_stride() == 0 {
            return Err(ConfigError::Invalid("strides must be greater than 0".into()));
        }
        if self.refine_window()?.is_zero() {
            return Err(ConfigError::Invalid(
                "refine_window must be greater than 0".into(),
            ));
        }
        self.min_length()?;
        Ok(())
    }

    /// Converts the configuration into frame counts for a track with the given sample rate.
    pub fn resolve(&self, sample_rate: u32) -> Result<SearchParams, ConfigError> {
        self.validate()?;

        let max_window = self.max_window()?;
        let window_step = self.window_step()?;
        let mut window_sizes = Vec::new();
        let mut window = self.min_window()?;
        while window <= max_window {
            window_sizes.push(frames_for(window, sample_rate));
            window += window_step;
        }

        let refine_frames = frames_for(self.refine_window()?, sample_rate);
        if refine_frames == 0 || window_sizes.contains(&0) {
            return Err(ConfigError::Invalid(format!(
                "windows are shorter than one frame at {}Hz",
                sample_rate
            )));
        }

        Ok(SearchParams {
            window_sizes,
            step: (sample_rate / self.steps_per_second()).max(1) as usize,
            coarse_stride: self.coarse_stride(),
            fine_stride: self.fine_stride(),
            refine_frames,
        })
    }
}

fn parse_duration(
    key: &str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(DurationString::from_string(value.clone())
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", key, e)))?
            .into()),
        None => Ok(default),
    }
}
