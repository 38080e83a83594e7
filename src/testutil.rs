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
use std::{error::Error, fs::File, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::track::Track;

/// Writes a WAV file with one inner Vec per channel, interleaving them frame by frame. All
/// channels must be the same length.
pub fn write_wav_with_bits<S: hound::Sample + Copy + 'static>(
    path: PathBuf,
    samples: Vec<Vec<S>>,
    sample_rate: u32,
    bits_per_sample: u16,
) -> Result<(), Box<dyn Error>> {
    let tempwav = File::create(path)?;

    // Determine sample format based on the type
    let sample_format = if std::any::TypeId::of::<S>() == std::any::TypeId::of::<f32>() {
        SampleFormat::Float
    } else if std::any::TypeId::of::<S>() == std::any::TypeId::of::<i32>()
        || std::any::TypeId::of::<S>() == std::any::TypeId::of::<i16>()
    {
        SampleFormat::Int
    } else {
        return Err("Unsupported sample format".into());
    };

    let mut writer = WavWriter::new(
        tempwav,
        WavSpec {
            channels: samples.len() as u16,
            sample_rate,
            bits_per_sample,
            sample_format,
        },
    )?;
    let frames = samples.first().map_or(0, |channel| channel.len());
    if samples.iter().any(|channel| channel.len() != frames) {
        return Err("Channels differ in length".into());
    }
    for frame in 0..frames {
        for channel_samples in &samples {
            writer.write_sample(channel_samples[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Deterministic white noise, `len` samples long.
pub fn noise(len: usize, seed: u64) -> Vec<i16> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-12_000..=12_000)).collect()
}

/// Frame lengths of the parts of a synthetic looping track.
pub struct Layout {
    pub intro: usize,
    pub phrase: usize,
    pub repeats: usize,
    pub ending: usize,
}

impl Layout {
    /// The frame at which the first phrase starts.
    pub fn phrase_start(&self) -> usize {
        self.intro
    }

    pub fn total_frames(&self) -> usize {
        self.intro + self.phrase * self.repeats + self.ending
    }
}

/// Builds interleaved samples for `intro + phrase * repeats + ending`, every part noise.
/// The phrase is copied sample for sample, so any two repeats score exactly zero.
pub fn phrase_samples(layout: &Layout, channels: u16, seed: u64) -> Vec<i16> {
    let channels = channels as usize;
    let phrase = noise(layout.phrase * channels, seed + 1);

    let mut samples = noise(layout.intro * channels, seed);
    for _ in 0..layout.repeats {
        samples.extend_from_slice(&phrase);
    }
    samples.extend(noise(layout.ending * channels, seed + 2));
    samples
}

/// A track built from `phrase_samples`.
pub fn phrase_track(layout: &Layout, channels: u16, sample_rate: u32, seed: u64) -> Track {
    Track::new(phrase_samples(layout, channels, seed), channels, sample_rate)
        .expect("synthetic track should be valid")
}
