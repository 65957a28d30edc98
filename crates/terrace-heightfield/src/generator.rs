//! Multi-octave fractal Brownian motion (fBm) heightmap generation.
//!
//! Composites octaves of simplex noise into a normalized height and quantizes
//! it into a [`Heightmap`].

use noise::{NoiseFn, Simplex};

use crate::{HeightfieldError, Heightmap};

/// Configuration for multi-octave fBm noise used in heightmap generation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite. Typical range: 6-12.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Number of base-octave noise cycles across the whole map. Default: 2.0.
    pub frequency: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 123_456,
            octaves: 8,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 2.0,
        }
    }
}

/// Samples normalized fBm noise over the unit square.
pub struct HeightmapSampler {
    noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapSampler {
    /// Create a new sampler with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed);
        Self { noise, params }
    }

    /// Raw fBm value at `(u, v)` in map-relative coordinates (`0..1` spans the map).
    ///
    /// The result lies within `[-max_amplitude, +max_amplitude]`.
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            total += self.noise.get([u * frequency, v * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// fBm value at `(u, v)` remapped to `0..=1`.
    pub fn sample_normalized(&self, u: f64, v: f64) -> f64 {
        let max_amp = self.max_amplitude();
        if max_amp == 0.0 {
            return 0.5;
        }
        ((self.sample(u, v) / max_amp + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Theoretical maximum absolute amplitude (geometric series sum).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}

/// Generate a `width` x `height` heightmap from fBm noise.
pub fn generate_heightmap(
    width: u32,
    height: u32,
    params: HeightmapParams,
    min_elevation: f32,
    max_elevation: f32,
) -> Result<Heightmap, HeightfieldError> {
    if width == 0 || height == 0 {
        return Err(HeightfieldError::InvalidDimensions { width, height });
    }

    log::info!(
        "Generating {width}x{height} heightmap (seed {}, {} octaves)",
        params.seed,
        params.octaves
    );

    let sampler = HeightmapSampler::new(params);
    let mut samples = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let v = f64::from(y) / f64::from(width);
        for x in 0..width {
            let u = f64::from(x) / f64::from(width);
            let value = sampler.sample_normalized(u, v);
            samples.push((value * f64::from(u16::MAX)).round() as u16);
        }
    }

    Heightmap::from_samples(width, height, samples, min_elevation, max_elevation)
}
