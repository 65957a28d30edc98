//! 16-bit sample grid mapped onto a configurable elevation range.

use glam::UVec2;

use crate::{HeightBounds, HeightSource, HeightfieldError, SampleRect};

/// Largest raw sample value; maps to `max_elevation`.
const SAMPLE_SCALE: f32 = u16::MAX as f32;

/// A row-major grid of 16-bit height samples.
///
/// Raw sample `0` maps to `min_elevation` and `u16::MAX` to `max_elevation`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    min_elevation: f32,
    max_elevation: f32,
    samples: Vec<u16>,
}

impl Heightmap {
    /// Create a flat heightmap where every sample sits at `min_elevation`.
    pub fn new(
        width: u32,
        height: u32,
        min_elevation: f32,
        max_elevation: f32,
    ) -> Result<Self, HeightfieldError> {
        let count = (width as usize) * (height as usize);
        Self::from_samples(width, height, vec![0; count], min_elevation, max_elevation)
    }

    /// Wrap an existing row-major sample buffer.
    pub fn from_samples(
        width: u32,
        height: u32,
        samples: Vec<u16>,
        min_elevation: f32,
        max_elevation: f32,
    ) -> Result<Self, HeightfieldError> {
        if width == 0 || height == 0 {
            return Err(HeightfieldError::InvalidDimensions { width, height });
        }
        if !min_elevation.is_finite() || !max_elevation.is_finite() || max_elevation < min_elevation
        {
            return Err(HeightfieldError::InvalidElevationRange {
                min: min_elevation,
                max: max_elevation,
            });
        }
        let expected = (width as usize) * (height as usize);
        if samples.len() != expected {
            return Err(HeightfieldError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            min_elevation,
            max_elevation,
            samples,
        })
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Elevation of raw sample `0`.
    pub fn min_elevation(&self) -> f32 {
        self.min_elevation
    }

    /// Elevation of raw sample `u16::MAX`.
    pub fn max_elevation(&self) -> f32 {
        self.max_elevation
    }

    /// Raw row-major samples.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Convert a raw sample to an elevation.
    pub fn raw_to_elevation(&self, raw: u16) -> f32 {
        f32::from(raw) / SAMPLE_SCALE * (self.max_elevation - self.min_elevation)
            + self.min_elevation
    }

    /// Convert an elevation to the nearest raw sample, clamped to the range.
    pub fn elevation_to_raw(&self, elevation: f32) -> u16 {
        let span = self.max_elevation - self.min_elevation;
        if span <= 0.0 {
            return 0;
        }
        let normalized = ((elevation - self.min_elevation) / span).clamp(0.0, 1.0);
        (normalized * SAMPLE_SCALE).round() as u16
    }

    /// Raw sample at `(x, y)`. Coordinates are clamped to the grid.
    pub fn sample(&self, x: u32, y: u32) -> u16 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.samples[self.index(x, y)]
    }

    /// Elevation of the sample at `(x, y)`. Coordinates are clamped to the grid.
    pub fn elevation(&self, x: u32, y: u32) -> f32 {
        self.raw_to_elevation(self.sample(x, y))
    }

    /// Overwrite one raw sample. Returns the touched region, empty when the
    /// coordinate is outside the grid.
    pub fn set_sample(&mut self, x: u32, y: u32, value: u16) -> SampleRect {
        if x >= self.width || y >= self.height {
            return SampleRect::new(UVec2::ZERO, UVec2::ZERO);
        }
        let index = self.index(x, y);
        self.samples[index] = value;
        SampleRect::point(x, y)
    }

    /// Set every sample in `rect` to `elevation`. Returns the clamped region
    /// that was written, which callers pass on to bounds invalidation.
    pub fn fill_rect(&mut self, rect: SampleRect, elevation: f32) -> SampleRect {
        let rect = rect.clamped(self.dimensions());
        let raw = self.elevation_to_raw(elevation);
        for y in rect.min.y..rect.max.y {
            let start = self.index(rect.min.x, y);
            let end = start + rect.width() as usize;
            self.samples[start..end].fill(raw);
        }
        rect
    }

    /// Elevation range across `rect`, clamped to the grid.
    ///
    /// A rectangle that is empty after clamping reports the sample nearest to
    /// its minimum corner.
    pub fn calculate_min_max(&self, rect: SampleRect) -> HeightBounds {
        let clamped = rect.clamped(self.dimensions());
        if clamped.is_empty() {
            let raw = self.sample(rect.min.x, rect.min.y);
            let elevation = self.raw_to_elevation(raw);
            return HeightBounds::new(elevation, elevation);
        }

        let mut min_raw = u16::MAX;
        let mut max_raw = u16::MIN;
        for y in clamped.min.y..clamped.max.y {
            let start = self.index(clamped.min.x, y);
            let row = &self.samples[start..start + clamped.width() as usize];
            for &value in row {
                min_raw = min_raw.min(value);
                max_raw = max_raw.max(value);
            }
        }

        HeightBounds::new(self.raw_to_elevation(min_raw), self.raw_to_elevation(max_raw))
    }
}

impl HeightSource for Heightmap {
    fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn height_bounds(&self, rect: SampleRect) -> HeightBounds {
        self.calculate_min_max(rect)
    }

    fn height_at(&self, x: f32, y: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        if !(x >= 0.0 && y >= 0.0 && x <= max_x && y <= max_y) {
            return f32::INFINITY;
        }

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let h00 = self.elevation(x0, y0);
        let h10 = self.elevation(x1, y0);
        let h01 = self.elevation(x0, y1);
        let h11 = self.elevation(x1, y1);

        let bottom = h00 + (h10 - h00) * tx;
        let top = h01 + (h11 - h01) * tx;
        bottom + (top - bottom) * ty
    }
}
