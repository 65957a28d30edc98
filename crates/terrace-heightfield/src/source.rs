//! The query interface the LOD engine uses to read a height field.

use glam::UVec2;

/// A half-open rectangle of height field samples: `min` inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleRect {
    /// First sample column/row inside the rectangle.
    pub min: UVec2,
    /// One past the last sample column/row.
    pub max: UVec2,
}

impl SampleRect {
    /// Create a rectangle from its inclusive minimum and exclusive maximum.
    pub fn new(min: UVec2, max: UVec2) -> Self {
        Self { min, max }
    }

    /// The rectangle covering a whole `dimensions`-sized field.
    pub fn full(dimensions: UVec2) -> Self {
        Self {
            min: UVec2::ZERO,
            max: dimensions,
        }
    }

    /// Rectangle covering a single sample.
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            min: UVec2::new(x, y),
            max: UVec2::new(x.saturating_add(1), y.saturating_add(1)),
        }
    }

    /// Returns true if the rectangle contains no samples.
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// Width in samples (zero when inverted).
    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    /// Height in samples (zero when inverted).
    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }

    /// Clamp the rectangle to a field of the given dimensions.
    pub fn clamped(&self, dimensions: UVec2) -> Self {
        Self {
            min: self.min.min(dimensions),
            max: self.max.min(dimensions),
        }
    }

    /// Smallest rectangle enclosing both. Empty rectangles are ignored.
    pub fn union(&self, other: &SampleRect) -> SampleRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        SampleRect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns true if the rectangles share at least one sample.
    pub fn intersects(&self, other: &SampleRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Returns true if every sample of `other` lies inside `self`.
    pub fn contains_rect(&self, other: &SampleRect) -> bool {
        other.is_empty() || (self.min.cmple(other.min).all() && self.max.cmpge(other.max).all())
    }
}

/// The elevation range found across a region of the height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightBounds {
    /// Lowest elevation in the region.
    pub min: f32,
    /// Highest elevation in the region.
    pub max: f32,
}

impl HeightBounds {
    /// Create bounds from a minimum and maximum elevation.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Smallest bounds enclosing both.
    pub fn union(&self, other: &HeightBounds) -> HeightBounds {
        HeightBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Read access to a height field.
///
/// Implementors are owned outside the LOD engine; the engine borrows them for
/// the duration of a bounds aggregation pass or a height query.
pub trait HeightSource {
    /// Size of the field in samples.
    fn dimensions(&self) -> UVec2;

    /// Elevation range across `rect`. Implementations clamp the rectangle to
    /// the field and always return the bounds of at least one sample.
    fn height_bounds(&self, rect: SampleRect) -> HeightBounds;

    /// Interpolated elevation at fractional sample coordinates, or
    /// `f32::INFINITY` when the point lies outside the field.
    fn height_at(&self, x: f32, y: f32) -> f32;
}
