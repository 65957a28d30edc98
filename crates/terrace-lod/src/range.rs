//! Per-level switch and morph distances.

use crate::node_id::pow2;

/// Fraction of the distance between two switch distances used for morphing
/// at the finest level.
const MORPH_BAND_FINEST: f32 = 0.15;
/// Morph band fraction at the coarsest level.
const MORPH_BAND_COARSEST: f32 = 0.30;
/// Switch distance of level 0, in multiples of the leaf node size.
const SWITCH_DISTANCE_FACTOR: f32 = 5.0;

/// Distances that govern one LOD level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodRange {
    /// Distance from the camera beyond which this level is replaced by the
    /// next coarser one.
    pub switch_distance: f32,
    /// Distance at which vertices of this level start morphing towards the
    /// coarser grid. Never greater than `switch_distance`.
    pub morph_start: f32,
}

impl LodRange {
    /// The `(morph_start, switch_distance)` pair written into instance records.
    pub fn morph_range(&self) -> [f32; 2] {
        [self.morph_start, self.switch_distance]
    }
}

/// One [`LodRange`] per level, `0..=max_depth`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTable {
    ranges: Vec<LodRange>,
}

impl RangeTable {
    /// Build the table for a tree of `max_depth` levels below the root with
    /// leaves of `node_size` world units.
    pub fn new(max_depth: u32, node_size: f32) -> Self {
        let mut ranges = Vec::with_capacity(max_depth as usize + 1);
        let mut previous = 0.0;
        for level in 0..=max_depth {
            let switch_distance = SWITCH_DISTANCE_FACTOR * node_size * pow2(level) as f32;
            let band = morph_band(level, max_depth);
            let morph_start = switch_distance - band * (switch_distance - previous);
            ranges.push(LodRange {
                switch_distance,
                morph_start,
            });
            previous = switch_distance;
        }
        Self { ranges }
    }

    /// Range for `level`, or `None` past the coarsest level.
    pub fn get(&self, level: u32) -> Option<&LodRange> {
        self.ranges.get(level as usize)
    }

    /// All ranges, finest first.
    pub fn ranges(&self) -> &[LodRange] {
        &self.ranges
    }

    /// Number of levels in the table.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if the table has no levels.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

fn morph_band(level: u32, max_depth: u32) -> f32 {
    if max_depth == 0 {
        return MORPH_BAND_FINEST;
    }
    let t = level as f32 / max_depth as f32;
    MORPH_BAND_FINEST + (MORPH_BAND_COARSEST - MORPH_BAND_FINEST) * t
}
