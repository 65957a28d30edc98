//! The LOD quadtree: a flat array of per-node vertical bounds addressed by
//! path-encoded node ids.

use glam::{UVec2, Vec2};
use terrace_geometry::Aabb;
use terrace_heightfield::SampleRect;

use crate::node_id::{NodeId, id_capacity, is_child_max_x, is_child_max_y, pow2};
use crate::{LodError, RangeTable};

/// Deepest tree whose bounds array can be addressed with `u32` ids and
/// allocated on a 64-bit host.
pub const MAX_SUPPORTED_DEPTH: u32 = 14;

/// Vertical extent of the terrain under one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBounds {
    /// Lowest elevation under the node.
    pub min_z: f32,
    /// Highest elevation under the node.
    pub max_z: f32,
}

impl NodeBounds {
    /// Empty bounds: the identity of [`NodeBounds::union`].
    pub const UNINITIALIZED: NodeBounds = NodeBounds {
        min_z: f32::INFINITY,
        max_z: f32::NEG_INFINITY,
    };

    /// Create bounds from a vertical range.
    pub fn new(min_z: f32, max_z: f32) -> Self {
        Self { min_z, max_z }
    }

    /// Smallest bounds enclosing both.
    pub fn union(&self, other: &NodeBounds) -> NodeBounds {
        NodeBounds {
            min_z: self.min_z.min(other.min_z),
            max_z: self.max_z.max(other.max_z),
        }
    }

    /// Returns true once the bounds have been written by aggregation.
    pub fn is_initialized(&self) -> bool {
        self.min_z <= self.max_z
    }
}

/// Quadtree of cached node bounds over a square terrain footprint.
///
/// Level `max_depth` is the root; level 0 holds leaves of `node_size` world
/// units. The footprint is a square of side `node_size · 2^max_depth`
/// centred on `center`, lying in the XY plane with Z up.
#[derive(Clone, Debug)]
pub struct LodTree {
    pub(crate) max_depth: u32,
    pub(crate) node_size: f32,
    pub(crate) center: Vec2,
    pub(crate) offset: Vec2,
    pub(crate) size: f32,
    pub(crate) nodes: Vec<NodeBounds>,
    pub(crate) ranges: RangeTable,
    pub(crate) texture_index: u32,
    pub(crate) aggregated: bool,
    pub(crate) dirty: Option<SampleRect>,
}

impl LodTree {
    /// Allocate a tree with `max_depth` levels below the root.
    ///
    /// Every node starts as [`NodeBounds::UNINITIALIZED`]; call
    /// [`LodTree::recompute_bounds`] over the whole height field before the
    /// first selection.
    pub fn new(max_depth: u32, node_size: f32, center: Vec2) -> Result<Self, LodError> {
        if max_depth > MAX_SUPPORTED_DEPTH {
            return Err(LodError::DepthTooLarge {
                depth: max_depth,
                max: MAX_SUPPORTED_DEPTH,
            });
        }
        if !node_size.is_finite() || node_size <= 0.0 {
            return Err(LodError::InvalidNodeSize(node_size));
        }

        let size = node_size * pow2(max_depth) as f32;
        let offset = center - Vec2::splat(size * 0.5);
        let capacity = id_capacity(max_depth);

        log::info!(
            "Terrain LOD tree: depth {max_depth}, {capacity} node slots, offset ({}, {}), size {size}",
            offset.x,
            offset.y
        );

        Ok(Self {
            max_depth,
            node_size,
            center,
            offset,
            size,
            nodes: vec![NodeBounds::UNINITIALIZED; capacity],
            ranges: RangeTable::new(max_depth, node_size),
            texture_index: 0,
            aggregated: false,
            dirty: None,
        })
    }

    /// Levels below the root.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// World size of a leaf node.
    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    /// Centre of the terrain footprint.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// World-space minimum corner of the terrain footprint.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Side length of the terrain footprint.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Per-level switch and morph distances.
    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    /// Length of the bounds array.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Cached bounds of `id`, or `None` when the id is outside the array.
    pub fn bounds(&self, id: NodeId) -> Option<NodeBounds> {
        self.nodes.get(id.index()).copied()
    }

    /// Texture layer written into every instance record.
    pub fn texture_index(&self) -> u32 {
        self.texture_index
    }

    pub fn set_texture_index(&mut self, texture_index: u32) {
        self.texture_index = texture_index;
    }

    /// Returns true once a full-field aggregation pass has completed.
    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Edited samples that have not been re-aggregated yet.
    pub fn dirty_region(&self) -> Option<SampleRect> {
        self.dirty
    }

    /// Record that samples in `region` changed. Regions accumulate until a
    /// [`LodTree::recompute_bounds`] pass covers them.
    pub fn mark_dirty(&mut self, region: SampleRect) {
        if region.is_empty() {
            return;
        }
        self.dirty = Some(match self.dirty {
            Some(existing) => existing.union(&region),
            None => region,
        });
    }

    /// World-space box of the whole terrain using the root bounds.
    pub fn root_aabb(&self) -> Aabb {
        let root = self.nodes[NodeId::ROOT.index()];
        Aabb::from_footprint(
            self.offset,
            self.offset + Vec2::splat(self.size),
            root.min_z,
            root.max_z,
        )
    }

    /// World-space box of node `id`, or `None` when the id lies outside the
    /// array or below the leaves.
    pub fn node_aabb(&self, id: NodeId) -> Option<Aabb> {
        let depth = id.depth();
        if depth > self.max_depth || id.raw() == 0 {
            return None;
        }
        let bounds = self.bounds(id)?;

        let mut min = self.offset;
        let mut size = self.size;
        for step in (0..depth).rev() {
            let quadrant = (id.raw() >> (2 * step)) & 0b11;
            size *= 0.5;
            min = child_min(min, size, quadrant);
        }
        Some(Aabb::from_footprint(
            min,
            min + Vec2::splat(size),
            bounds.min_z,
            bounds.max_z,
        ))
    }
}

/// Minimum corner of the child in `quadrant` given the parent's minimum
/// corner and the child's side length.
pub(crate) fn child_min(parent_min: Vec2, child_size: f32, quadrant: u32) -> Vec2 {
    let mut min = parent_min;
    if is_child_max_x(quadrant) {
        min.x += child_size;
    }
    if is_child_max_y(quadrant) {
        min.y += child_size;
    }
    min
}

/// Grid-space counterpart of [`child_min`].
pub(crate) fn child_grid_min(parent_min: UVec2, child_cells: u32, quadrant: u32) -> UVec2 {
    let mut min = parent_min;
    if is_child_max_x(quadrant) {
        min.x += child_cells;
    }
    if is_child_max_y(quadrant) {
        min.y += child_cells;
    }
    min
}
