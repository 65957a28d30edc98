//! Per-frame tile selection.
//!
//! The walk starts at the root and descends breadth-first. A node is culled
//! against the frustum, then emitted whole if it lies outside the switch
//! sphere of the next finer level; otherwise its children are examined. A
//! child that is itself outside that sphere is emitted straight away at
//! half resolution, so the parent's area is tiled without gaps or overlap.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use terrace_geometry::{Aabb, BoundingSphere, Frustum};

use crate::instance::InstanceRecord;
use crate::node_id::{NodeId, pow2};
use crate::tree::child_min;
use crate::{LodError, LodTree};

/// Which tile mesh a selected tile is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileResolution {
    /// The node was emitted at its own step of the walk.
    Full,
    /// The node was emitted by its parent because it lies outside the
    /// parent's switch sphere.
    Half,
}

/// One tile chosen by [`LodTree::select`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedTile {
    pub id: NodeId,
    /// Level of the emitted node, 0 for leaves.
    pub level: u32,
    pub resolution: TileResolution,
    pub record: InstanceRecord,
}

/// Output of one walk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    /// Tiles in walk order, at most the requested capacity.
    pub tiles: Vec<SelectedTile>,
    /// Tiles discarded because the capacity was exceeded.
    pub dropped: usize,
}

impl Selection {
    /// Number of selected tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Instance records of the tiles drawn with `resolution`, in walk order.
    pub fn records(&self, resolution: TileResolution) -> Vec<InstanceRecord> {
        self.tiles
            .iter()
            .filter(|tile| tile.resolution == resolution)
            .map(|tile| tile.record)
            .collect()
    }

    /// Number of tiles drawn with `resolution`.
    pub fn count(&self, resolution: TileResolution) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.resolution == resolution)
            .count()
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingNode {
    id: NodeId,
    level: u32,
    aabb: Aabb,
}

impl LodTree {
    /// Select the tiles to draw from `camera_origin` through `frustum`.
    ///
    /// At most `capacity` tiles are returned; the rest are counted in
    /// [`Selection::dropped`]. Fails when bounds were never aggregated or an
    /// edited region is still waiting for [`LodTree::recompute_bounds`].
    pub fn select(
        &self,
        camera_origin: Vec3,
        frustum: &Frustum,
        capacity: usize,
    ) -> Result<Selection, LodError> {
        if !self.aggregated {
            return Err(LodError::BoundsNotAggregated);
        }
        if let Some(region) = self.dirty {
            return Err(LodError::StaleBounds { region });
        }
        if !camera_origin.is_finite() || frustum.is_degenerate() {
            log::warn!("Skipping terrain selection for degenerate camera at {camera_origin}");
            return Ok(Selection::default());
        }

        let mut tiles = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(PendingNode {
            id: NodeId::ROOT,
            level: self.max_depth,
            aabb: self.root_aabb(),
        });

        while let Some(node) = queue.pop_front() {
            if !frustum.is_visible(&node.aabb) {
                continue;
            }
            if node.level == 0 {
                tiles.push(self.tile(&node, TileResolution::Full));
                continue;
            }

            let switch_distance = self.ranges.ranges()[node.level as usize - 1].switch_distance;
            let sphere = BoundingSphere::new(camera_origin, switch_distance);
            if !sphere.intersects_aabb(&node.aabb) {
                tiles.push(self.tile(&node, TileResolution::Full));
                continue;
            }

            let child_size = self.node_size * pow2(node.level - 1) as f32;
            let parent_min = node.aabb.min.truncate();
            for quadrant in 0..4 {
                let id = node.id.child(quadrant);
                let bounds = self.bounds(id).ok_or(LodError::NodeIdOverflow {
                    id: id.raw(),
                    capacity: self.nodes.len(),
                })?;
                let min = child_min(parent_min, child_size, quadrant);
                let child = PendingNode {
                    id,
                    level: node.level - 1,
                    aabb: Aabb::from_footprint(
                        min,
                        min + Vec2::splat(child_size),
                        bounds.min_z,
                        bounds.max_z,
                    ),
                };

                if sphere.intersects_aabb(&child.aabb) {
                    queue.push_back(child);
                } else if frustum.is_visible(&child.aabb) {
                    tiles.push(self.tile(&child, TileResolution::Half));
                }
            }
        }

        let dropped = tiles.len().saturating_sub(capacity);
        if dropped > 0 {
            log::warn!(
                "Too many terrain nodes selected: wanted {}, limit {capacity}",
                tiles.len()
            );
            tiles.truncate(capacity);
        }
        Ok(Selection { tiles, dropped })
    }

    fn tile(&self, node: &PendingNode, resolution: TileResolution) -> SelectedTile {
        let range = self.ranges.ranges()[node.level as usize];
        SelectedTile {
            id: node.id,
            level: node.level,
            resolution,
            record: InstanceRecord {
                translate: node.aabb.min.truncate().to_array(),
                scale: pow2(node.level) as f32,
                texture_index: self.texture_index,
                morph_range: range.morph_range(),
            },
        }
    }
}
