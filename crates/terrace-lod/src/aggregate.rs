//! Bottom-up refresh of cached node bounds from a height source.

use glam::UVec2;
use terrace_heightfield::{HeightSource, SampleRect};

use crate::node_id::{NodeId, pow2};
use crate::tree::child_grid_min;
use crate::{LodError, LodTree, NodeBounds};

/// Counters from one [`LodTree::recompute_bounds`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Nodes whose bounds were rewritten, leaves included.
    pub nodes_visited: usize,
    /// Leaves whose bounds were queried from the height source.
    pub leaves_sampled: usize,
}

/// Half-open rectangle of leaf cells.
#[derive(Clone, Copy, Debug)]
struct CellRect {
    min: UVec2,
    max: UVec2,
}

impl CellRect {
    fn overlaps(&self, min: UVec2, cells: u32) -> bool {
        let max = min + UVec2::splat(cells);
        self.min.x < max.x && min.x < self.max.x && self.min.y < max.y && min.y < self.max.y
    }
}

/// Maps leaf cells onto height field samples.
#[derive(Clone, Copy, Debug)]
struct SampleGrid {
    samples: UVec2,
    cells: u32,
}

impl SampleGrid {
    /// Cells whose sample rectangles contain any sample of `region`.
    ///
    /// Leaf rectangles reach one sample past their far edge, so the region is
    /// widened by one sample towards the minimum before being mapped.
    fn cells_touching(&self, region: SampleRect) -> CellRect {
        let cells = u64::from(self.cells);
        let map_min = |sample: u32, extent: u32| {
            let sample = u64::from(sample.saturating_sub(1));
            (sample * cells / u64::from(extent)) as u32
        };
        let map_max = |sample: u32, extent: u32| {
            let mapped = (u64::from(sample) * cells).div_ceil(u64::from(extent));
            mapped.min(cells) as u32
        };
        CellRect {
            min: UVec2::new(
                map_min(region.min.x, self.samples.x),
                map_min(region.min.y, self.samples.y),
            ),
            max: UVec2::new(
                map_max(region.max.x, self.samples.x),
                map_max(region.max.y, self.samples.y),
            ),
        }
    }

    /// Samples under `cells` leaf cells starting at `cell_min`, including the
    /// row and column shared with the next cell.
    fn sample_rect(&self, cell_min: UVec2, cells: u32) -> SampleRect {
        let axis = |cell: u32, extent: u32| {
            let cell = u64::from(cell);
            let grid = u64::from(self.cells);
            let extent64 = u64::from(extent);
            let start = (cell * extent64 / grid) as u32;
            let end = (((cell + u64::from(cells)) * extent64).div_ceil(grid) + 1).min(extent64);
            let start = start.min(extent - 1);
            (start, (end as u32).max(start + 1))
        };
        let (min_x, max_x) = axis(cell_min.x, self.samples.x);
        let (min_y, max_y) = axis(cell_min.y, self.samples.y);
        SampleRect::new(UVec2::new(min_x, min_y), UVec2::new(max_x, max_y))
    }
}

impl LodTree {
    /// Re-aggregate node bounds over the samples in `region`.
    ///
    /// Leaves whose sample rectangles touch the region are re-queried from
    /// `source`; every ancestor is then refolded from its four children. A
    /// pass over the whole field marks the tree as aggregated, and any dirty
    /// region contained in `region` is cleared.
    pub fn recompute_bounds<S: HeightSource + ?Sized>(
        &mut self,
        source: &S,
        region: SampleRect,
    ) -> Result<AggregationStats, LodError> {
        let dimensions = source.dimensions();
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(LodError::EmptyHeightSource);
        }

        let region = region.clamped(dimensions);
        let mut stats = AggregationStats::default();
        if region.is_empty() {
            log::debug!("Skipping bounds aggregation over empty region {region:?}");
            return Ok(stats);
        }

        let grid = SampleGrid {
            samples: dimensions,
            cells: pow2(self.max_depth),
        };
        let cells = grid.cells_touching(region);
        self.aggregate_node(
            source,
            &grid,
            &cells,
            NodeId::ROOT,
            self.max_depth,
            UVec2::ZERO,
            &mut stats,
        )?;

        if region == SampleRect::full(dimensions) {
            self.aggregated = true;
        }
        if self.dirty.is_some_and(|dirty| region.contains_rect(&dirty)) {
            self.dirty = None;
        }

        log::debug!(
            "Aggregated bounds over {region:?}: {} nodes, {} leaves",
            stats.nodes_visited,
            stats.leaves_sampled
        );
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn aggregate_node<S: HeightSource + ?Sized>(
        &mut self,
        source: &S,
        grid: &SampleGrid,
        cells: &CellRect,
        id: NodeId,
        level: u32,
        cell_min: UVec2,
        stats: &mut AggregationStats,
    ) -> Result<NodeBounds, LodError> {
        stats.nodes_visited += 1;

        if level == 0 {
            let heights = source.height_bounds(grid.sample_rect(cell_min, 1));
            let bounds = NodeBounds::new(heights.min, heights.max);
            self.nodes[id.index()] = bounds;
            stats.leaves_sampled += 1;
            return Ok(bounds);
        }

        let child_cells = pow2(level - 1);
        let mut bounds = NodeBounds::UNINITIALIZED;
        for quadrant in 0..4 {
            let child = id.child(quadrant);
            if child.index() >= self.nodes.len() {
                log::error!(
                    "Node id {} exceeds bounds array capacity {}",
                    child.raw(),
                    self.nodes.len()
                );
                return Err(LodError::NodeIdOverflow {
                    id: child.raw(),
                    capacity: self.nodes.len(),
                });
            }

            let child_min = child_grid_min(cell_min, child_cells, quadrant);
            let child_bounds = if cells.overlaps(child_min, child_cells) {
                self.aggregate_node(source, grid, cells, child, level - 1, child_min, stats)?
            } else {
                self.nodes[child.index()]
            };
            bounds = bounds.union(&child_bounds);
        }

        self.nodes[id.index()] = bounds;
        Ok(bounds)
    }
}
