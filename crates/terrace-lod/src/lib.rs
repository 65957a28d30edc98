//! Continuous-distance level-of-detail selection for large terrain grids.
//!
//! A quaternary tree stored as a flat array addressed by path-encoded node ids
//! caches per-node vertical bounds of a height field. Each frame the tree is
//! walked against the camera origin and frustum to select a gap-free,
//! overlap-free set of tiles, which are then written as compact instance
//! records into capacity-bounded buffers for instanced drawing.

mod aggregate;
mod error;
mod instance;
mod node_id;
mod range;
mod terrain;
mod tree;
mod walker;

pub use aggregate::AggregationStats;
pub use error::LodError;
pub use instance::{InstanceBuffer, InstanceRecord, InstanceTarget, MappedRange, emit};
pub use node_id::{
    NodeId, child_id, id_capacity, is_child_max_x, is_child_max_y, pow2, total_node_count,
};
pub use range::{LodRange, RangeTable};
pub use terrain::{FrameStats, TerrainLod, TerrainSettings, TerrainUniform};
pub use tree::{LodTree, MAX_SUPPORTED_DEPTH, NodeBounds};
pub use walker::{SelectedTile, Selection, TileResolution};
