//! Errors reported by tree construction, bounds aggregation and selection.

use terrace_heightfield::{HeightfieldError, SampleRect};

/// Errors raised by the LOD engine.
///
/// Every variant is a configuration or ordering mistake on the caller's side;
/// capacity overruns are clamped and logged instead.
#[derive(Debug, thiserror::Error)]
pub enum LodError {
    /// The requested tree depth cannot be addressed with 32-bit node ids.
    #[error("tree depth {depth} exceeds the supported maximum of {max}")]
    DepthTooLarge { depth: u32, max: u32 },

    /// Leaf nodes must have a positive, finite world size.
    #[error("invalid node size {0}")]
    InvalidNodeSize(f32),

    /// Tile meshes need at least two quads per side to morph.
    #[error("invalid tile mesh size {0}")]
    InvalidMeshSize(u32),

    /// The height source has no samples to aggregate.
    #[error("height source has no samples")]
    EmptyHeightSource,

    /// A node id fell outside the bounds array.
    #[error("node id {id} exceeds bounds array capacity {capacity}")]
    NodeIdOverflow { id: u32, capacity: usize },

    /// Selection was requested before any bounds aggregation.
    #[error("node bounds have not been aggregated")]
    BoundsNotAggregated,

    /// Selection was requested while an edited region awaits re-aggregation.
    #[error("node bounds are stale over samples {region:?}")]
    StaleBounds { region: SampleRect },

    /// Failure in the underlying height field.
    #[error("height field error: {0}")]
    Heightfield(#[from] HeightfieldError),
}
