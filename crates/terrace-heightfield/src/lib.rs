//! Height field storage and queries consumed by the terrain LOD engine.
//!
//! The LOD engine only depends on the [`HeightSource`] trait. [`Heightmap`]
//! is the bundled implementation: a 16-bit sample grid mapped onto an
//! elevation range, with fBm generation and PNG import/export.

mod error;
mod generator;
mod heightmap;
mod png_io;
mod source;

pub use error::HeightfieldError;
pub use generator::{HeightmapParams, HeightmapSampler, generate_heightmap};
pub use heightmap::Heightmap;
pub use source::{HeightBounds, HeightSource, SampleRect};
