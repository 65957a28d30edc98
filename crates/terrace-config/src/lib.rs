//! Configuration for the terrain LOD demo.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and can be hot-reloaded. Unknown and missing fields are
//! tolerated so older and newer config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, HeightmapConfig, TerrainConfig, default_config_dir};
pub use error::ConfigError;
