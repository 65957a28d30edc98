//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain LOD demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terrace", about = "Continuous-distance terrain LOD demo")]
pub struct CliArgs {
    /// Number of LOD levels, root included.
    #[arg(long)]
    pub lod_levels: Option<u32>,

    /// World size of a finest-level tile.
    #[arg(long)]
    pub node_size: Option<f32>,

    /// Quads per side of the full-resolution tile mesh.
    #[arg(long)]
    pub mesh_size: Option<u32>,

    /// 16-bit PNG heightmap to load instead of generating one.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Noise seed for the generated heightmap.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(levels) = args.lod_levels {
            self.terrain.max_lod_levels = levels;
        }
        if let Some(size) = args.node_size {
            self.terrain.node_size = size;
        }
        if let Some(size) = args.mesh_size {
            self.terrain.mesh_size = size;
        }
        if let Some(ref path) = args.heightmap {
            self.heightmap.path = Some(path.clone());
        }
        if let Some(seed) = args.seed {
            self.heightmap.seed = seed;
        }
        if let Some(frames) = args.frames {
            self.camera.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
