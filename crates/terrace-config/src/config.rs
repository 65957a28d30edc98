//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Tile mesh resolutions the renderer can build.
const MESH_SIZES: [u32; 7] = [4, 8, 16, 32, 64, 128, 256];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// LOD tree and tile settings.
    pub terrain: TerrainConfig,
    /// Height field source.
    pub heightmap: HeightmapConfig,
    /// Demo camera path.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// LOD tree and tile configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of LOD levels, root included (2-11).
    pub max_lod_levels: u32,
    /// World size of a finest-level tile.
    pub node_size: f32,
    /// Centre of the terrain in world XY.
    pub center: [f32; 2],
    /// Quads per side of the full-resolution tile mesh.
    pub mesh_size: u32,
    /// Texture layer used for every tile.
    pub texture_index: u32,
    /// Fraction of all tree nodes each instance buffer holds.
    pub instance_load_factor: f32,
}

/// Height field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightmapConfig {
    /// Generated width in samples.
    pub width: u32,
    /// Generated height in samples.
    pub height: u32,
    /// Noise seed.
    pub seed: u32,
    /// Number of noise octaves.
    pub octaves: u32,
    /// Base noise cycles across the map.
    pub frequency: f64,
    /// Elevation of the lowest raw sample.
    pub min_elevation: f32,
    /// Elevation of the highest raw sample.
    pub max_elevation: f32,
    /// Load this 16-bit PNG instead of generating noise.
    pub path: Option<PathBuf>,
}

/// Orbiting demo camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Height above the terrain centre.
    pub altitude: f32,
    /// Orbit radius around the terrain centre.
    pub orbit_radius: f32,
    /// Number of frames to simulate.
    pub frames: u32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Far clip distance.
    pub far: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log per-frame selection statistics.
    pub show_stats: bool,
    /// Shader debug visualisation (0 = off, 1 = LOD ranges).
    pub debug_mode: u32,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            max_lod_levels: 7,
            node_size: 32.0,
            center: [0.0, 0.0],
            mesh_size: 32,
            texture_index: 0,
            instance_load_factor: 0.5,
        }
    }
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            width: 1025,
            height: 1025,
            seed: 123_456,
            octaves: 8,
            frequency: 2.0,
            min_elevation: 0.0,
            max_elevation: 600.0,
            path: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            altitude: 400.0,
            orbit_radius: 1200.0,
            frames: 120,
            fov_y_degrees: 60.0,
            far: 20_000.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_stats: true,
            debug_mode: 0,
        }
    }
}

/// Default config directory (`<platform config dir>/terrace`), falling back
/// to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("terrace")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Check the settings the terrain cannot be built without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        if !(2..=11).contains(&terrain.max_lod_levels) {
            return Err(invalid(
                "terrain.max_lod_levels",
                format!("{} is outside 2..=11", terrain.max_lod_levels),
            ));
        }
        if !(terrain.node_size.is_finite() && terrain.node_size > 0.0) {
            return Err(invalid(
                "terrain.node_size",
                format!("{} is not a positive size", terrain.node_size),
            ));
        }
        if !MESH_SIZES.contains(&terrain.mesh_size) {
            return Err(invalid(
                "terrain.mesh_size",
                format!("{} is not one of {MESH_SIZES:?}", terrain.mesh_size),
            ));
        }
        if !(terrain.instance_load_factor > 0.0 && terrain.instance_load_factor <= 1.0) {
            return Err(invalid(
                "terrain.instance_load_factor",
                format!("{} is outside (0, 1]", terrain.instance_load_factor),
            ));
        }

        let heightmap = &self.heightmap;
        if heightmap.path.is_none() && (heightmap.width == 0 || heightmap.height == 0) {
            return Err(invalid(
                "heightmap.width",
                format!("{}x{} has no samples", heightmap.width, heightmap.height),
            ));
        }
        if heightmap.max_elevation < heightmap.min_elevation {
            return Err(invalid(
                "heightmap.max_elevation",
                format!(
                    "{} is below min_elevation {}",
                    heightmap.max_elevation, heightmap.min_elevation
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}
