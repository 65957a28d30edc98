//! Headless terrain LOD demo.
//!
//! Builds a height field (generated or loaded from PNG), flies a camera in a
//! circle above it and reports the tiles selected each frame. Halfway through
//! the flight a patch of terrain is raised and its bounds re-aggregated.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags:
//! `cargo run -p terrace-demo -- --lod-levels 9 --frames 30`.

use std::error::Error;

use clap::Parser;
use glam::{Mat4, UVec2, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use terrace_config::{CliArgs, Config, default_config_dir};
use terrace_geometry::Frustum;
use terrace_heightfield::{HeightSource, Heightmap, HeightmapParams, SampleRect, generate_heightmap};
use terrace_lod::{FrameStats, InstanceBuffer, TerrainLod, TerrainSettings};
use tracing::{debug, error, info, warn};

const ASPECT_RATIO: f32 = 16.0 / 9.0;
const NEAR_PLANE: f32 = 0.5;
/// Side length, in samples, of the mid-flight terrain edit.
const BRUSH_SIZE: u32 = 24;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terrace_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("Terrain demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    config.validate()?;

    let mut heightmap = load_heightmap(config)?;
    let mut terrain = TerrainLod::new(terrain_settings(config))?;
    terrain.set_debug_mode(config.debug.debug_mode);
    let stats = terrain.set_heightmap(&heightmap)?;
    info!(
        "Terrain ready: size {}, {} nodes aggregated, {} leaves sampled",
        terrain.terrain_size(),
        stats.nodes_visited,
        stats.leaves_sampled
    );

    let capacity = terrain.instance_capacity();
    let mut full = InstanceBuffer::new(capacity);
    let mut half = InstanceBuffer::new(capacity);
    info!("Instance buffers hold {capacity} tiles each");

    let mut rng = Xoshiro256StarStar::seed_from_u64(u64::from(config.heightmap.seed));
    let frames = config.camera.frames;
    let mut totals = FrameStats::default();

    for frame in 0..frames {
        if frame == frames / 2 {
            raise_random_patch(&mut terrain, &mut heightmap, &mut rng, config)?;
        }

        let eye = camera_position(&terrain, &heightmap, config, frame);
        let frustum = camera_frustum(&terrain, eye, config);
        let stats = terrain.prepare_frame(eye, &frustum, &mut full, &mut half)?;

        if frame == 0 {
            let uniform = terrain.uniform(&heightmap, eye);
            debug!("Terrain uniform: {uniform:?}");
        }
        if config.debug.show_stats {
            info!(
                "Frame {frame}: {} full-res tiles, {} half-res tiles, {} dropped",
                stats.full_tiles, stats.half_tiles, stats.dropped
            );
        }
        if stats.dropped > 0 {
            warn!(
                "Frame {frame} dropped {} tiles; raise terrain.instance_load_factor",
                stats.dropped
            );
        }

        totals.full_tiles += stats.full_tiles;
        totals.half_tiles += stats.half_tiles;
        totals.dropped += stats.dropped;
    }

    if frames > 0 {
        info!(
            "Averages over {frames} frames: {:.1} full-res, {:.1} half-res, {:.1} dropped",
            totals.full_tiles as f32 / frames as f32,
            totals.half_tiles as f32 / frames as f32,
            totals.dropped as f32 / frames as f32
        );
    }

    let eye = camera_position(&terrain, &heightmap, config, 0);
    let centre = terrain.terrain_offset() + Vec2::splat(terrain.terrain_size() * 0.5);
    match terrain.raycast(&heightmap, eye, centre.extend(0.0) - eye) {
        Some(hit) => info!("Camera ray meets terrain at ({:.1}, {:.1}, {:.1})", hit.x, hit.y, hit.z),
        None => info!("Camera ray misses the terrain"),
    }

    Ok(())
}

fn terrain_settings(config: &Config) -> TerrainSettings {
    let terrain = &config.terrain;
    TerrainSettings {
        max_lod_levels: terrain.max_lod_levels,
        node_size: terrain.node_size,
        center: Vec2::from(terrain.center),
        mesh_size: terrain.mesh_size,
        texture_index: terrain.texture_index,
        instance_load_factor: terrain.instance_load_factor,
    }
}

fn load_heightmap(config: &Config) -> Result<Heightmap, Box<dyn Error>> {
    let settings = &config.heightmap;
    let heightmap = match &settings.path {
        Some(path) => Heightmap::load_png(path, settings.min_elevation, settings.max_elevation)?,
        None => {
            let params = HeightmapParams {
                seed: settings.seed,
                octaves: settings.octaves,
                frequency: settings.frequency,
                ..Default::default()
            };
            generate_heightmap(
                settings.width,
                settings.height,
                params,
                settings.min_elevation,
                settings.max_elevation,
            )?
        }
    };
    Ok(heightmap)
}

/// Position on the orbit for `frame`, kept `altitude` above the terrain below.
fn camera_position(terrain: &TerrainLod, heightmap: &Heightmap, config: &Config, frame: u32) -> Vec3 {
    let turns = frame as f32 / config.camera.frames.max(1) as f32;
    let angle = turns * std::f32::consts::TAU;
    let centre = terrain.terrain_offset() + Vec2::splat(terrain.terrain_size() * 0.5);
    let xy = centre + Vec2::new(angle.cos(), angle.sin()) * config.camera.orbit_radius;

    let ground = terrain.height_at(heightmap, xy.x, xy.y);
    let ground = if ground.is_finite() {
        ground
    } else {
        heightmap.min_elevation()
    };
    xy.extend(ground + config.camera.altitude)
}

fn camera_frustum(terrain: &TerrainLod, eye: Vec3, config: &Config) -> Frustum {
    let centre = terrain.terrain_offset() + Vec2::splat(terrain.terrain_size() * 0.5);
    let view = Mat4::look_at_rh(eye, centre.extend(0.0), Vec3::Z);
    let proj = Mat4::perspective_rh(
        config.camera.fov_y_degrees.to_radians(),
        ASPECT_RATIO,
        NEAR_PLANE,
        config.camera.far,
    );
    Frustum::from_view_projection(&(proj * view))
}

/// Raise a random square of samples to the maximum elevation and refresh the
/// bounds beneath it.
fn raise_random_patch(
    terrain: &mut TerrainLod,
    heightmap: &mut Heightmap,
    rng: &mut Xoshiro256StarStar,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let dimensions = heightmap.dimensions();
    let min = UVec2::new(
        rng.gen_range(0..dimensions.x),
        rng.gen_range(0..dimensions.y),
    );
    let rect = SampleRect::new(min, min + UVec2::splat(BRUSH_SIZE));
    let touched = heightmap.fill_rect(rect, config.heightmap.max_elevation);
    terrain.tree_mut().mark_dirty(touched);

    let stats = terrain.invalidate(heightmap, touched.min, touched.max)?;
    info!(
        "Raised samples {:?}..{:?}: {} nodes re-aggregated",
        touched.min, touched.max, stats.nodes_visited
    );
    Ok(())
}
