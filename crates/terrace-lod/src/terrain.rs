//! Frame-level terrain facade: owns the LOD tree, refreshes it after height
//! field edits and turns each frame's selection into per-mesh instance
//! buffers.

use glam::{UVec2, Vec2, Vec3};
use terrace_geometry::{Aabb, Frustum};
use terrace_heightfield::{HeightSource, Heightmap, SampleRect};

use crate::instance::{InstanceTarget, emit};
use crate::node_id::total_node_count;
use crate::walker::TileResolution;
use crate::{AggregationStats, LodError, LodTree};

/// Smallest and largest supported tile mesh resolution.
const MESH_SIZE_RANGE: std::ops::RangeInclusive<u32> = 4..=256;
/// Number of debug visualisations besides "off".
const DEBUG_MODE_COUNT: u32 = 1;

/// Construction parameters for [`TerrainLod`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Number of LOD levels; the tree has `max_lod_levels - 1` levels below the root.
    pub max_lod_levels: u32,
    /// World size of a finest-level tile.
    pub node_size: f32,
    /// Centre of the terrain footprint.
    pub center: Vec2,
    /// Quads per side of the full-resolution tile mesh. A power of two.
    pub mesh_size: u32,
    pub texture_index: u32,
    /// Fraction of all tree nodes each instance buffer is sized for.
    pub instance_load_factor: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            max_lod_levels: 7,
            node_size: 32.0,
            center: Vec2::ZERO,
            mesh_size: 32,
            texture_index: 0,
            instance_load_factor: 0.5,
        }
    }
}

/// Shader constants for drawing the selected tiles.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniform {
    pub camera_origin: [f32; 3],
    /// Elevation of raw height sample zero.
    pub height_offset: f32,
    /// Half the height field size, in samples.
    pub terrain_half_size: [f32; 2],
    /// `(mesh_size / 2, 2 / mesh_size)`, used to snap morphing vertices.
    pub morph_constants: [f32; 2],
    /// Elevation span of the raw sample range.
    pub height_scale: f32,
    pub node_size: f32,
    pub debug_mode: u32,
    pub _padding: u32,
}

/// Counters from one [`TerrainLod::prepare_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Tiles written to the full-resolution buffer.
    pub full_tiles: usize,
    /// Tiles written to the half-resolution buffer.
    pub half_tiles: usize,
    /// Selected tiles that did not fit in either buffer.
    pub dropped: usize,
}

/// A height-field terrain drawn with continuous distance-based LOD.
#[derive(Clone, Debug)]
pub struct TerrainLod {
    settings: TerrainSettings,
    tree: LodTree,
    debug_mode: u32,
}

impl TerrainLod {
    /// Build the LOD tree described by `settings`.
    ///
    /// The tree starts without bounds; call [`TerrainLod::set_heightmap`]
    /// before the first frame.
    pub fn new(settings: TerrainSettings) -> Result<Self, LodError> {
        validate_mesh_size(settings.mesh_size)?;
        let tree = build_tree(&settings)?;
        Ok(Self {
            settings,
            tree,
            debug_mode: 0,
        })
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn tree(&self) -> &LodTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LodTree {
        &mut self.tree
    }

    /// Rebuild the tree with a new number of levels. Bounds must be
    /// aggregated again before the next frame.
    pub fn set_max_lod_levels(&mut self, levels: u32) -> Result<(), LodError> {
        let settings = TerrainSettings {
            max_lod_levels: levels,
            ..self.settings.clone()
        };
        self.tree = build_tree(&settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn mesh_size(&self) -> u32 {
        self.settings.mesh_size
    }

    pub fn set_mesh_size(&mut self, mesh_size: u32) -> Result<(), LodError> {
        validate_mesh_size(mesh_size)?;
        self.settings.mesh_size = mesh_size;
        Ok(())
    }

    /// `(mesh_size / 2, 2 / mesh_size)`.
    pub fn morph_constants(&self) -> [f32; 2] {
        let size = self.settings.mesh_size as f32;
        [size * 0.5, 2.0 / size]
    }

    pub fn debug_mode(&self) -> u32 {
        self.debug_mode
    }

    /// Select a debug visualisation; out-of-range modes wrap around.
    pub fn set_debug_mode(&mut self, mode: u32) {
        self.debug_mode = mode % (DEBUG_MODE_COUNT + 1);
    }

    /// Aggregate bounds over the whole of `source`.
    pub fn set_heightmap<S: HeightSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<AggregationStats, LodError> {
        let dimensions = source.dimensions();
        log::info!(
            "Binding {}x{} height field to terrain",
            dimensions.x,
            dimensions.y
        );
        self.invalidate(source, UVec2::ZERO, dimensions)
    }

    /// Re-aggregate bounds over the edited samples `min..max`.
    pub fn invalidate<S: HeightSource + ?Sized>(
        &mut self,
        source: &S,
        min: UVec2,
        max: UVec2,
    ) -> Result<AggregationStats, LodError> {
        self.tree.recompute_bounds(source, SampleRect::new(min, max))
    }

    /// Records each instance buffer should hold.
    pub fn instance_capacity(&self) -> usize {
        let nodes = total_node_count(self.tree.max_depth()) as f64;
        (nodes * f64::from(self.settings.instance_load_factor)) as usize
    }

    /// Select this frame's tiles and write them into the full- and
    /// half-resolution buffers.
    pub fn prepare_frame<F, H>(
        &self,
        camera_origin: Vec3,
        frustum: &Frustum,
        full: &mut F,
        half: &mut H,
    ) -> Result<FrameStats, LodError>
    where
        F: InstanceTarget + ?Sized,
        H: InstanceTarget + ?Sized,
    {
        let capacity = full.capacity().saturating_add(half.capacity());
        let selection = self.tree.select(camera_origin, frustum, capacity)?;

        let full_records = selection.records(TileResolution::Full);
        let half_records = selection.records(TileResolution::Half);
        let full_tiles = emit(&full_records, full);
        let half_tiles = emit(&half_records, half);

        Ok(FrameStats {
            full_tiles,
            half_tiles,
            dropped: selection.dropped + (full_records.len() - full_tiles)
                + (half_records.len() - half_tiles),
        })
    }

    /// Side length of the terrain footprint.
    pub fn terrain_size(&self) -> f32 {
        self.tree.size()
    }

    /// World-space minimum corner of the terrain footprint.
    pub fn terrain_offset(&self) -> Vec2 {
        self.tree.offset()
    }

    /// Box enclosing the whole terrain.
    pub fn terrain_bounds(&self) -> Aabb {
        self.tree.root_aabb()
    }

    /// Terrain elevation at world position `(x, y)`, or `f32::INFINITY`
    /// outside the height field.
    pub fn height_at<S: HeightSource + ?Sized>(&self, source: &S, x: f32, y: f32) -> f32 {
        let sample = self.world_to_sample(source, Vec2::new(x, y));
        source.height_at(sample.x, sample.y)
    }

    /// First point where the ray from `origin` along `direction` meets the
    /// terrain surface.
    ///
    /// Marches through the terrain box in steps of one sample spacing, so the
    /// hit is accurate to that spacing.
    pub fn raycast<S: HeightSource + ?Sized>(
        &self,
        source: &S,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<Vec3> {
        let direction = direction.try_normalize()?;
        let dimensions = source.dimensions().as_vec2();
        let step = (self.terrain_size() / dimensions.max_element()).max(f32::EPSILON);

        // Pad vertically so surfaces lying on the box faces are still crossed.
        let mut bounds = self.terrain_bounds();
        bounds.min.z -= step;
        bounds.max.z += step;
        let (enter, exit) = bounds.ray_intersection(origin, direction)?;

        let start = origin + direction * enter;
        let steps = ((exit - enter) / step) as usize;

        (0..=steps).find_map(|i| {
            let mut point = start + direction * (i as f32 * step);
            let height = self.height_at(source, point.x, point.y);
            if height.is_finite() && height >= point.z {
                point.z = height;
                Some(point)
            } else {
                None
            }
        })
    }

    /// Shader constants for the current frame.
    pub fn uniform(&self, heightmap: &Heightmap, camera_origin: Vec3) -> TerrainUniform {
        TerrainUniform {
            camera_origin: camera_origin.to_array(),
            height_offset: heightmap.min_elevation(),
            terrain_half_size: (heightmap.dimensions().as_vec2() * 0.5).to_array(),
            morph_constants: self.morph_constants(),
            height_scale: heightmap.max_elevation() - heightmap.min_elevation(),
            node_size: self.settings.node_size,
            debug_mode: self.debug_mode,
            _padding: 0,
        }
    }

    fn world_to_sample<S: HeightSource + ?Sized>(&self, source: &S, world: Vec2) -> Vec2 {
        (world - self.terrain_offset()) / self.terrain_size() * source.dimensions().as_vec2()
    }
}

fn build_tree(settings: &TerrainSettings) -> Result<LodTree, LodError> {
    let max_depth = settings.max_lod_levels.max(1) - 1;
    let mut tree = LodTree::new(max_depth, settings.node_size, settings.center)?;
    tree.set_texture_index(settings.texture_index);
    Ok(tree)
}

fn validate_mesh_size(mesh_size: u32) -> Result<(), LodError> {
    if !mesh_size.is_power_of_two() || !MESH_SIZE_RANGE.contains(&mesh_size) {
        return Err(LodError::InvalidMeshSize(mesh_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use terrace_heightfield::{HeightmapParams, generate_heightmap};

    use crate::InstanceBuffer;

    use super::*;

    fn small_settings() -> TerrainSettings {
        TerrainSettings {
            max_lod_levels: 4,
            node_size: 16.0,
            center: Vec2::new(64.0, 64.0),
            ..Default::default()
        }
    }

    fn terrain_with_map() -> (TerrainLod, Heightmap) {
        let map = generate_heightmap(64, 64, HeightmapParams::default(), 0.0, 40.0).unwrap();
        let mut terrain = TerrainLod::new(small_settings()).unwrap();
        terrain.set_heightmap(&map).unwrap();
        (terrain, map)
    }

    #[test]
    fn test_uniform_block_size() {
        assert_eq!(std::mem::size_of::<TerrainUniform>(), 48);
    }

    #[test]
    fn test_footprint_from_settings() {
        let terrain = TerrainLod::new(small_settings()).unwrap();
        assert_eq!(terrain.tree().max_depth(), 3);
        assert_eq!(terrain.terrain_size(), 128.0);
        assert_eq!(terrain.terrain_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_rejects_bad_mesh_size() {
        let settings = TerrainSettings {
            mesh_size: 48,
            ..small_settings()
        };
        assert!(matches!(
            TerrainLod::new(settings),
            Err(LodError::InvalidMeshSize(48))
        ));

        let mut terrain = TerrainLod::new(small_settings()).unwrap();
        assert!(terrain.set_mesh_size(2).is_err());
        terrain.set_mesh_size(64).unwrap();
        assert_eq!(terrain.morph_constants(), [32.0, 2.0 / 64.0]);
    }

    #[test]
    fn test_instance_capacity_uses_load_factor() {
        let terrain = TerrainLod::new(small_settings()).unwrap();
        // 1 + 4 + 16 + 64 nodes
        assert_eq!(terrain.instance_capacity(), 42);
    }

    #[test]
    fn test_prepare_frame_fills_both_buffers() {
        let (terrain, _map) = terrain_with_map();
        let mut full = InstanceBuffer::new(64);
        let mut half = InstanceBuffer::new(64);

        let stats = terrain
            .prepare_frame(Vec3::new(0.0, 0.0, 20.0), &Frustum::infinite(), &mut full, &mut half)
            .unwrap();
        assert_eq!(stats.full_tiles, full.len());
        assert_eq!(stats.half_tiles, half.len());
        assert_eq!(stats.dropped, 0);
        assert!(stats.full_tiles > 0);

        let covered: f32 = full
            .records()
            .iter()
            .chain(half.records())
            .map(|r| (r.scale * 16.0).powi(2))
            .sum();
        assert_eq!(covered, 128.0 * 128.0);
    }

    #[test]
    fn test_prepare_frame_reports_overflow() {
        let (terrain, _map) = terrain_with_map();
        let camera = Vec3::new(0.0, 0.0, 20.0);
        let reference = terrain
            .prepare_frame(
                camera,
                &Frustum::infinite(),
                &mut InstanceBuffer::new(64),
                &mut InstanceBuffer::new(64),
            )
            .unwrap();
        let total = reference.full_tiles + reference.half_tiles;

        let mut full = InstanceBuffer::new(2);
        let mut half = InstanceBuffer::new(0);
        let stats = terrain
            .prepare_frame(camera, &Frustum::infinite(), &mut full, &mut half)
            .unwrap();
        assert!(stats.full_tiles <= 2);
        assert_eq!(stats.half_tiles, 0);
        assert_eq!(stats.full_tiles + stats.dropped, total);
    }

    #[test]
    fn test_changing_levels_requires_new_bounds() {
        let (mut terrain, map) = terrain_with_map();
        terrain.set_max_lod_levels(5).unwrap();
        assert_eq!(terrain.tree().max_depth(), 4);
        assert_eq!(terrain.terrain_size(), 256.0);

        let mut full = InstanceBuffer::new(64);
        let mut half = InstanceBuffer::new(64);
        let result =
            terrain.prepare_frame(Vec3::ZERO, &Frustum::infinite(), &mut full, &mut half);
        assert!(matches!(result, Err(LodError::BoundsNotAggregated)));

        terrain.set_heightmap(&map).unwrap();
        assert!(
            terrain
                .prepare_frame(Vec3::ZERO, &Frustum::infinite(), &mut full, &mut half)
                .is_ok()
        );
    }

    #[test]
    fn test_invalidate_refreshes_edited_region() {
        let mut map = Heightmap::new(64, 64, 0.0, 100.0).unwrap();
        let mut terrain = TerrainLod::new(small_settings()).unwrap();
        terrain.set_heightmap(&map).unwrap();
        assert_eq!(terrain.terrain_bounds().max.z, 0.0);

        let touched = map.fill_rect(SampleRect::new(UVec2::new(10, 10), UVec2::new(12, 12)), 90.0);
        terrain.tree_mut().mark_dirty(touched);
        terrain.invalidate(&map, touched.min, touched.max).unwrap();

        assert!(terrain.tree().dirty_region().is_none());
        let raised = terrain.terrain_bounds().max.z;
        assert!((raised - 90.0).abs() < 0.01, "{raised}");
    }

    #[test]
    fn test_height_at_maps_world_to_samples() {
        let (terrain, map) = terrain_with_map();
        // 128 world units over 64 samples
        assert_eq!(terrain.height_at(&map, 20.0, 40.0), map.elevation(10, 20));
        assert_eq!(terrain.height_at(&map, -1.0, 40.0), f32::INFINITY);
    }

    #[test]
    fn test_raycast_straight_down_hits_surface() {
        let (terrain, map) = terrain_with_map();
        let hit = terrain
            .raycast(&map, Vec3::new(30.0, 50.0, 500.0), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_eq!(hit.truncate(), Vec2::new(30.0, 50.0));
        assert_eq!(hit.z, terrain.height_at(&map, 30.0, 50.0));
    }

    #[test]
    fn test_raycast_on_flat_terrain() {
        let map = Heightmap::new(32, 32, 5.0, 5.0).unwrap();
        let mut terrain = TerrainLod::new(small_settings()).unwrap();
        terrain.set_heightmap(&map).unwrap();

        let hit = terrain
            .raycast(&map, Vec3::new(10.0, 10.0, 50.0), Vec3::new(1.0, 1.0, -1.0))
            .unwrap();
        assert_eq!(hit.z, 5.0);
        assert!((hit.x - 55.0).abs() < 4.0);
    }

    #[test]
    fn test_raycast_miss() {
        let (terrain, map) = terrain_with_map();
        assert!(
            terrain
                .raycast(&map, Vec3::new(30.0, 50.0, 500.0), Vec3::Z)
                .is_none()
        );
        assert!(
            terrain
                .raycast(&map, Vec3::new(30.0, 50.0, 500.0), Vec3::ZERO)
                .is_none()
        );
    }

    #[test]
    fn test_uniform_constants() {
        let (mut terrain, map) = terrain_with_map();
        terrain.set_debug_mode(3);
        let uniform = terrain.uniform(&map, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(uniform.camera_origin, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.height_offset, 0.0);
        assert_eq!(uniform.height_scale, 40.0);
        assert_eq!(uniform.terrain_half_size, [32.0, 32.0]);
        assert_eq!(uniform.morph_constants, [16.0, 1.0 / 16.0]);
        assert_eq!(uniform.node_size, 16.0);
        assert_eq!(uniform.debug_mode, 1);
    }
}
