use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Mat4, UVec2, Vec2, Vec3};
use terrace_geometry::Frustum;
use terrace_heightfield::{HeightSource, Heightmap, HeightmapParams, SampleRect, generate_heightmap};
use terrace_lod::*;

fn heightmap() -> Heightmap {
    generate_heightmap(513, 513, HeightmapParams::default(), 0.0, 600.0).unwrap()
}

fn aggregated_tree(map: &Heightmap) -> LodTree {
    let mut tree = LodTree::new(6, 32.0, Vec2::ZERO).unwrap();
    tree.recompute_bounds(map, SampleRect::full(map.dimensions()))
        .unwrap();
    tree
}

fn camera_frustum(eye: Vec3) -> Frustum {
    let view = Mat4::look_at_rh(eye, eye + Vec3::new(1.0, 0.3, -0.2), Vec3::Z);
    let proj = Mat4::perspective_rh(70f32.to_radians(), 16.0 / 9.0, 0.5, 20_000.0);
    Frustum::from_view_projection(&(proj * view))
}

fn bench_select_infinite_frustum(c: &mut Criterion) {
    let map = heightmap();
    let tree = aggregated_tree(&map);
    let eye = black_box(Vec3::new(-300.0, 200.0, 650.0));
    c.bench_function("select_infinite_frustum", |bencher| {
        bencher.iter(|| black_box(tree.select(eye, &Frustum::infinite(), 4096).unwrap()))
    });
}

fn bench_select_perspective(c: &mut Criterion) {
    let map = heightmap();
    let tree = aggregated_tree(&map);
    let eye = black_box(Vec3::new(-300.0, 200.0, 650.0));
    let frustum = camera_frustum(eye);
    c.bench_function("select_perspective", |bencher| {
        bencher.iter(|| black_box(tree.select(eye, &frustum, 4096).unwrap()))
    });
}

fn bench_emit(c: &mut Criterion) {
    let map = heightmap();
    let tree = aggregated_tree(&map);
    let selection = tree
        .select(Vec3::new(0.0, 0.0, 650.0), &Frustum::infinite(), 4096)
        .unwrap();
    let records = selection.records(TileResolution::Full);
    let mut buffer = InstanceBuffer::new(4096);
    c.bench_function("emit_full_resolution", |bencher| {
        bencher.iter(|| black_box(emit(black_box(&records), &mut buffer)))
    });
}

fn bench_full_aggregation(c: &mut Criterion) {
    let map = heightmap();
    let mut tree = LodTree::new(6, 32.0, Vec2::ZERO).unwrap();
    c.bench_function("recompute_bounds_full", |bencher| {
        bencher.iter(|| {
            black_box(
                tree.recompute_bounds(&map, SampleRect::full(map.dimensions()))
                    .unwrap(),
            )
        })
    });
}

fn bench_brush_aggregation(c: &mut Criterion) {
    let map = heightmap();
    let mut tree = aggregated_tree(&map);
    let brush = SampleRect::new(UVec2::new(240, 240), UVec2::new(272, 272));
    c.bench_function("recompute_bounds_brush", |bencher| {
        bencher.iter(|| black_box(tree.recompute_bounds(&map, brush).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_select_infinite_frustum,
    bench_select_perspective,
    bench_emit,
    bench_full_aggregation,
    bench_brush_aggregation,
);
criterion_main!(benches);
