//! Geometric primitives shared by the terrain LOD engine: boxes, spheres, frusta and rays.

mod aabb;
mod frustum;
mod sphere;

pub use aabb::Aabb;
pub use frustum::Frustum;
pub use sphere::BoundingSphere;
