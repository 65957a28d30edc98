//! Bounding spheres, used as LOD range spheres around the camera.

use glam::Vec3;

use crate::Aabb;

/// A sphere in f32 world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere from its center and radius.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns true if the box touches or overlaps the sphere.
    ///
    /// The test is inclusive: a box whose nearest point lies exactly on the
    /// sphere surface intersects it.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.distance_squared_to(self.center) <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_containing_center_intersects() {
        let sphere = BoundingSphere::new(Vec3::splat(0.5), 0.1);
        assert!(sphere.intersects_aabb(&Aabb::new(Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn test_box_outside_radius_does_not_intersect() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 5.0);
        let aabb = Aabb::new(Vec3::new(6.0, 0.0, 0.0), Vec3::new(7.0, 1.0, 1.0));
        assert!(!sphere.intersects_aabb(&aabb));
    }

    #[test]
    fn test_touching_box_intersects() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 5.0);
        let aabb = Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(7.0, 1.0, 1.0));
        assert!(sphere.intersects_aabb(&aabb));
    }

    #[test]
    fn test_corner_distance_used() {
        // Nearest corner at (3, 4, 0) is exactly 5 away.
        let aabb = Aabb::new(Vec3::new(3.0, 4.0, 0.0), Vec3::new(10.0, 10.0, 0.0));
        assert!(BoundingSphere::new(Vec3::ZERO, 5.0).intersects_aabb(&aabb));
        assert!(!BoundingSphere::new(Vec3::ZERO, 4.99).intersects_aabb(&aabb));
    }
}
