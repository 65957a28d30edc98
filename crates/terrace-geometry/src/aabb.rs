//! Axis-aligned bounding boxes in world space (z up).

use glam::{Vec2, Vec3};

/// An axis-aligned bounding box in f32 world space.
///
/// Invariant: `min <= max` on every axis. [`Aabb::new`] sorts the corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from two opposite corners.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Build a box from a horizontal rectangle and a vertical range.
    pub fn from_footprint(min: Vec2, max: Vec2, min_z: f32, max_z: f32) -> Self {
        Self::new(min.extend(min_z), max.extend(max_z))
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents (half-size along each axis).
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Squared distance from `p` to the nearest point of the box (zero inside).
    pub fn distance_squared_to(&self, p: Vec3) -> f32 {
        let nearest = p.clamp(self.min, self.max);
        p.distance_squared(nearest)
    }

    /// Slab test against a ray.
    ///
    /// Returns the parametric `(enter, exit)` distances along `direction`,
    /// with `enter` clamped to zero when the origin is inside the box.
    /// `None` when the ray misses or the box lies behind the origin.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<(f32, f32)> {
        let inv = direction.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;

        let mut enter = f32::NEG_INFINITY;
        let mut exit = f32::INFINITY;
        for axis in 0..3 {
            if direction[axis] == 0.0 {
                // Parallel to the slab: the origin must already lie between the planes.
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let near = t0[axis].min(t1[axis]);
            let far = t0[axis].max(t1[axis]);
            enter = enter.max(near);
            exit = exit.min(far);
        }

        if enter > exit || exit < 0.0 {
            return None;
        }
        Some((enter.max(0.0), exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_new_sorts_corners() {
        let aabb = Aabb::new(Vec3::new(2.0, -1.0, 5.0), Vec3::new(-2.0, 1.0, 3.0));
        assert_eq!(aabb.min, Vec3::new(-2.0, -1.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 1.0, 5.0));
    }

    #[test]
    fn test_center_extents_size() {
        let aabb = Aabb::new(Vec3::new(-2.0, -3.0, -4.0), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.extents(), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 6.0, 8.0));
    }

    #[test]
    fn test_from_footprint() {
        let aabb = Aabb::from_footprint(Vec2::new(0.0, 10.0), Vec2::new(32.0, 42.0), -5.0, 7.0);
        assert_eq!(aabb.min, Vec3::new(0.0, 10.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(32.0, 42.0, 7.0));
    }

    #[test]
    fn test_contains_point_on_boundary() {
        let aabb = unit_box();
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn test_distance_squared_inside_is_zero() {
        assert_eq!(unit_box().distance_squared_to(Vec3::splat(0.5)), 0.0);
    }

    #[test]
    fn test_distance_squared_outside() {
        let d = unit_box().distance_squared_to(Vec3::new(4.0, 5.0, 0.5));
        assert!((d - 25.0).abs() < 1e-5, "expected 25, got {d}");
    }

    #[test]
    fn test_ray_hits_box_from_outside() {
        let hit = unit_box().ray_intersection(Vec3::new(-1.0, 0.5, 0.5), Vec3::X);
        let (enter, exit) = hit.expect("ray should hit");
        assert!((enter - 1.0).abs() < 1e-6);
        assert!((exit - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_from_inside_enters_at_zero() {
        let (enter, exit) = unit_box()
            .ray_intersection(Vec3::splat(0.5), Vec3::NEG_Z)
            .expect("ray should hit");
        assert_eq!(enter, 0.0);
        assert!((exit - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ray_misses_box() {
        assert!(
            unit_box()
                .ray_intersection(Vec3::new(-1.0, 3.0, 0.5), Vec3::X)
                .is_none()
        );
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        assert!(
            unit_box()
                .ray_intersection(Vec3::new(-1.0, 0.5, 0.5), Vec3::NEG_X)
                .is_none()
        );
    }
}
