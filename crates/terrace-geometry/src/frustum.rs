//! View frustum extraction and conservative AABB visibility tests.
//!
//! Planes are extracted from a combined view-projection matrix with the
//! Griggs-Hartmann method, assuming a `[0, 1]` clip-space depth range as
//! produced by `Mat4::perspective_rh` / `Mat4::orthographic_rh`.

use glam::{Mat4, Vec3, Vec4};

use crate::Aabb;

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// A view frustum defined by six inward-pointing planes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    /// Each `Vec4(a, b, c, d)` where `(a,b,c)` is the inward normal and
    /// `d` the signed distance term; a point is inside when `n·p + d >= 0`.
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a combined view-projection matrix.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = rows[2];
        planes[FAR] = rows[3] - rows[2];

        // Normalize each plane so that (a,b,c) is a unit vector.
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Build a frustum from six explicit inward-facing planes.
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self { planes }
    }

    /// A frustum that contains all of space; nothing is ever culled.
    pub fn infinite() -> Self {
        Self {
            planes: [Vec4::W; 6],
        }
    }

    /// The six planes, in left/right/bottom/top/near/far order.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Returns true if any plane is non-finite or has a zero normal with a
    /// non-positive distance term (as extracted from a singular matrix).
    pub fn is_degenerate(&self) -> bool {
        self.planes.iter().any(|plane| {
            !plane.is_finite() || (plane.truncate() == Vec3::ZERO && plane.w <= 0.0)
        })
    }

    /// Test whether an AABB is at least partially inside the frustum.
    ///
    /// Uses the p-vertex (positive vertex) method: for each plane, find
    /// the corner of the AABB furthest along the plane normal. If that
    /// corner is behind the plane, the entire AABB is outside. Boxes
    /// touching a plane count as visible.
    ///
    /// This is conservative: it may return `true` for some AABBs that
    /// are fully outside (false positives near frustum corners), but
    /// never returns `false` for visible objects.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();
            let p = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if normal.dot(p) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_camera_vp() -> Mat4 {
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 1000.0);
        proj * view
    }

    #[test]
    fn test_object_in_front_visible() {
        let frustum = Frustum::from_view_projection(&default_camera_vp());
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, 1.0, -3.0));
        assert!(frustum.is_visible(&aabb));
    }

    #[test]
    fn test_object_behind_camera_not_visible() {
        let frustum = Frustum::from_view_projection(&default_camera_vp());
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0));
        assert!(!frustum.is_visible(&aabb));
    }

    #[test]
    fn test_object_partially_in_frustum_is_visible() {
        let frustum = Frustum::from_view_projection(&default_camera_vp());
        let aabb = Aabb::new(Vec3::new(-100.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(frustum.is_visible(&aabb));
    }

    #[test]
    fn test_all_six_planes_tested() {
        let frustum = Frustum::from_view_projection(&default_camera_vp());

        let left = Aabb::new(Vec3::new(-1000.0, 0.0, -5.0), Vec3::new(-999.0, 1.0, -4.0));
        assert!(!frustum.is_visible(&left));

        let right = Aabb::new(Vec3::new(999.0, 0.0, -5.0), Vec3::new(1000.0, 1.0, -4.0));
        assert!(!frustum.is_visible(&right));

        let above = Aabb::new(Vec3::new(0.0, 999.0, -5.0), Vec3::new(1.0, 1000.0, -4.0));
        assert!(!frustum.is_visible(&above));

        let below = Aabb::new(Vec3::new(0.0, -1000.0, -5.0), Vec3::new(1.0, -999.0, -4.0));
        assert!(!frustum.is_visible(&below));

        let beyond_far = Aabb::new(Vec3::new(0.0, 0.0, -2000.0), Vec3::new(1.0, 1.0, -1500.0));
        assert!(!frustum.is_visible(&beyond_far));
    }

    #[test]
    fn test_planes_are_normalized() {
        let frustum = Frustum::from_view_projection(&default_camera_vp());
        for plane in frustum.planes() {
            let normal_len = plane.truncate().length();
            assert!(
                (normal_len - 1.0).abs() < 1e-4,
                "plane normal not normalized: {normal_len}"
            );
        }
    }

    #[test]
    fn test_infinite_frustum_sees_everything() {
        let frustum = Frustum::infinite();
        let far_away = Aabb::new(Vec3::splat(1e9), Vec3::splat(1e9 + 1.0));
        assert!(frustum.is_visible(&far_away));
        assert!(!frustum.is_degenerate());
    }

    #[test]
    fn test_half_space_planes_touching_box_visible() {
        // Keep x >= 10 only.
        let frustum = Frustum::from_planes([
            Vec4::new(1.0, 0.0, 0.0, -10.0),
            Vec4::W,
            Vec4::W,
            Vec4::W,
            Vec4::W,
            Vec4::W,
        ]);
        let touching = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 1.0));
        let outside = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(9.5, 1.0, 1.0));
        assert!(frustum.is_visible(&touching));
        assert!(!frustum.is_visible(&outside));
    }

    #[test]
    fn test_degenerate_frustum_detection() {
        let singular = Frustum::from_view_projection(&Mat4::ZERO);
        assert!(singular.is_degenerate());

        let nan = Frustum::from_planes([Vec4::new(f32::NAN, 0.0, 0.0, 0.0); 6]);
        assert!(nan.is_degenerate());

        assert!(!Frustum::from_view_projection(&default_camera_vp()).is_degenerate());
    }
}
