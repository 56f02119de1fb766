//! Bounding volumes and view frustum
//!
//! Axis-aligned boxes used for frustum rejection and coverage estimation,
//! and the six-plane frustum they are tested against.

use crate::foundation::math::{Mat4, Point3, Vec3, Vec4};

/// Axis-aligned bounding box
///
/// A box built from no points is *invalid*: it has no extent, never
/// intersects a frustum and transforms to another invalid box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxVolume {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
    valid: bool,
}

impl BoxVolume {
    /// Create a new valid box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max, valid: true }
    }

    /// Create an invalid (empty) box
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(f32::MIN),
            valid: false,
        }
    }

    /// Create a box centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Smallest box enclosing all points; invalid if `points` is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut volume = Self::empty();
        for p in points {
            volume.min = volume.min.inf(p);
            volume.max = volume.max.sup(p);
            volume.valid = true;
        }
        volume
    }

    /// Whether the box encloses anything
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Mark the box as empty so the next reader recomputes it
    pub fn invalidate(&mut self) {
        *self = Self::empty();
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Length of the min-to-max diagonal; zero for an invalid box
    pub fn diameter(&self) -> f32 {
        if self.valid {
            (self.max - self.min).magnitude()
        } else {
            0.0
        }
    }

    /// Overwrite this box with `local` transformed by `transform`
    ///
    /// Uses the absolute-value matrix form (Arvo), valid for affine
    /// transforms: the new half-extents are `|M3x3| * extents`.
    pub fn transform_from(&mut self, transform: &Mat4, local: &Self) {
        if !local.valid {
            self.invalidate();
            return;
        }

        let center = transform.transform_point(&Point3::from(local.center()));
        let linear = transform.fixed_view::<3, 3>(0, 0).abs();
        let extents = linear * local.extents();

        *self = Self::from_center_extents(center.coords, extents);
    }

    /// Return `self` transformed by `transform` as a new box
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let mut out = Self::empty();
        out.transform_from(transform, self);
        out
    }
}

impl Default for BoxVolume {
    fn default() -> Self {
        Self::empty()
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized, pointing into the frustum)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal: normal.normalize(), distance }
    }

    /// Build a plane from `ax + by + cz + d = 0` coefficients, normalizing
    fn from_coefficients(c: Vec4) -> Self {
        let normal = Vec3::new(c.x, c.y, c.z);
        let len = normal.magnitude();
        if len > f32::EPSILON {
            Self { normal: normal / len, distance: c.w / len }
        } else {
            Self { normal, distance: c.w }
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a clip matrix (Gribb-Hartmann)
    ///
    /// `clip` is usually `projection * view * scene`; the planes come out in
    /// the space the matrix maps *from*. Assumes OpenGL clip space.
    pub fn from_matrix(clip: &Mat4) -> Self {
        let r0: Vec4 = clip.row(0).transpose();
        let r1: Vec4 = clip.row(1).transpose();
        let r2: Vec4 = clip.row(2).transpose();
        let r3: Vec4 = clip.row(3).transpose();

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Check if a box is inside or intersects the frustum
    ///
    /// Conservative: boxes near a frustum corner may pass although they
    /// are outside.
    pub fn intersect(&self, volume: &BoxVolume) -> bool {
        if !volume.is_valid() {
            return false;
        }

        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = volume.min;
            if plane.normal.x >= 0.0 { p.x = volume.max.x; }
            if plane.normal.y >= 0.0 { p.y = volume.max.y; }
            if plane.normal.z >= 0.0 { p.z = volume.max.z; }

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }

        true
    }
}
