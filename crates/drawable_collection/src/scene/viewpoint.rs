//! Viewpoint parameters used for coverage estimation

use crate::foundation::math::{utils, Mat4};

/// Camera model the culler reads per frame
pub trait Viewpoint {
    /// Distance to the near clipping plane
    fn near(&self) -> f32;

    /// Height of the image plane at distance one in front of the eye
    fn img_plane_height_at_dist_one(&self) -> f32;
}

/// Symmetric perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveViewpoint {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
}

impl PerspectiveViewpoint {
    /// Create a perspective viewpoint
    pub fn new(fov_y: f32, near: f32, far: f32) -> Self {
        Self { fov_y, near, far }
    }

    /// Create a perspective viewpoint from a field of view in degrees
    pub fn from_degrees(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self::new(utils::deg_to_rad(fov_y_degrees), near, far)
    }

    /// OpenGL-convention projection matrix for the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::new_perspective(aspect, self.fov_y, self.near, self.far)
    }
}

impl Default for PerspectiveViewpoint {
    fn default() -> Self {
        // 45 degree vertical field of view
        Self::new(std::f32::consts::FRAC_PI_4, 0.1, 10_000.0)
    }
}

impl Viewpoint for PerspectiveViewpoint {
    fn near(&self) -> f32 {
        self.near
    }

    fn img_plane_height_at_dist_one(&self) -> f32 {
        2.0 * (self.fov_y * 0.5).tan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_image_plane_height_for_right_angle_fov() {
        let viewpoint = PerspectiveViewpoint::from_degrees(90.0, 0.5, 100.0);
        assert_relative_eq!(viewpoint.img_plane_height_at_dist_one(), 2.0, epsilon = 1e-5);
        assert_eq!(viewpoint.near(), 0.5);
    }

    #[test]
    fn test_projection_maps_near_plane_to_minus_one() {
        let viewpoint = PerspectiveViewpoint::new(1.0, 1.0, 50.0);
        let clip = viewpoint.projection(1.5) * crate::foundation::math::Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert_relative_eq!(clip.z / clip.w, -1.0, epsilon = 1e-5);
    }
}
