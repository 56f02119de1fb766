//! Math utilities and types
//!
//! Provides the `f32` math types used by culling and ordering.
//!
//! Eye space is right-handed with the camera looking down -Z. Projection
//! matrices follow the OpenGL clip convention (-w <= z <= w), which is what
//! [`nalgebra::Matrix4::new_perspective`] produces.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Transform a point by an affine matrix, then by a view matrix
    ///
    /// Equivalent to `(view * model).transform_point(p)` with a few ops less.
    pub fn to_eye_space(model: &Mat4, view: &Mat4, point: &Point3) -> Point3 {
        view.transform_point(&model.transform_point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_conversion_round_trip() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = 1e-6);
        assert_relative_eq!(utils::rad_to_deg(utils::deg_to_rad(37.5)), 37.5, epsilon = 1e-4);
    }

    #[test]
    fn test_to_eye_space_matches_combined_matrix() {
        let model = Mat4::new_translation(&Vec3::new(1.0, 2.0, -3.0));
        let view = Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 5.0),
            &Point3::origin(),
            &Vec3::y(),
        );
        let p = Point3::new(0.5, -0.5, 0.25);

        let split = utils::to_eye_space(&model, &view, &p);
        let combined = (view * model).transform_point(&p);

        assert_relative_eq!(split, combined, epsilon = 1e-5);
    }
}
