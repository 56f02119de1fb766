//! Per-frame inputs of the collection

use crate::config::{ConfigError, CullingSettings};
use crate::foundation::math::Mat4;
use crate::scene::{Frustum, Viewpoint};

/// Everything the collection reads from the camera for one frame
///
/// Immutable once handed to a [`DrawableCollection`](super::DrawableCollection).
#[derive(Debug, Clone)]
pub struct FrameSetup {
    /// World-to-eye transform
    pub view_matrix: Mat4,

    /// Eye-to-clip transform
    pub projection_matrix: Mat4,

    /// Scene root transform applied before the view
    pub scene_matrix: Mat4,

    /// Viewport height in pixels
    pub viewport_height: f32,

    /// Near plane distance of the active viewpoint
    pub near: f32,

    /// Image plane height at distance one of the active viewpoint
    pub img_plane_height_at_dist_one: f32,

    /// View frustum; `None` disables frustum culling regardless of settings
    pub frustum: Option<Frustum>,

    /// Culling and sorting settings
    pub settings: CullingSettings,
}

impl FrameSetup {
    /// Create a frame setup with an identity scene matrix
    ///
    /// The frustum is extracted from `projection * view`.
    pub fn new(
        view_matrix: Mat4,
        projection_matrix: Mat4,
        viewport_height: f32,
        viewpoint: &dyn Viewpoint,
    ) -> Self {
        let scene_matrix = Mat4::identity();
        Self {
            view_matrix,
            projection_matrix,
            scene_matrix,
            viewport_height,
            near: viewpoint.near(),
            img_plane_height_at_dist_one: viewpoint.img_plane_height_at_dist_one(),
            frustum: Some(Frustum::from_matrix(&(projection_matrix * view_matrix * scene_matrix))),
            settings: CullingSettings::default(),
        }
    }

    /// Set the scene matrix, re-extracting the frustum if one is present
    pub fn with_scene_matrix(mut self, scene_matrix: Mat4) -> Self {
        self.scene_matrix = scene_matrix;
        if self.frustum.is_some() {
            self.frustum = Some(Frustum::from_matrix(&self.clip_matrix()));
        }
        self
    }

    /// Replace the frustum
    pub fn with_frustum(mut self, frustum: Option<Frustum>) -> Self {
        self.frustum = frustum;
        self
    }

    /// Drop the frustum, disabling frustum culling
    pub fn without_frustum(self) -> Self {
        self.with_frustum(None)
    }

    /// Set the culling settings
    pub fn with_settings(mut self, settings: CullingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Combined `projection * view * scene` matrix
    pub fn clip_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix * self.scene_matrix
    }

    /// Frustum to test against, if frustum culling is active this frame
    pub fn active_frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref().filter(|_| self.settings.frustum_culling)
    }

    /// Height covered by one pixel at distance one
    pub fn pixel_height_at_dist_one(&self) -> f32 {
        self.img_plane_height_at_dist_one / self.viewport_height
    }

    /// Validate the frame setup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_height.is_nan() || self.viewport_height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "viewport height must be positive, got {}",
                self.viewport_height
            )));
        }
        if self.near.is_nan() || self.near <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "near plane distance must be positive, got {}",
                self.near
            )));
        }
        self.settings.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::scene::PerspectiveViewpoint;
    use approx::assert_relative_eq;

    fn setup() -> FrameSetup {
        let viewpoint = PerspectiveViewpoint::from_degrees(90.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(&Point3::new(0.0, 0.0, 5.0), &Point3::origin(), &Vec3::y());
        FrameSetup::new(view, viewpoint.projection(1.0), 200.0, &viewpoint)
    }

    #[test]
    fn test_pixel_height_divides_by_viewport() {
        assert_relative_eq!(setup().pixel_height_at_dist_one(), 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_active_frustum_requires_setting_and_frustum() {
        let frame = setup();
        assert!(frame.active_frustum().is_some());

        let disabled = setup().with_settings(CullingSettings::default().with_frustum_culling(false));
        assert!(disabled.active_frustum().is_none());

        let missing = setup().without_frustum();
        assert!(missing.active_frustum().is_none());
    }

    #[test]
    fn test_scene_matrix_moves_frustum() {
        let frame = setup();
        let shifted = setup().with_scene_matrix(Mat4::new_translation(&Vec3::new(100.0, 0.0, 0.0)));
        assert_ne!(frame.frustum, shifted.frustum);
        assert!(setup().without_frustum().with_scene_matrix(Mat4::identity()).frustum.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(setup().validate().is_ok());

        let mut bad = setup();
        bad.viewport_height = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = setup();
        bad.near = -1.0;
        assert!(bad.validate().is_err());
    }
}
