//! Geometric culling
//!
//! Two rejection tests run per visited node: the world-space bounds against
//! the view frustum, then an estimate of the node's on-screen size against
//! the small-feature threshold. The second one acts as a cheap continuous
//! level of detail without a separate LOD pass.

use crate::foundation::math::{utils, Mat4, Point3};
use crate::scene::{GraphState, COVERAGE_UNSET};

use super::DrawableCollection;

/// Eye-space distance used for coverage estimation
///
/// Distance from the eye to the near side of a volume whose center sits at
/// eye-space depth `center_z`, clamped to `near` so volumes that straddle or
/// sit behind the near plane never produce a zero or negative distance.
pub fn projected_distance(center_z: f32, diameter: f32, near: f32) -> f32 {
    (-center_z - diameter * 0.5).max(near)
}

/// Approximate on-screen size in pixels of a volume of `diameter`
///
/// Not normalised: values are rough pixel counts and can exceed the
/// viewport size for volumes close to the eye.
pub fn estimate_coverage(center_z: f32, diameter: f32, near: f32, pixel_height_at_dist_one: f32) -> f32 {
    let projected_pixel_length = projected_distance(center_z, diameter, near) * pixel_height_at_dist_one;
    diameter / projected_pixel_length
}

impl DrawableCollection<'_> {
    /// Decide whether the node in `graph_state` is rejected under `transform`
    ///
    /// Returns `true` when the node must not be drawn. On acceptance the
    /// state holds the resolved global matrix and, when small-feature culling
    /// is on, the node's eye-space center and coverage. The world bounds in
    /// the state are valid afterwards only if frustum culling computed them.
    pub fn cull(&mut self, transform: &Mat4, graph_state: &mut GraphState) -> bool {
        let volume = graph_state.volume();
        graph_state.world_volume.invalidate();

        if let Some(frustum) = self.frame.active_frustum() {
            graph_state.world_volume.transform_from(transform, &volume);

            if !frustum.intersect(&graph_state.world_volume) {
                log::trace!("Culled by frustum: {:?}", graph_state.world_volume);
                return true;
            }
        }

        graph_state.global_matrix = *transform;
        graph_state.coverage = COVERAGE_UNSET;
        graph_state.center = None;

        let settings = &self.frame.settings;
        if settings.small_feature_culling() {
            let center = utils::to_eye_space(
                transform,
                &self.frame.view_matrix,
                &Point3::from(volume.center()),
            );
            let coverage = estimate_coverage(
                center.z,
                volume.diameter(),
                self.frame.near,
                self.frame.pixel_height_at_dist_one(),
            );

            graph_state.center = Some(center);
            graph_state.coverage = coverage;

            if coverage < settings.small_feature_threshold {
                log::trace!(
                    "Culled small feature: coverage {:.2} < {:.2}",
                    coverage,
                    settings.small_feature_threshold
                );
                return true;
            }
        }

        self.number_of_nodes += 1;
        false
    }
}
