//! Drawable records
//!
//! A drawable is one unique pairing of a shape with a resolved world
//! transform for the current frame, plus the metadata the ordering engine
//! sorts on. It is built once and not modified afterwards.

use std::sync::Arc;

use crate::foundation::math::{utils, Mat4};
use crate::scene::{BoxVolume, GraphState, Shape, SortType};

/// One renderable unit for the current frame
#[derive(Debug, Clone)]
pub struct Drawable {
    shape: Arc<dyn Shape>,
    transform: Mat4,
    local_transform: Mat4,
    local_volume: Arc<BoxVolume>,
    world_volume: BoxVolume,
    priority: f32,
    sort_type: SortType,
    sort_key: i32,
    z_pos: Option<f32>,
}

impl Drawable {
    /// Snapshot `shape` under `transform` from the current traversal state
    ///
    /// The world bounds are copied out of the state's scratch volume, or
    /// computed here when culling did not produce them. The eye-space depth
    /// is only computed for transparent drawables; it reuses the center the
    /// culler already moved to eye space when coverage ran.
    pub fn capture(
        shape: Arc<dyn Shape>,
        transform: &Mat4,
        graph_state: &mut GraphState,
        view_matrix: &Mat4,
    ) -> Self {
        let local_volume = graph_state.volume();
        let world_volume = if graph_state.world_volume.is_valid() {
            graph_state.world_volume
        } else {
            local_volume.transformed(transform)
        };

        // TODO: feed positive coverage into the priority once a
        // level-of-detail policy exists; only the sentinel contributes now.
        let priority = graph_state.coverage.min(0.0);

        let (sort_type, sort_key) = shape
            .appearance()
            .map_or((SortType::Opaque, 0), |a| (a.resolve_sort_type(), a.sort_key));

        let z_pos = (sort_type == SortType::Transparent).then(|| match graph_state.center {
            Some(center) => center.z,
            None => utils::to_eye_space(transform, view_matrix, &shape.center()).z,
        });

        Self {
            shape,
            transform: *transform,
            local_transform: graph_state.local_matrix,
            local_volume,
            world_volume,
            priority,
            sort_type,
            sort_key,
            z_pos,
        }
    }

    /// Shared shape node
    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    /// World transform at cull time
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Local transform at cull time
    pub fn local_transform(&self) -> &Mat4 {
        &self.local_transform
    }

    /// Local bounds, shared with the shape
    pub fn local_volume(&self) -> &Arc<BoxVolume> {
        &self.local_volume
    }

    /// World bounds, owned by this drawable
    pub fn world_volume(&self) -> &BoxVolume {
        &self.world_volume
    }

    /// Secondary ordering key derived from coverage
    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Render pass
    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    /// Explicit ordering hint from the appearance
    pub fn sort_key(&self) -> i32 {
        self.sort_key
    }

    /// Eye-space depth; `Some` only for transparent drawables
    pub fn z_pos(&self) -> Option<f32> {
        self.z_pos
    }

    #[cfg(test)]
    pub(crate) fn with_keys(
        shape: Arc<dyn Shape>,
        sort_type: SortType,
        sort_key: i32,
        priority: f32,
        z_pos: Option<f32>,
    ) -> Self {
        let local_volume = shape.volume();
        Self {
            world_volume: *local_volume,
            local_volume,
            shape,
            transform: Mat4::identity(),
            local_transform: Mat4::identity(),
            priority,
            sort_type,
            sort_key,
            z_pos,
        }
    }
}
