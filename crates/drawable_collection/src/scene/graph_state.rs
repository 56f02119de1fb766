//! Per-branch traversal state handed to the culler
//!
//! One `GraphState` flows down a traversal branch and is mutated in place
//! at every step. Its `world_volume` is scratch space reused across
//! siblings to avoid a per-node allocation; anything that outlives the
//! step (a [`Drawable`](crate::collect::Drawable)) takes its own copy.
//! Sibling subtrees must not share one `GraphState` concurrently.

use std::fmt;
use std::sync::Arc;

use crate::foundation::math::{Mat4, Point3};
use crate::scene::{BoundedNode, BoxVolume};

/// Sentinel stored in [`GraphState::coverage`] when coverage was not computed
pub const COVERAGE_UNSET: f32 = -1.0;

/// Traversal state for one bounded node
pub struct GraphState {
    /// Node owning the bounding volume (not owned by the state)
    pub bounded_node: Arc<dyn BoundedNode>,

    /// Local transform of the node, mostly identity
    pub local_matrix: Mat4,

    /// Resolved world transform, recorded by the culler
    pub global_matrix: Mat4,

    /// World-space bounds; scratch, valid only after frustum culling ran
    pub world_volume: BoxVolume,

    /// Eye-space center of the volume, present only when coverage ran
    pub center: Option<Point3>,

    /// Approximate on-screen size in pixels, or [`COVERAGE_UNSET`]
    pub coverage: f32,

    volume: Option<Arc<BoxVolume>>,
}

impl GraphState {
    /// Create a state for `bounded_node` with identity transforms
    pub fn new(bounded_node: Arc<dyn BoundedNode>) -> Self {
        Self {
            bounded_node,
            local_matrix: Mat4::identity(),
            global_matrix: Mat4::identity(),
            world_volume: BoxVolume::empty(),
            center: None,
            coverage: COVERAGE_UNSET,
            volume: None,
        }
    }

    /// Set the local transform
    pub fn with_local_matrix(mut self, local_matrix: Mat4) -> Self {
        self.local_matrix = local_matrix;
        self
    }

    /// Local bounds of the bounded node, fetched from the node on first access
    pub fn volume(&mut self) -> Arc<BoxVolume> {
        self.volume
            .get_or_insert_with(|| self.bounded_node.volume())
            .clone()
    }

    /// Local bounds if they were already fetched
    pub fn cached_volume(&self) -> Option<&Arc<BoxVolume>> {
        self.volume.as_ref()
    }

    /// Move the state to another bounded node, keeping the scratch buffer
    ///
    /// Resets everything the culler derives per node.
    pub fn rebind(&mut self, bounded_node: Arc<dyn BoundedNode>, local_matrix: Mat4) {
        self.bounded_node = bounded_node;
        self.local_matrix = local_matrix;
        self.volume = None;
        self.world_volume.invalidate();
        self.center = None;
        self.coverage = COVERAGE_UNSET;
    }

    /// Whether the culler computed coverage for the current node
    pub fn has_coverage(&self) -> bool {
        self.center.is_some()
    }
}

impl fmt::Debug for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphState")
            .field("local_matrix", &self.local_matrix)
            .field("global_matrix", &self.global_matrix)
            .field("volume", &self.volume)
            .field("world_volume", &self.world_volume)
            .field("center", &self.center)
            .field("coverage", &self.coverage)
            .finish_non_exhaustive()
    }
}
