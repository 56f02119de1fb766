//! Scene-side collaborators of the collection
//!
//! Bounding volumes and the view frustum, the node interfaces the
//! traversal hands over, the viewpoint model and the per-branch traversal
//! state. Traversal and transform propagation themselves live with the
//! scene graph; this module only defines what the culler reads from them.

mod bounds;
mod nodes;
mod viewpoint;
mod graph_state;

pub use bounds::{BoxVolume, Frustum, Plane};
pub use nodes::{Appearance, BoundedNode, Shape, ShapeNode, SortType, UnknownSortType};
pub use viewpoint::{PerspectiveViewpoint, Viewpoint};
pub use graph_state::{GraphState, COVERAGE_UNSET};
