//! # Drawable Collection
//!
//! Per-frame culling and draw ordering for a scene-graph renderer.
//!
//! Given a traversal of a transform / bounding-volume hierarchy, the
//! collection decides which shapes are visible, builds a flat list of
//! drawables (shape + resolved transform + ordering metadata), buckets them
//! by render pass and produces a deterministic draw order.
//!
//! ## Features
//!
//! - **Frustum culling**: world-space boxes tested against the view frustum
//! - **Small-feature culling**: rejects geometry below a pixel-size threshold
//! - **Pass bucketing**: opaque and transparent drawables kept apart
//! - **Multi-key ordering**: sort key, priority and depth, stable per pass
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use drawable_collection::prelude::*;
//!
//! let viewpoint = PerspectiveViewpoint::default();
//! let view = Mat4::look_at_rh(&Point3::new(0.0, 0.0, 10.0), &Point3::origin(), &Vec3::y());
//! let frame = FrameSetup::new(view, viewpoint.projection(16.0 / 9.0), 720.0, &viewpoint);
//!
//! let mut collection = DrawableCollection::new(frame);
//! let shape = Arc::new(ShapeNode::cuboid("crate", Vec3::zeros(), Vec3::repeat(1.0)));
//! let mut state = GraphState::new(shape.clone());
//! let transform = Mat4::identity();
//!
//! if !collection.cull(&transform, &mut state) {
//!     collection.add_drawable(shape, &transform, &mut state);
//! }
//! collection.sort();
//!
//! for drawable in collection.iter()? {
//!     println!("{} at {:?}", drawable.sort_type(), drawable.world_volume().center());
//! }
//! # Ok::<(), CollectionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod collect;

/// Common imports for collection users
pub mod prelude {
    pub use crate::{
        collect::{
            CollectionError, ContextError, Drawable, DrawableCollection, FrameSetup,
            RenderContext, SortModes, SortPolicy,
        },
        config::{Config, ConfigError, CullingSettings},
        foundation::math::{Mat4, Point3, Vec3},
        scene::{
            Appearance, BoundedNode, BoxVolume, Frustum, GraphState, PerspectiveViewpoint,
            Shape, ShapeNode, SortType, Viewpoint,
        },
    };
}
