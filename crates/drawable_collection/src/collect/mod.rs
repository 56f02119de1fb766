//! Per-frame drawable collection
//!
//! ## Frame flow
//!
//! ```text
//! traversal ── cull() ──► rejected? ── yes ──► skip subtree
//!                             │ no
//!                             ▼
//!                      add_drawable() ──► pass bucket (+ GPU setup)
//!                             │
//!             after traversal ▼
//!                          sort() ──► flat draw list (opaque, transparent)
//! ```
//!
//! Everything runs on the frame's thread; a collection lives for one frame.

mod frame;
mod context;
mod drawable;
mod collection;
mod culler;
mod ordering;


pub use frame::FrameSetup;
pub use context::{ContextError, RenderContext};
pub use drawable::Drawable;
pub use collection::{CollectionError, DrawableCollection};
pub use culler::{estimate_coverage, projected_distance};
pub use ordering::{SortModes, SortPolicy};
