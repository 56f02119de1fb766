//! Rendering-context seam
//!
//! The collection hands each accepted drawable to the attached context as
//! soon as it is built, so GPU resources are ready by the time the sorted
//! list is drawn without another pass over it.

use thiserror::Error;

use super::{Drawable, FrameSetup};

/// GPU resource setup errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// Setup of a single shape failed
    #[error("Shape setup failed: {0}")]
    SetupFailed(String),
}

/// Backend that prepares GPU resources for drawables
///
/// Calls happen on the collecting thread, one per accepted drawable, in
/// collection order.
pub trait RenderContext {
    /// Prepare buffers, shaders and textures for `drawable`
    fn setup_shape(&mut self, drawable: &Drawable, frame: &FrameSetup) -> Result<(), ContextError>;
}
