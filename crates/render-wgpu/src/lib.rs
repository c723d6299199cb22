//! wgpu render backend for the airfoil force viewer.
//!
//! Draws one mesh per frame. The fragment stage atomically adds per-sample
//! force and torque into a storage block, which is copied out, cleared and
//! read back on the host before the frame returns.
//!
//! # Invariants
//! - The storage block layout is checked against the host mirror at startup.
//! - The storage binding comes only from `FORCE_SUMS_BINDING`.
//! - A frame's readback completes before the next frame's draw is recorded.

mod force_buffer;
mod gpu;
mod layout;
mod scene;
mod shaders;

pub use force_buffer::{ForceBuffer, MappedSums};
pub use gpu::{DragRenderer, required_features};
pub use layout::validate_force_block;
pub use scene::{FrameView, ViewSettings};
pub use shaders::drag_shader;

use airdrag_accum::AccumError;

/// Errors from the render backend. All of them are fatal to the viewer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("adapter does not support {0}")]
    Unsupported(&'static str),
    #[error("shader error:\n{0}")]
    Shader(String),
    #[error("force block layout mismatch: {0}")]
    Layout(String),
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
    #[error(transparent)]
    Accum(#[from] AccumError),
}
