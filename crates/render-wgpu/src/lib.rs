//! wgpu render backend for the menger viewer.
//!
//! Draws one fullscreen quad per frame with a fragment shader loaded from
//! disk. Shaders are parsed and checked with naga before any GPU object is
//! created, so a broken program is rejected at startup instead of rendering
//! garbage.
//!
//! # Invariants
//! - The quad vertex buffer is uploaded once and never rewritten.
//! - Only the colour target is cleared; there is no depth attachment.
//! - Renderer never mutates view state.

mod gpu;
mod shaders;
mod surface;

pub use gpu::{QUAD_VERTEX_COUNT, QuadRenderer};
pub use shaders::{FRAGMENT_ENTRY, LinkError, ShaderError, ShaderProgram, StageSource, VERTEX_ENTRY};
pub use surface::{RenderError, SurfaceRenderer};
