//! Rendering adapter: the frame driver and the renderer-agnostic interface.
//!
//! # Invariants
//! - One frame issues at most one draw, and none once close has been requested.
//! - Pending input is applied before the frame's time step and keyboard sample.
//! - Renderers read shader parameters; they never touch the view state.
//!
//! The GPU backend lives in `menger-render-wgpu`; `DebugTextRenderer` renders
//! parameters as text for headless checks and tests.

mod clock;
mod driver;
mod renderer;
mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{CursorControl, FrameDriver, FrameOutcome};
pub use renderer::{DebugTextRenderer, Renderer, ShaderParams};
pub use stats::FrameStats;
