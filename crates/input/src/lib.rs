//! Input: backend events translated into viewer-level events.
//!
//! # Invariants
//! - The camera and frame driver consume `InputEvent`s, never raw backend events.
//! - Events are applied in arrival order, once, when the queue is drained.

pub mod event;
pub mod keys;
pub mod queue;

pub use event::{InputEvent, ViewKey};
pub use keys::HeldKeys;
pub use queue::EventQueue;
