//! Camera: view state and the handlers that advance it.
//!
//! # Invariants
//! - `direction` and `right` are unit length and orthogonal for any yaw/pitch.
//! - `up = right × direction`; it is not renormalized.
//! - FOV stays within the configured closed interval after every scroll.
//! - Handlers are pure: they take a `ViewState` and return the next one.

mod view;

pub use view::{ViewBasis, ViewState};
