//! Shared configuration for the viewer crates.
//!
//! # Invariants
//! - Defaults reproduce the stock viewer: 1024x768 window, FOV 45 within [20, 90].
//! - A config that passes `validate` never produces an empty FOV range.

pub mod config;

pub use config::{
    CameraConfig, ConfigError, FirstPointer, ShaderPaths, ViewerConfig, WindowConfig,
};
