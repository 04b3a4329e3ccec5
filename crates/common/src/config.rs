use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Window surface parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// MSAA sample count for the colour target (1 or 4).
    pub samples: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Raymarching".into(),
            width: 1024,
            height: 768,
            samples: 4,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Window midpoint in physical pixels. Pointer deltas are measured from here.
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// How the first pointer sample after capture is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPointer {
    /// Apply the centre offset itself as the delta (stock behaviour).
    Jump,
    /// Apply a zero delta.
    Suppress,
}

/// Camera constants: initial pose, speeds and FOV range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial yaw in radians.
    pub yaw: f32,
    /// Initial pitch in radians.
    pub pitch: f32,
    pub position: Vec3,
    /// Initial field of view in degrees.
    pub fov: f32,
    pub fov_min: f32,
    pub fov_max: f32,
    /// Degrees of FOV removed per scroll line.
    pub scroll_step: f32,
    /// World units per second.
    pub keyboard_speed: f32,
    /// Radians per pixel per second.
    pub mouse_speed: f32,
    pub first_pointer: FirstPointer,
    /// Optional symmetric pitch limit in radians. `None` leaves pitch unclamped.
    pub pitch_limit: Option<f32>,
}

impl Default for CameraConfig {
    // The stock starting yaw is the literal 3.14, not π.
    #[allow(clippy::approx_constant)]
    fn default() -> Self {
        Self {
            yaw: 3.14,
            pitch: 0.0,
            position: Vec3::new(0.0, 0.0, 5.0),
            fov: 45.0,
            fov_min: 20.0,
            fov_max: 90.0,
            scroll_step: 2.0,
            keyboard_speed: 3.0,
            mouse_speed: 0.05,
            first_pointer: FirstPointer::Jump,
            pitch_limit: None,
        }
    }
}

/// Locations of the two shader stages, read at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/vertex.wgsl"),
            fragment: PathBuf::from("shaders/menger.wgsl"),
        }
    }
}

/// Top-level viewer configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub shaders: ShaderPaths,
}

impl ViewerConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.window;
        if w.width == 0 || w.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                w.width, w.height
            )));
        }
        if w.samples != 1 && w.samples != 4 {
            return Err(ConfigError::Invalid(format!(
                "samples must be 1 or 4, got {}",
                w.samples
            )));
        }

        let c = &self.camera;
        let scalars = [
            ("yaw", c.yaw),
            ("pitch", c.pitch),
            ("fov", c.fov),
            ("fov_min", c.fov_min),
            ("fov_max", c.fov_max),
            ("scroll_step", c.scroll_step),
            ("keyboard_speed", c.keyboard_speed),
            ("mouse_speed", c.mouse_speed),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "camera.{name} must be finite, got {value}"
                )));
            }
        }
        if !c.position.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "camera.position must be finite, got {}",
                c.position
            )));
        }

        if c.fov_min >= c.fov_max {
            return Err(ConfigError::Invalid(format!(
                "fov_min ({}) must be below fov_max ({})",
                c.fov_min, c.fov_max
            )));
        }
        if c.fov < c.fov_min || c.fov > c.fov_max {
            return Err(ConfigError::Invalid(format!(
                "initial fov {} outside [{}, {}]",
                c.fov, c.fov_min, c.fov_max
            )));
        }
        for (name, value) in [
            ("scroll_step", c.scroll_step),
            ("keyboard_speed", c.keyboard_speed),
            ("mouse_speed", c.mouse_speed),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "camera.{name} must be positive, got {value}"
                )));
            }
        }
        if let Some(limit) = c.pitch_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "pitch_limit must be positive, got {limit}"
                )));
            }
        }
        Ok(())
    }
}
