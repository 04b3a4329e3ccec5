use glam::{Vec2, Vec3};
use menger_common::{CameraConfig, FirstPointer};
use menger_input::{HeldKeys, ViewKey};
use std::f32::consts::FRAC_PI_2;

/// Orthonormal camera frame derived from yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    /// Unit view direction.
    pub direction: Vec3,
    /// Unit horizontal strafe axis, orthogonal to `direction`.
    pub right: Vec3,
    /// `right × direction`.
    pub up: Vec3,
}

impl ViewBasis {
    /// Basis for `yaw` around +Y and `pitch` towards +Y, both in radians.
    pub fn from_angles(yaw: f32, pitch: f32) -> Self {
        let direction = Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        );
        let right = Vec3::new((yaw - FRAC_PI_2).sin(), 0.0, (yaw - FRAC_PI_2).cos());
        let up = right.cross(direction);
        Self {
            direction,
            right,
            up,
        }
    }
}

/// Fly camera state: orientation angles, position, FOV and the derived basis.
///
/// Lives outside any GPU type; the frame driver turns it into shader
/// parameters once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Radians, accumulates without wrapping.
    pub yaw: f32,
    /// Radians, unclamped unless the config sets a pitch limit.
    pub pitch: f32,
    /// Eye position in world units.
    pub position: Vec3,
    /// Basis vectors, recomputed whenever yaw or pitch change.
    pub direction: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Degrees.
    pub fov: f32,
    /// Set until the first pointer sample after capture has been applied.
    pub awaiting_first_pointer: bool,
}

impl ViewState {
    pub fn new(config: &CameraConfig) -> Self {
        let basis = ViewBasis::from_angles(config.yaw, config.pitch);
        Self {
            yaw: config.yaw,
            pitch: config.pitch,
            position: config.position,
            direction: basis.direction,
            right: basis.right,
            up: basis.up,
            fov: config.fov,
            awaiting_first_pointer: true,
        }
    }

    pub fn basis(&self) -> ViewBasis {
        ViewBasis {
            direction: self.direction,
            right: self.right,
            up: self.up,
        }
    }

    fn with_angles(mut self, yaw: f32, pitch: f32) -> Self {
        let basis = ViewBasis::from_angles(yaw, pitch);
        self.yaw = yaw;
        self.pitch = pitch;
        self.direction = basis.direction;
        self.right = basis.right;
        self.up = basis.up;
        self
    }

    /// Translate by every held movement key, each scaled by `dt * keyboard_speed`.
    ///
    /// Opposite keys are not special-cased; their contributions cancel.
    #[must_use]
    pub fn on_keyboard(mut self, keys: &HeldKeys, dt: f32, config: &CameraConfig) -> Self {
        let step = dt * config.keyboard_speed;
        for key in ViewKey::MOVEMENT {
            if !keys.is_held(key) {
                continue;
            }
            match key {
                ViewKey::Forward => self.position += self.direction * step,
                ViewKey::Backward => self.position -= self.direction * step,
                ViewKey::Left => self.position -= self.right * step,
                ViewKey::Right => self.position += self.right * step,
                ViewKey::Close => {}
            }
        }
        self
    }

    /// Apply a pointer sample measured against the window centre.
    ///
    /// The caller warps the cursor back to `center` afterwards, so the offset
    /// from centre stands in for the motion since the previous sample. The
    /// first sample after capture uses the centre offset itself as the delta
    /// in `FirstPointer::Jump` mode.
    #[must_use]
    pub fn on_pointer(mut self, cursor: Vec2, center: Vec2, dt: f32, config: &CameraConfig) -> Self {
        let delta = if self.awaiting_first_pointer {
            self.awaiting_first_pointer = false;
            match config.first_pointer {
                FirstPointer::Jump => center,
                FirstPointer::Suppress => Vec2::ZERO,
            }
        } else {
            center - cursor
        };

        let yaw = self.yaw + config.mouse_speed * dt * delta.x;
        let mut pitch = self.pitch + config.mouse_speed * dt * delta.y;
        if let Some(limit) = config.pitch_limit {
            pitch = pitch.clamp(-limit, limit);
        }
        self.with_angles(yaw, pitch)
    }

    /// Narrow (positive `dy`) or widen the field of view, clamped to the configured range.
    #[must_use]
    pub fn on_scroll(mut self, dy: f32, config: &CameraConfig) -> Self {
        let fov = self.fov - config.scroll_step * dy;
        self.fov = fov.clamp(config.fov_min, config.fov_max);
        if self.fov != fov {
            tracing::debug!(requested = fov, fov = self.fov, "field of view clamped");
        }
        self
    }
}
