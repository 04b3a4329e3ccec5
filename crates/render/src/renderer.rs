use glam::{Vec2, Vec3};
use menger_camera::ViewState;

/// Per-frame values pushed to the fragment stage.
///
/// Field names match the members of the shader's uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderParams {
    /// Target size in pixels. Fixed for the lifetime of the window.
    pub resolution: Vec2,
    /// Seconds on the monotonic clock.
    pub time: f32,
    pub direction: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub position: Vec3,
    /// Degrees.
    pub current_fov: f32,
}

impl ShaderParams {
    /// Uniform member names every fragment shader must declare.
    pub const UNIFORM_NAMES: [&'static str; 7] = [
        "resolution",
        "time",
        "direction",
        "up",
        "right",
        "position",
        "current_fov",
    ];

    pub fn new(view: &ViewState, resolution: Vec2, time: f32) -> Self {
        Self {
            resolution,
            time,
            direction: view.direction,
            up: view.up,
            right: view.right,
            position: view.position,
            current_fov: view.fov,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// One call clears the colour target, draws the fullscreen quad once with
/// the given parameters and presents the result.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, params: &ShaderParams) -> Self::Output;
}

/// Text renderer for headless checks.
///
/// Produces a human-readable dump of the parameters a GPU frame would receive.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, params: &ShaderParams) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame (time={:.3}, resolution={}x{}) ===\n",
            params.time, params.resolution.x, params.resolution.y
        ));
        for (name, v) in [
            ("position", params.position),
            ("direction", params.direction),
            ("right", params.right),
            ("up", params.up),
        ] {
            out.push_str(&format!(
                "  {name:<9} = ({:.3}, {:.3}, {:.3})\n",
                v.x, v.y, v.z
            ));
        }
        out.push_str(&format!("  fov       = {:.1}\n", params.current_fov));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menger_common::CameraConfig;

    #[test]
    fn params_copy_view_state() {
        let view = ViewState::new(&CameraConfig::default());
        let params = ShaderParams::new(&view, Vec2::new(1024.0, 768.0), 2.5);
        assert_eq!(params.direction, view.direction);
        assert_eq!(params.up, view.up);
        assert_eq!(params.right, view.right);
        assert_eq!(params.position, view.position);
        assert_eq!(params.current_fov, 45.0);
        assert_eq!(params.time, 2.5);
        assert_eq!(params.resolution, Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn debug_renderer_prints_every_parameter() {
        let view = ViewState::new(&CameraConfig::default());
        let params = ShaderParams::new(&view, Vec2::new(1024.0, 768.0), 0.0);
        let output = DebugTextRenderer::new().render(&params);

        assert!(output.contains("resolution=1024x768"));
        assert!(output.contains("position  = (0.000, 0.000, 5.000)"));
        assert!(output.contains("fov       = 45.0"));
        assert!(output.contains("direction"));
        assert!(output.contains("right"));
        assert!(output.contains("up"));
    }

    #[test]
    fn uniform_names_are_unique() {
        let mut names = ShaderParams::UNIFORM_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ShaderParams::UNIFORM_NAMES.len());
    }
}
