use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use menger_common::ViewerConfig;
use menger_input::{InputEvent, ViewKey};
use menger_render::{
    CursorControl, DebugTextRenderer, FrameDriver, FrameOutcome, ManualClock,
};
use menger_render_wgpu::{ShaderProgram, SurfaceRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Pixel scroll deltas (touchpads) are converted to lines at this rate.
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Parser, Debug)]
#[command(name = "menger-viewer", about = "Fly through a raymarched Menger sponge")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vertex shader (overrides the config)
    #[arg(long)]
    vertex: Option<PathBuf>,

    /// Fragment shader (overrides the config)
    #[arg(long)]
    fragment: Option<PathBuf>,

    /// Validate config and shaders, print the first frame's parameters and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(vertex) = &self.vertex {
            config.shaders.vertex = vertex.clone();
        }
        if let Some(fragment) = &self.fragment {
            config.shaders.fragment = fragment.clone();
        }
        Ok(config)
    }
}

fn view_key(code: KeyCode) -> Option<ViewKey> {
    match code {
        KeyCode::KeyW => Some(ViewKey::Forward),
        KeyCode::KeyS => Some(ViewKey::Backward),
        KeyCode::KeyA => Some(ViewKey::Left),
        KeyCode::KeyD => Some(ViewKey::Right),
        KeyCode::Escape => Some(ViewKey::Close),
        _ => None,
    }
}

/// Vertical scroll in lines; positive scrolls away from the user.
fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
    }
}

/// Warps the OS cursor. Platforms without warp support log once and carry on.
struct WindowCursor<'a> {
    window: &'a Window,
    warned: &'a mut bool,
}

impl CursorControl for WindowCursor<'_> {
    fn warp_cursor(&mut self, position: Vec2) {
        let target = PhysicalPosition::new(position.x as f64, position.y as f64);
        if let Err(e) = self.window.set_cursor_position(target) {
            if !*self.warned {
                tracing::warn!("cannot recenter cursor: {e}");
                *self.warned = true;
            }
        }
    }
}

fn capture_cursor(window: &Window) {
    if let Err(e) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        tracing::warn!("cannot grab cursor: {e}");
    }
    window.set_cursor_visible(false);
}

struct ViewerApp {
    config: ViewerConfig,
    program: ShaderProgram,
    driver: FrameDriver,
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    warp_warned: bool,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig, program: ShaderProgram) -> Self {
        let driver = FrameDriver::new(&config, Default::default());
        Self {
            config,
            program,
            driver,
            window: None,
            renderer: None,
            warp_warned: false,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        if size.width != self.config.window.width || size.height != self.config.window.height {
            tracing::warn!(
                "window is {}x{}, expected {}x{}",
                size.width,
                size.height,
                self.config.window.width,
                self.config.window.height
            );
        }
        capture_cursor(&window);

        let renderer = SurfaceRenderer::new(
            window.clone(),
            size.width,
            size.height,
            &self.config.window,
            &self.program,
        )
        .context("failed to initialize renderer")?;

        tracing::info!(
            "window opened: {}x{} \"{}\"",
            size.width,
            size.height,
            self.config.window.title
        );
        window.request_redraw();
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &self.renderer) else {
            return;
        };
        let mut cursor = WindowCursor {
            window,
            warned: &mut self.warp_warned,
        };
        match self.driver.frame(renderer, &mut cursor) {
            FrameOutcome::Drawn(Ok(())) => {}
            FrameOutcome::Drawn(Err(e)) => tracing::error!("frame skipped: {e}"),
            FrameOutcome::Closed => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("{e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.driver.push_event(InputEvent::CloseRequested);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                // Auto-repeat adds nothing to a held key.
                if pressed && repeat {
                    return;
                }
                if let Some(key) = view_key(code) {
                    self.driver.push_event(InputEvent::Key { key, pressed });
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.driver.push_event(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.driver.push_event(InputEvent::Scroll {
                    dy: scroll_lines(delta),
                });
            }
            WindowEvent::Focused(true) => {
                if let Some(window) = &self.window {
                    capture_cursor(window);
                }
            }
            WindowEvent::Focused(false) => {
                self.driver.push_event(InputEvent::FocusLost);
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GPU resources go before the window they render into.
        self.renderer = None;
        self.window = None;
        tracing::info!(frames = self.driver.stats().frames(), "viewer closed");
    }
}

/// Render one frame headlessly and print the parameters it would receive.
fn run_check(config: &ViewerConfig) {
    let mut driver = FrameDriver::new(config, ManualClock::new(0.0));
    if let FrameOutcome::Drawn(text) = driver.frame(&DebugTextRenderer::new(), &mut ()) {
        print!("{text}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("menger-viewer starting");

    let config = cli.viewer_config().inspect_err(|e| tracing::error!("{e:#}"))?;
    let program = ShaderProgram::load(&config.shaders.vertex, &config.shaders.fragment)
        .inspect_err(|e| tracing::error!("{e}"))
        .context("shader setup failed")?;

    if cli.check {
        run_check(&config);
        tracing::info!("config and shaders OK");
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, program);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
