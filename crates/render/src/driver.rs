use glam::Vec2;
use menger_camera::ViewState;
use menger_common::{CameraConfig, ViewerConfig};
use menger_input::{EventQueue, HeldKeys, InputEvent, ViewKey};

use crate::clock::{Clock, SystemClock};
use crate::renderer::{Renderer, ShaderParams};
use crate::stats::FrameStats;

/// Seconds between frame-rate reports in the debug log.
const STATS_INTERVAL: f64 = 5.0;

/// Moves the system cursor. Pointer samples are measured from the window
/// centre, so the cursor is warped back there after every sample.
pub trait CursorControl {
    fn warp_cursor(&mut self, position: Vec2);
}

/// Headless runs have no cursor to move.
impl CursorControl for () {
    fn warp_cursor(&mut self, _position: Vec2) {}
}

/// Result of one driver iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome<T> {
    /// The quad was drawn and presented; carries the renderer's output.
    Drawn(T),
    /// Close was requested. Nothing was drawn and the loop should stop.
    Closed,
}

/// Owns the view state and sequences one rendering iteration at a time.
///
/// Input events are queued as the backend reports them and applied at the
/// start of the next `frame` call, so every event is handled before the
/// iteration that follows it.
pub struct FrameDriver<C: Clock = SystemClock> {
    config: CameraConfig,
    view: ViewState,
    keys: HeldKeys,
    events: EventQueue,
    clock: C,
    last_time: f64,
    delta_time: f32,
    resolution: Vec2,
    center: Vec2,
    close_requested: bool,
    stats: FrameStats,
    last_report: f64,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(config: &ViewerConfig, clock: C) -> Self {
        let now = clock.now();
        let (cx, cy) = config.window.center();
        Self {
            config: config.camera.clone(),
            view: ViewState::new(&config.camera),
            keys: HeldKeys::new(),
            events: EventQueue::new(),
            clock,
            last_time: now,
            delta_time: 0.0,
            resolution: Vec2::new(config.window.width as f32, config.window.height as f32),
            center: Vec2::new(cx, cy),
            close_requested: false,
            stats: FrameStats::new(),
            last_report: now,
        }
    }

    /// Queue an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn request_close(&mut self) {
        if !self.close_requested {
            tracing::info!("close requested");
        }
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.keys
    }

    /// Seconds between the last two time samples.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Parameters for the current view at the current clock reading.
    pub fn shader_params(&self) -> ShaderParams {
        ShaderParams::new(&self.view, self.resolution, self.clock.now() as f32)
    }

    /// Apply every queued event in arrival order.
    ///
    /// The cursor stays put until it is warped back to centre, so every
    /// sample queued since the last warp is an offset from the same centre.
    /// Only the latest one carries the net motion; it is applied once,
    /// followed by a single warp.
    pub fn apply_pending(&mut self, cursor: &mut impl CursorControl) {
        let pending: Vec<InputEvent> = self.events.drain().collect();
        let mut pointer = None;
        for event in pending {
            if let InputEvent::CursorMoved { x, y } = event {
                pointer = Some(Vec2::new(x, y));
            } else {
                self.apply(event);
            }
        }
        if let Some(position) = pointer {
            self.view = self
                .view
                .on_pointer(position, self.center, self.delta_time, &self.config);
            cursor.warp_cursor(self.center);
        }
    }

    fn apply(&mut self, event: InputEvent) {
        if event.is_close_request() {
            self.request_close();
        }
        match event {
            InputEvent::Key { key, pressed } => {
                if key != ViewKey::Close {
                    self.keys.apply(key, pressed);
                }
            }
            InputEvent::Scroll { dy } => {
                self.view = self.view.on_scroll(dy, &self.config);
            }
            InputEvent::FocusLost => {
                if !self.keys.is_empty() {
                    tracing::debug!("focus lost, releasing held keys");
                }
                self.keys.clear();
            }
            InputEvent::CursorMoved { .. } | InputEvent::CloseRequested => {}
        }
    }

    fn advance_time(&mut self) {
        let now = self.clock.now();
        self.delta_time = (now - self.last_time) as f32;
        self.last_time = now;
    }

    /// Run one iteration: apply input, then step time, sample the keyboard
    /// and draw once. Returns `Closed` without drawing once close has been
    /// requested.
    pub fn frame<R: Renderer>(
        &mut self,
        renderer: &R,
        cursor: &mut impl CursorControl,
    ) -> FrameOutcome<R::Output> {
        self.apply_pending(cursor);
        if self.close_requested {
            return FrameOutcome::Closed;
        }

        self.advance_time();
        self.view = self
            .view
            .on_keyboard(&self.keys, self.delta_time, &self.config);

        let params = self.shader_params();
        let output = renderer.render(&params);

        self.stats.record(self.delta_time);
        if self.last_time - self.last_report >= STATS_INTERVAL {
            tracing::debug!(
                fps = self.stats.fps(),
                frames = self.stats.frames(),
                "frame stats"
            );
            self.last_report = self.last_time;
        }

        FrameOutcome::Drawn(output)
    }
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::renderer::DebugTextRenderer;
    use std::cell::RefCell;

    /// Records every frame it is asked to draw.
    #[derive(Default)]
    struct RecordingRenderer {
        frames: RefCell<Vec<ShaderParams>>,
    }

    impl Renderer for RecordingRenderer {
        type Output = ();

        fn render(&self, params: &ShaderParams) {
            self.frames.borrow_mut().push(*params);
        }
    }

    impl RecordingRenderer {
        fn draws(&self) -> usize {
            self.frames.borrow().len()
        }

        fn last(&self) -> ShaderParams {
            *self.frames.borrow().last().unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingCursor {
        warps: Vec<Vec2>,
    }

    impl CursorControl for RecordingCursor {
        fn warp_cursor(&mut self, position: Vec2) {
            self.warps.push(position);
        }
    }

    fn driver() -> FrameDriver<ManualClock> {
        FrameDriver::new(&ViewerConfig::default(), ManualClock::new(0.0))
    }

    #[test]
    fn frame_draws_once() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let outcome = driver.frame(&renderer, &mut ());
        assert_eq!(outcome, FrameOutcome::Drawn(()));
        assert_eq!(renderer.draws(), 1);
    }

    #[test]
    fn escape_stops_the_next_iteration_before_drawing() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();

        driver.frame(&renderer, &mut ());
        driver.push_event(InputEvent::press(ViewKey::Close));
        assert!(!driver.close_requested());

        assert_eq!(driver.frame(&renderer, &mut ()), FrameOutcome::Closed);
        assert!(driver.close_requested());
        assert_eq!(renderer.draws(), 1);

        // stays closed
        assert_eq!(driver.frame(&renderer, &mut ()), FrameOutcome::Closed);
        assert_eq!(renderer.draws(), 1);
    }

    #[test]
    fn escape_release_alone_does_not_close() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        driver.push_event(InputEvent::release(ViewKey::Close));
        assert_eq!(driver.frame(&renderer, &mut ()), FrameOutcome::Drawn(()));
    }

    #[test]
    fn window_close_request_stops_the_loop() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        driver.push_event(InputEvent::CloseRequested);
        assert_eq!(driver.frame(&renderer, &mut ()), FrameOutcome::Closed);
        assert_eq!(renderer.draws(), 0);
    }

    #[test]
    fn held_forward_key_moves_by_speed_times_dt() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let start = *driver.view();

        driver.push_event(InputEvent::press(ViewKey::Forward));
        driver.clock.advance(0.5);
        driver.frame(&renderer, &mut ());

        assert_eq!(driver.delta_time(), 0.5);
        let moved = driver.view().position - start.position;
        assert!((moved - start.direction * 1.5).length() < 1e-5);
        assert_eq!(renderer.last().position, driver.view().position);
    }

    #[test]
    fn released_key_stops_moving() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();

        driver.push_event(InputEvent::press(ViewKey::Right));
        driver.clock.advance(0.1);
        driver.frame(&renderer, &mut ());
        let after_first = driver.view().position;

        driver.push_event(InputEvent::release(ViewKey::Right));
        driver.clock.advance(0.1);
        driver.frame(&renderer, &mut ());
        assert_eq!(driver.view().position, after_first);
        assert!(driver.held_keys().is_empty());
    }

    #[test]
    fn pointer_sample_uses_previous_delta_and_recenters() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let mut cursor = RecordingCursor::default();

        driver.clock.advance(0.1);
        driver.frame(&renderer, &mut cursor);

        driver.push_event(InputEvent::CursorMoved { x: 600.0, y: 300.0 });
        driver.clock.advance(0.2);
        driver.frame(&renderer, &mut cursor);

        // first sample jumps by the centre offset, scaled by the 0.1 s frame
        let expected_yaw = 3.14 + 0.05 * 0.1 * 512.0;
        assert!((driver.view().yaw - expected_yaw).abs() < 1e-5);
        assert!((driver.view().pitch - 0.05 * 0.1 * 384.0).abs() < 1e-5);
        assert_eq!(cursor.warps, vec![Vec2::new(512.0, 384.0)]);
        assert_eq!(renderer.last().direction, driver.view().direction);
    }

    #[test]
    fn queued_pointer_samples_apply_net_motion_once() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let mut cursor = RecordingCursor::default();

        // consume the first-sample jump
        driver.clock.advance(0.1);
        driver.push_event(InputEvent::CursorMoved { x: 512.0, y: 384.0 });
        driver.frame(&renderer, &mut cursor);
        let yaw = driver.view().yaw;

        // two samples before the next warp: net travel is 20 px to the left
        driver.push_event(InputEvent::CursorMoved { x: 502.0, y: 384.0 });
        driver.push_event(InputEvent::CursorMoved { x: 492.0, y: 384.0 });
        driver.clock.advance(0.1);
        driver.frame(&renderer, &mut cursor);

        let expected = yaw + 0.05 * 0.1 * 20.0;
        assert!((driver.view().yaw - expected).abs() < 1e-5);
        assert_eq!(cursor.warps.len(), 2);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        driver.push_event(InputEvent::press(ViewKey::Forward));
        driver.frame(&renderer, &mut ());
        assert!(driver.held_keys().is_held(ViewKey::Forward));

        driver.push_event(InputEvent::FocusLost);
        driver.frame(&renderer, &mut ());
        let position = driver.view().position;
        driver.clock.advance(0.5);
        driver.frame(&renderer, &mut ());
        assert!(driver.held_keys().is_empty());
        assert_eq!(driver.view().position, position);
    }

    #[test]
    fn scroll_changes_fov_in_next_frame() {
        let mut driver = driver();
        driver.push_event(InputEvent::Scroll { dy: 5.0 });
        let FrameOutcome::Drawn(text) = driver.frame(&DebugTextRenderer::new(), &mut ()) else {
            panic!("expected a drawn frame");
        };
        assert!(text.contains("fov       = 35.0"));
    }

    #[test]
    fn time_parameter_follows_clock() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        driver.clock.set(12.25);
        driver.frame(&renderer, &mut ());
        assert_eq!(renderer.last().time, 12.25);
        assert_eq!(renderer.last().resolution, Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn press_and_release_in_one_frame_leaves_key_up() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let start = driver.view().position;
        driver.push_event(InputEvent::press(ViewKey::Backward));
        driver.push_event(InputEvent::release(ViewKey::Backward));
        driver.clock.advance(1.0);
        driver.frame(&renderer, &mut ());
        assert_eq!(driver.view().position, start);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        let start = driver.view().position;
        driver.push_event(InputEvent::press(ViewKey::Left));
        driver.push_event(InputEvent::press(ViewKey::Right));
        driver.clock.advance(0.5);
        driver.frame(&renderer, &mut ());
        assert!((driver.view().position - start).length() < 1e-6);
    }

    #[test]
    fn stats_count_drawn_frames() {
        let mut driver = driver();
        let renderer = RecordingRenderer::default();
        for _ in 0..3 {
            driver.clock.advance(1.0 / 60.0);
            driver.frame(&renderer, &mut ());
        }
        assert_eq!(driver.stats().frames(), 3);
    }
}
