/// Smoothed frame rate from per-frame delta times.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u64,
    smoothed_fps: f32,
    /// Weight of the newest sample (0.0-1.0).
    smoothing: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frames: 0,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one presented frame that took `dt` seconds.
    pub fn record(&mut self, dt: f32) {
        self.frames += 1;
        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.smoothed_fps =
                self.smoothed_fps * (1.0 - self.smoothing) + instant_fps * self.smoothing;
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_towards_steady_rate() {
        let mut stats = FrameStats::new();
        for _ in 0..500 {
            stats.record(1.0 / 30.0);
        }
        assert_eq!(stats.frames(), 500);
        assert!((stats.fps() - 30.0).abs() < 0.1);
    }

    #[test]
    fn zero_delta_counts_frame_without_touching_fps() {
        let mut stats = FrameStats::new();
        stats.record(0.0);
        assert_eq!(stats.frames(), 1);
        assert_eq!(stats.fps(), 60.0);
    }
}
