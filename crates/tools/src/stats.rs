use std::time::{Duration, Instant};

/// Rolling window of recent frame durations.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn window(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn average(&self) -> Duration {
        let window = self.window();
        if window.is_empty() {
            return Duration::ZERO;
        }
        window.iter().sum::<Duration>() / window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.window().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.index
        }
    }
}

/// What the stats overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsMode {
    /// Frames per second.
    #[default]
    Fps,
    /// Milliseconds per frame.
    Ms,
}

/// Per-frame statistics behind the on-screen stats overlay.
///
/// `update` is called exactly once per frame; the display mode is fixed when
/// the overlay is created.
#[derive(Debug)]
pub struct FrameStats {
    mode: StatsMode,
    timer: FrameTimer,
    last: Option<Instant>,
    frames: u64,
}

impl FrameStats {
    const WINDOW: usize = 60;

    pub fn new(mode: StatsMode) -> Self {
        Self {
            mode,
            timer: FrameTimer::new(Self::WINDOW),
            last: None,
            frames: 0,
        }
    }

    pub fn mode(&self) -> StatsMode {
        self.mode
    }

    /// Mark the start of a frame at `now`.
    pub fn update(&mut self, now: Instant) {
        if let Some(last) = self.last {
            self.timer.record(now.saturating_duration_since(last));
        }
        self.last = Some(now);
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame_ms(&self) -> f32 {
        self.timer.average().as_secs_f32() * 1000.0
    }

    pub fn fps(&self) -> f32 {
        let avg = self.timer.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    /// Overlay text, e.g. `60 FPS (58-61)` or `16.7 MS`.
    pub fn label(&self) -> String {
        match self.mode {
            StatsMode::Fps => {
                let slow = self.timer.max().as_secs_f32();
                let fast = self.timer.min().as_secs_f32();
                let to_fps = |s: f32| if s > 0.0 { 1.0 / s } else { 0.0 };
                format!(
                    "{:.0} FPS ({:.0}-{:.0})",
                    self.fps(),
                    to_fps(slow),
                    to_fps(fast)
                )
            }
            StatsMode::Ms => format!("{:.1} MS", self.frame_ms()),
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(StatsMode::default())
    }
}
