//! Frame scheduling
//!
//! The host owns the display refresh cycle and calls [`FrameScheduler::run_frame`]
//! once per refresh. A scheduler that has been stopped simply stops invoking its
//! callback, so tests can single-step frames with a fixed delta and no clock.

/// Timing information handed to one frame callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Zero-based index of this frame since the scheduler was first started
    pub index: u64,
    /// Seconds since the previous frame
    pub dt: f32,
    /// Seconds spent running, including this frame
    pub elapsed: f32,
}

impl Frame {
    /// A frame with the given delta, for driving modules outside a scheduler
    pub fn single(dt: f32) -> Self {
        Self {
            index: 0,
            dt,
            elapsed: dt,
        }
    }
}

/// Start/stop switch over the host's per-refresh callback
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    running: bool,
    frame_count: u64,
    elapsed: f32,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin invoking the callback on every subsequent refresh
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop invoking the callback; an in-flight frame still completes
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Run one frame if started. Returns whether the callback was invoked.
    pub fn run_frame<F: FnOnce(&Frame)>(&mut self, dt: f32, callback: F) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed += dt;
        let frame = Frame {
            index: self.frame_count,
            dt,
            elapsed: self.elapsed,
        };
        self.frame_count += 1;

        callback(&frame);
        true
    }
}

/// Fixed-period timer advanced by frame deltas
#[derive(Debug, Clone)]
pub struct Interval {
    period: f32,
    accumulated: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            accumulated: 0.0,
        }
    }

    /// Advance by `dt` and return how many periods elapsed
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.accumulated += dt;
        let mut fired = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            fired += 1;
        }
        fired
    }
}

/// One-shot timer advanced by frame deltas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
        }
    }

    /// Advance by `dt`; true once the duration has fully elapsed
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
