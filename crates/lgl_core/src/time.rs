use std::time::{Duration, Instant};

pub const DEFAULT_TARGET_FPS: f64 = 60.0;
pub const TITLE_UPDATE_INTERVAL_S: f32 = 0.1;

/// Fixed-cadence frame pacing.
///
/// Each iteration is `begin_frame()` -> work -> `end_frame()`. The delta handed
/// to the scene is the full duration of the previous iteration (work plus
/// sleep). When work overruns the target there is no catch-up: the sleep is
/// clamped to zero and the effective rate simply drops.
pub struct FramePacer {
    pub target_dt: Duration,
    frame_start: Instant,
    last_frame_dt: f64,
    pub frame_count: u64,
}

impl FramePacer {
    pub fn new(target_fps: f64) -> Self {
        Self {
            target_dt: Duration::from_secs_f64(1.0 / target_fps),
            frame_start: Instant::now(),
            last_frame_dt: 0.0,
            frame_count: 0,
        }
    }

    /// Starts an iteration and returns the delta to simulate with.
    pub fn begin_frame(&mut self) -> f32 {
        self.frame_start = Instant::now();
        self.last_frame_dt as f32
    }

    /// Time left in the frame budget after `work`, zero if over budget.
    pub fn remaining(&self, work: Duration) -> Duration {
        self.target_dt.saturating_sub(work)
    }

    /// Sleeps out the rest of the frame budget and records the iteration time.
    pub fn end_frame(&mut self) {
        let work = self.frame_start.elapsed();
        let remaining = self.remaining(work);
        if remaining.is_zero() {
            log::trace!(
                "Frame work took {:.2}ms, over the {:.2}ms budget",
                work.as_secs_f64() * 1000.0,
                self.target_dt.as_secs_f64() * 1000.0
            );
        } else {
            std::thread::sleep(remaining);
        }
        self.last_frame_dt = self.frame_start.elapsed().as_secs_f64();
        self.frame_count += 1;
    }

    /// Duration of the last completed iteration in seconds.
    pub fn frame_dt(&self) -> f64 {
        self.last_frame_dt
    }

    pub fn frame_ms(&self) -> f64 {
        self.last_frame_dt * 1000.0
    }

    pub fn fps(&self) -> f64 {
        if self.last_frame_dt > 0.0 {
            1.0 / self.last_frame_dt
        } else {
            0.0
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

/// Fires at most once per `interval` of accumulated frame time.
pub struct TitleTimer {
    interval: f32,
    accumulated: f32,
}

impl TitleTimer {
    pub fn new(interval: f32) -> Self {
        // Starts full so the very first frame refreshes the title.
        Self {
            interval,
            accumulated: interval,
        }
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        if self.accumulated > self.interval {
            self.accumulated = 0.0;
            true
        } else {
            false
        }
    }
}

impl Default for TitleTimer {
    fn default() -> Self {
        Self::new(TITLE_UPDATE_INTERVAL_S)
    }
}
