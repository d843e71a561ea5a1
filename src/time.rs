//! Frame timing.
//!
//! The physics step is frame-based (velocities are per-frame), so `Time`
//! does not drive the simulation. It counts frames, measures FPS for the log,
//! and stops the clock while the field is paused so that the first frame
//! after a resume does not report the hidden interval as one huge delta.
//!
//! Uses `web_time::Instant`, which is `std::time::Instant` on native targets
//! and `performance.now()` in the browser.

use web_time::{Duration, Instant};

/// Frame clock for one field.
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    /// Seconds since start, excluding paused intervals.
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
    /// Fixed delta for synthetic clocks.
    fixed_delta: Option<f32>,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(1000),
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta: None,
        }
    }

    /// A clock that advances by exactly `delta` seconds per frame.
    pub fn fixed(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Record one frame. Returns `true` when the FPS estimate was refreshed.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            self.delta_secs = 0.0;
            return false;
        }
        self.frame_count += 1;

        if let Some(delta) = self.fixed_delta {
            self.delta_secs = delta;
            self.elapsed_secs += delta;
            if delta > 0.0 {
                self.fps = 1.0 / delta;
            }
            return false;
        }

        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = (now.duration_since(self.start) - self.pause_elapsed).as_secs_f32();

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames recorded since start (paused frames excluded).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause, excluding the paused interval from `elapsed`.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.fps_update_time = now;
            self.fps_frame_count = self.frame_count;
            self.paused = false;
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
