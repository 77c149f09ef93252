//! Frame timing for the render loop.
//!
//! The particle engine trusts the `dt` it is given. [`FrameClock`] is the
//! caller-side piece that measures real frame time, scales it and clamps
//! long stalls (window drags, breakpoints) so a single tick cannot emit or
//! kill half the pool at once.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new().with_time_scale(0.5);
//!
//! // In your frame loop:
//! let dt = clock.tick();
//! engine.update(dt);
//! ```

use std::time::Instant;

/// Default upper bound for a single tick, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Scaled, clamped frame delta source.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    /// Simulated seconds since start.
    elapsed_secs: f32,
    /// Last delta handed out.
    delta_secs: f32,
    frame_count: u64,
    time_scale: f32,
    max_delta: f32,
    paused: bool,
}

impl FrameClock {
    /// Clock starting now, at normal speed.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            time_scale: 1.0,
            max_delta: DEFAULT_MAX_DELTA,
            paused: false,
        }
    }

    /// Set time scale multiplier (`0.5` = half speed). Negative clamps to 0.
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Set the largest raw delta accepted per tick, before scaling.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Measure the time since the last tick and return the delta to simulate.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(raw)
    }

    /// Turn a raw frame duration into a simulation delta.
    ///
    /// Paused clocks return 0. Otherwise the delta is clamped to
    /// `[0, max_delta]` and multiplied by the time scale.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        self.frame_count += 1;
        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let clamped = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, self.max_delta)
        } else {
            0.0
        };
        self.delta_secs = clamped * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.delta_secs
    }

    /// Simulated seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Last delta returned by [`tick`](Self::tick) or [`advance`](Self::advance).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause state. Resuming does not replay the paused time.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.last_frame = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
