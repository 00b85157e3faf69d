use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeDirection {
    /// Ramp towards the play gain.
    In,
    /// Ramp towards silence, then pause.
    Out,
}

/// A linear gain ramp anchored at a start instant.
#[derive(Debug, Copy, Clone)]
pub struct Fade {
    from: f32,
    to: f32,
    started: Instant,
    length: Duration,
    direction: FadeDirection,
}

impl Fade {
    pub fn new(from: f32, to: f32, started: Instant, length: Duration, direction: FadeDirection) -> Self {
        Self {
            from,
            to,
            started,
            length,
            direction,
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    /// Gain at `now`, clamped to the ramp's end points.
    pub fn gain_at(&self, now: Instant) -> f32 {
        if self.length.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f32() / self.length.as_secs_f32()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.length
    }

    /// Move the end point without restarting the ramp.
    pub fn retarget(&mut self, to: f32) {
        self.to = to;
    }
}
