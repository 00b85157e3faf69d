//! Countdown timer that silences the mixer when it runs out.
//!
//! Remaining time is recomputed from a deadline on every tick, so a process
//! that was suspended catches up instead of drifting.

use std::time::{Duration, Instant};

use crate::error::ValidationError;

/// Longest timer a user may start.
pub const MAX_TIMER_MINUTES: u32 = 999;

/// Result of advancing the timer to a new instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running.
    Idle,
    Running { remaining: u64 },
    /// The deadline passed on this tick. Reported exactly once per run.
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct Timer {
    duration_secs: u64,
    remaining_secs: u64,
    deadline: Option<Instant>,
    active: bool,
    visible: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a countdown of `minutes`. Invalid input leaves the
    /// timer untouched.
    pub fn start(&mut self, minutes: u32, now: Instant) -> Result<(), ValidationError> {
        let minutes = validate_minutes(minutes)?;
        let secs = u64::from(minutes) * 60;
        self.duration_secs = secs;
        self.remaining_secs = secs;
        self.deadline = Some(now + Duration::from_secs(secs));
        self.active = true;
        self.visible = true;
        Ok(())
    }

    /// Cancel and hide the timer. Sounds are left alone.
    pub fn stop(&mut self) {
        self.duration_secs = 0;
        self.remaining_secs = 0;
        self.deadline = None;
        self.active = false;
        self.visible = false;
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let Some(deadline) = self.deadline.filter(|_| self.active) else {
            return TickOutcome::Idle;
        };
        let left = deadline.saturating_duration_since(now);
        let secs = (left.as_secs() + u64::from(left.subsec_nanos() > 0)).min(self.remaining_secs);
        if secs == 0 {
            // Expired timers stay visible at 00:00 until stopped.
            self.remaining_secs = 0;
            self.deadline = None;
            self.active = false;
            TickOutcome::Expired
        } else {
            self.remaining_secs = secs;
            TickOutcome::Running { remaining: secs }
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Elapsed share of the run in `0.0..=100.0`; zero when no run is set.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        let elapsed = self.duration_secs - self.remaining_secs;
        elapsed as f64 / self.duration_secs as f64 * 100.0
    }
}

/// `MM:SS`, zero padded. Minutes are never rolled into hours.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn validate_minutes(minutes: u32) -> Result<u32, ValidationError> {
    match minutes {
        0 => Err(ValidationError::TooShort),
        m if m > MAX_TIMER_MINUTES => Err(ValidationError::TooLong {
            max: MAX_TIMER_MINUTES,
        }),
        m => Ok(m),
    }
}

/// Parse and validate a custom duration typed by the user.
pub fn parse_minutes(text: &str) -> Result<u32, ValidationError> {
    let text = text.trim();
    if let Some(digits) = text.strip_prefix('-') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::TooShort);
        }
        return Err(ValidationError::NotANumber);
    }
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotANumber);
    }
    match text.parse::<u32>() {
        Ok(m) => validate_minutes(m),
        // All digits but too many of them.
        Err(_) => Err(ValidationError::TooLong {
            max: MAX_TIMER_MINUTES,
        }),
    }
}
