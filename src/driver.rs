use crate::config::SwitchMode;
use crate::morph::AnimationState;
use std::time::{Duration, Instant};

pub const DEFAULT_SECONDS_PER_SWITCH: f32 = 8.0;
const MIN_PERIOD_SECS: f32 = 1.0;
const MAX_PERIOD_SECS: f32 = 86_400.0;

/// Timer-driven shape selection. A visible hand keeps restarting the timer so
/// gesture input stays in charge.
#[derive(Debug, Clone)]
pub struct ShapeDriver {
    mode: SwitchMode,
    period: Duration,
    last_switch: Instant,
}

impl ShapeDriver {
    pub fn new(mode: SwitchMode, seconds_per_switch: f32, now: Instant) -> Self {
        Self {
            mode,
            period: switch_period(seconds_per_switch),
            last_switch: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn mode(&self) -> SwitchMode {
        self.mode
    }

    pub fn toggle_mode(&mut self, now: Instant) {
        self.mode = self.mode.toggled();
        self.last_switch = now;
    }

    /// Any manual or gesture selection restarts the countdown.
    pub fn touch(&mut self, now: Instant) {
        self.last_switch = now;
    }

    /// Returns true when the timer advanced the active shape.
    pub fn update(&mut self, now: Instant, state: &mut AnimationState) -> bool {
        if self.mode != SwitchMode::Time {
            return false;
        }
        if now.saturating_duration_since(self.last_switch) < self.period {
            return false;
        }
        state.active_shape = state.active_shape.next();
        self.last_switch = now;
        log::debug!("timer switched shape to {}", state.active_shape);
        true
    }

    pub fn next(&mut self, now: Instant, state: &mut AnimationState) {
        state.active_shape = state.active_shape.next();
        self.last_switch = now;
    }

    pub fn prev(&mut self, now: Instant, state: &mut AnimationState) {
        state.active_shape = state.active_shape.prev();
        self.last_switch = now;
    }
}

/// Non-finite periods fall back to the default; finite ones are held to a
/// day at most so the `Duration` conversion cannot overflow.
fn switch_period(seconds: f32) -> Duration {
    let secs = if seconds.is_finite() {
        seconds.clamp(MIN_PERIOD_SECS, MAX_PERIOD_SECS)
    } else {
        log::warn!("seconds-per-switch {seconds} is not finite; using {DEFAULT_SECONDS_PER_SWITCH}");
        DEFAULT_SECONDS_PER_SWITCH
    };
    Duration::from_secs_f32(secs)
}
