//! Playback state of the simulation timeline.

use crate::error::{Result, WellError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Time span of a simulation series, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl TimeBounds {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        if !(max > min) || !(step > 0.0) {
            return Err(WellError::MalformedInput(format!(
                "invalid time bounds: min={} max={} step={}",
                min, max, step
            )));
        }
        Ok(Self { min, max, step })
    }

    /// Bounds of a sampled time index: first, last and first spacing.
    pub fn from_keys(times: &[f64]) -> Result<Self> {
        match times {
            [first, second, .., last] => Self::new(*first, *last, second - first),
            [first, last] => Self::new(*first, *last, last - first),
            _ => Err(WellError::MalformedInput(format!(
                "time index needs at least two samples, got {}",
                times.len()
            ))),
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for TimeBounds {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 0.1,
        }
    }
}

/// Current time cursor, bounds, speed and pause flag.
///
/// `min <= current <= max` holds at all times. Advancing past either end
/// wraps around modulo the span.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    bounds: TimeBounds,
    current: f64,
    speedup: f64,
    state: PlaybackState,
    background_image: Option<String>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(TimeBounds::default(), 3.0)
    }
}

impl Timeline {
    pub fn new(bounds: TimeBounds, speedup: f64) -> Self {
        Self {
            bounds,
            current: bounds.min,
            speedup,
            state: PlaybackState::Playing,
            background_image: None,
        }
    }

    pub fn bounds(&self) -> TimeBounds {
        self.bounds
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn speedup(&self) -> f64 {
        self.speedup
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Preview image shown behind the scrub bar.
    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    /// Installs new bounds (new well or connection) and rewinds to `min`.
    pub fn set_bounds(&mut self, bounds: TimeBounds) {
        self.bounds = bounds;
        self.current = bounds.min;
    }

    pub fn set_background_image(&mut self, image: Option<String>) {
        self.background_image = image;
    }

    /// Playback rate in simulation seconds per wall-clock second. Negative
    /// values play backwards.
    pub fn set_speedup(&mut self, speedup: f64) {
        self.speedup = speedup;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state = if paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        };
    }

    pub fn toggle_pause(&mut self) -> PlaybackState {
        self.set_paused(!self.is_paused());
        self.state
    }

    /// Jumps straight to `time`, clamped to the bounds. No wrapping.
    pub fn scrub_to(&mut self, time: f64) -> f64 {
        self.current = time.clamp(self.bounds.min, self.bounds.max);
        self.normalized_time()
    }

    /// Advances by `dt` wall-clock seconds unless paused, then returns the
    /// normalized time.
    pub fn tick(&mut self, dt: f64) -> f64 {
        let delta = self.speedup * dt;
        if self.state == PlaybackState::Playing && delta != 0.0 {
            let span = self.bounds.span();
            self.current = if span > 0.0 {
                self.bounds.min + (self.current - self.bounds.min + delta).rem_euclid(span)
            } else {
                self.bounds.min
            };
        }
        self.normalized_time()
    }

    /// `(current - min) / (max - min)`, in [0, 1].
    pub fn normalized_time(&self) -> f64 {
        let span = self.bounds.span();
        if span > 0.0 {
            (self.current - self.bounds.min) / span
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred() -> Timeline {
        Timeline::new(TimeBounds::new(0.0, 100.0, 0.1).unwrap(), 1.0)
    }

    #[test]
    fn wraps_past_max() {
        let mut t = hundred();
        t.scrub_to(95.0);
        t.tick(10.0);
        assert!((t.current() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn speed_scales_advance() {
        let mut t = hundred();
        t.set_speedup(3.0);
        let n = t.tick(2.0);
        assert!((t.current() - 6.0).abs() < 1e-12);
        assert!((n - 0.06).abs() < 1e-12);
    }

    #[test]
    fn zero_speed_holds_time() {
        let mut t = hundred();
        t.set_speedup(0.0);
        for start in [0.0, 42.5, 100.0] {
            t.scrub_to(start);
            for _ in 0..1000 {
                t.tick(1.0 / 60.0);
            }
            assert_eq!(t.current(), start);
        }
    }

    #[test]
    fn negative_speed_wraps_backwards_inside_bounds() {
        let mut t = Timeline::new(TimeBounds::new(10.0, 20.0, 0.5).unwrap(), -1.0);
        t.scrub_to(12.0);
        t.tick(3.0);
        assert!((t.current() - 19.0).abs() < 1e-9);
        for _ in 0..500 {
            t.tick(0.37);
            assert!(t.current() >= 10.0 && t.current() <= 20.0);
        }
    }

    #[test]
    fn paused_ticks_do_not_advance() {
        let mut t = hundred();
        t.scrub_to(30.0);
        assert_eq!(t.toggle_pause(), PlaybackState::Paused);
        t.tick(5.0);
        assert_eq!(t.current(), 30.0);
        assert_eq!(t.toggle_pause(), PlaybackState::Playing);
        t.tick(5.0);
        assert_eq!(t.current(), 35.0);
    }

    #[test]
    fn scrub_clamps_and_bounds_rewind() {
        let mut t = hundred();
        assert_eq!(t.scrub_to(150.0), 1.0);
        assert_eq!(t.scrub_to(-4.0), 0.0);

        t.scrub_to(50.0);
        t.set_bounds(TimeBounds::new(5.0, 25.0, 0.1).unwrap());
        assert_eq!(t.current(), 5.0);
        assert_eq!(t.normalized_time(), 0.0);
    }

    #[test]
    fn bounds_from_time_index() {
        let b = TimeBounds::from_keys(&[0.0, 0.1, 0.2, 0.3, 27.8]).unwrap();
        assert_eq!(b.min, 0.0);
        assert_eq!(b.max, 27.8);
        assert!((b.step - 0.1).abs() < 1e-12);
        assert!(TimeBounds::from_keys(&[1.0]).is_err());
        assert!(TimeBounds::new(3.0, 3.0, 1.0).is_err());
    }
}
