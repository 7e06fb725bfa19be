//! Periodic gate driven by a wrapping microsecond counter.
//!
//! A [`Timer`] never sleeps. The caller polls [`Timer::check`] at least as
//! often as the target rate and does its work whenever it returns `true`.
//! Dependent timers can be phase-locked to a master with [`Timer::sync`].

use embassy_time::Instant;

const MICROS_PER_SEC: u32 = 1_000_000;

/// Current time as a 32-bit microsecond counter, wrapping after ~71 minutes.
pub fn micros() -> u32 {
    Instant::now().as_micros() as u32
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    /// gate width in µs, 0 disables the timer
    interval: u32,
    /// effective fire rate in Hz
    rate: u32,
    /// submultiple divisor applied when a master syncs this timer
    denom: u32,

    last: u32,
    iteration: u32,
    /// seconds between the last two fires
    delta: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            interval: 0,
            rate: 0,
            denom: 1,
            last: 0,
            iteration: 0,
            delta: 0.0,
        }
    }

    /// Fire every `interval_us` microseconds.
    pub fn set_interval(&mut self, interval_us: u32) {
        self.interval = interval_us;
        self.rate = MICROS_PER_SEC.checked_div(interval_us).unwrap_or(0);
        self.denom = 1;
        self.restart();
    }

    /// Fire at `rate_hz`.
    pub fn set_rate(&mut self, rate_hz: u32) {
        self.set_rate_divided(rate_hz, 1);
    }

    /// Fire at `rate_hz / denom`.
    ///
    /// When this timer is driven through [`Timer::sync`], `denom` is the number
    /// of master iterations per fire.
    pub fn set_rate_divided(&mut self, rate_hz: u32, denom: u32) {
        self.denom = denom.max(1);
        self.rate = rate_hz / self.denom;
        self.interval = MICROS_PER_SEC.checked_div(self.rate).unwrap_or(0);
        self.restart();
    }

    fn restart(&mut self) {
        self.iteration = 0;
        self.delta = 0.0;
    }

    /// Samples the clock and fires if the interval has elapsed.
    pub fn check(&mut self) -> bool {
        self.check_at(micros())
    }

    /// Fires if at least `interval` µs passed between the last fire and `now`.
    pub fn check_at(&mut self, now: u32) -> bool {
        if self.interval == 0 {
            return false;
        }
        if now.wrapping_sub(self.last) < self.interval {
            return false;
        }
        self.update_at(now);
        true
    }

    /// Unconditionally fires at the current clock time.
    pub fn update(&mut self) {
        self.update_at(micros());
    }

    pub fn update_at(&mut self, now: u32) {
        self.delta = now.wrapping_sub(self.last) as f32 / MICROS_PER_SEC as f32;
        self.iteration = self.iteration.wrapping_add(1);
        self.last = now;
    }

    /// Fires `dependent` on every `dependent.denom`-th iteration of this timer.
    ///
    /// The dependent's own interval is ignored, so it stays phase-locked to this
    /// timer instead of drifting against it. Returns whether it fired.
    pub fn sync(&self, dependent: &mut Timer) -> bool {
        self.sync_at(dependent, micros())
    }

    pub fn sync_at(&self, dependent: &mut Timer, now: u32) -> bool {
        if self.iteration % dependent.denom != 0 {
            return false;
        }
        dependent.update_at(now);
        true
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn denom(&self) -> u32 {
        self.denom
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}
