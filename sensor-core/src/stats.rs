//! Execution time spans for telemetry and profiling.

use crate::timer::micros;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counter {
    GyroRead,
    GyroFilter,
}

impl Counter {
    pub const COUNT: usize = 2;
    pub const ALL: [Counter; Self::COUNT] = [Counter::GyroRead, Counter::GyroFilter];

    pub const fn name(self) -> &'static str {
        match self {
            Counter::GyroRead => "gyro read",
            Counter::GyroFilter => "gyro filter",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

pub trait StatsSink {
    fn record(&mut self, counter: Counter, elapsed_us: u32);
}

impl<S: StatsSink + ?Sized> StatsSink for &mut S {
    fn record(&mut self, counter: Counter, elapsed_us: u32) {
        (**self).record(counter, elapsed_us)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterStats {
    pub last_us: u32,
    /// exponential moving average, alpha = 0.1
    pub avg_us: u32,
    pub max_us: u32,
    pub count: u32,
}

impl CounterStats {
    fn update(&mut self, elapsed_us: u32) {
        self.last_us = elapsed_us;
        self.count = self.count.saturating_add(1);
        if self.count == 1 {
            self.avg_us = elapsed_us;
        } else {
            self.avg_us = ((elapsed_us as u64 + 9 * self.avg_us as u64) / 10) as u32;
        }
        self.max_us = self.max_us.max(elapsed_us);
    }
}

/// Per counter timing statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    counters: [CounterStats; Counter::COUNT],
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, counter: Counter) -> &CounterStats {
        &self.counters[counter.index()]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl StatsSink for Stats {
    fn record(&mut self, counter: Counter, elapsed_us: u32) {
        self.counters[counter.index()].update(elapsed_us);
    }
}

/// Records the time between its creation and drop under `counter`.
pub struct Measure<'a, S: StatsSink + ?Sized> {
    stats: &'a mut S,
    counter: Counter,
    start: u32,
}

impl<'a, S: StatsSink + ?Sized> Measure<'a, S> {
    pub fn new(stats: &'a mut S, counter: Counter) -> Self {
        Self {
            stats,
            counter,
            start: micros(),
        }
    }
}

impl<S: StatsSink + ?Sized> Drop for Measure<'_, S> {
    fn drop(&mut self) {
        let elapsed = micros().wrapping_sub(self.start);
        self.stats.record(self.counter, elapsed);
    }
}
