//! Runtime state of the gyro pipeline.
//!
//! Created once at init from the config, then mutated only by
//! [`GyroSensor::update`](crate::gyro::GyroSensor::update). Consumers read
//! `gyro` (control path) and `imu` (fusion path) between ticks.

use crate::analyzer::{FreqAnalyzer, FrequencyAnalyzer};
use crate::config::GyroConfig;
use crate::filter::{Filter, SampleFilter, TunableNotch};
use crate::timer::Timer;
use crate::vector::ZERO;

type F = f32;

/// Filter bank of one axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisFilters<N = Filter, A = FreqAnalyzer> {
    pub analyzer: A,
    pub dynamic_notch: N,
    pub notch1: Filter,
    pub notch2: Filter,
    pub lpf1: Filter,
    pub lpf2: Filter,
    pub lpf3: Filter,
    pub imu_lpf: Filter,
}

impl<N: TunableNotch, A: FrequencyAnalyzer> AxisFilters<N, A> {
    fn new(config: &GyroConfig, rate_hz: u32, dynamic_notch: N, analyzer: A) -> Self {
        Self {
            analyzer,
            dynamic_notch,
            notch1: Filter::new(config.notch1, rate_hz),
            notch2: Filter::new(config.notch2, rate_hz),
            lpf1: Filter::new(config.lpf1, rate_hz),
            lpf2: Filter::new(config.lpf2, rate_hz),
            lpf3: Filter::new(config.lpf3, rate_hz),
            imu_lpf: Filter::new(config.imu_lpf, rate_hz),
        }
    }

    /// Moves the dynamic notch onto the analyzer's current estimate.
    pub fn retune(&mut self) {
        self.dynamic_notch
            .reconfigure(self.analyzer.freq(), self.analyzer.cutoff());
    }

    /// Two notches then three low-passes, the control path output.
    pub fn fixed(&mut self, sample: F) -> F {
        let mut x = self.notch1.update(sample);
        x = self.notch2.update(x);
        x = self.lpf1.update(x);
        x = self.lpf2.update(x);
        self.lpf3.update(x)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroState<N = Filter, A = FreqAnalyzer> {
    /// last sample, aligned, device counts
    pub raw: [i16; 3],
    /// control path, rad/s
    pub gyro: [F; 3],
    /// fusion path, rad/s
    pub imu: [F; 3],

    pub bias: [F; 3],
    /// qualifying samples left in the calibration session, 0 = done
    pub bias_samples: u32,
    pub bias_alpha: F,

    /// rad/s per count, set by `begin`
    pub scale: F,
    pub timer: Timer,

    /// written by the accelerometer, used for stationarity detection
    pub accel: [F; 3],
    pub accel_prev: [F; 3],

    pub debug: [i16; 4],

    pub axes: [AxisFilters<N, A>; 3],
}

impl GyroState {
    /// State with the built-in dynamic notch and analyzer, running at the
    /// configured sample rate.
    pub fn new(config: &GyroConfig) -> Self {
        let rate = config.sample_rate_hz();
        let analyzers = [(); 3].map(|_| FreqAnalyzer::new(&config.dynamic, rate));
        let notches = analyzers
            .each_ref()
            .map(|a| Filter::notch(a.freq(), a.cutoff(), rate));
        Self::with_dynamic(config, notches, analyzers)
    }
}

impl<N: TunableNotch, A: FrequencyAnalyzer> GyroState<N, A> {
    /// State with caller supplied dynamic notches and analyzers. A notch must
    /// honour `reconfigure`, a [`Filter`] passed here should come from
    /// [`Filter::notch`].
    pub fn with_dynamic(config: &GyroConfig, notches: [N; 3], analyzers: [A; 3]) -> Self {
        let rate = config.sample_rate_hz();
        let [n0, n1, n2] = notches;
        let [a0, a1, a2] = analyzers;
        let axes = [
            AxisFilters::new(config, rate, n0, a0),
            AxisFilters::new(config, rate, n1, a1),
            AxisFilters::new(config, rate, n2, a2),
        ];

        let mut timer = Timer::new();
        timer.set_rate(rate);

        Self {
            raw: [0; 3],
            gyro: ZERO,
            imu: ZERO,
            bias: ZERO,
            bias_samples: 0,
            bias_alpha: 0.0,
            scale: config.fsr.scale(),
            timer,
            accel: ZERO,
            accel_prev: ZERO,
            debug: [0; 4],
            axes,
        }
    }

    /// Arms a calibration session of two seconds worth of stationary samples
    /// at `rate_hz`. The running bias is kept as the starting estimate.
    pub fn start_calibration(&mut self, rate_hz: u32) {
        let rate = rate_hz.max(1);
        self.bias_samples = rate.saturating_mul(2);
        self.bias_alpha = (5.0 / rate as F).min(1.0);
    }

    pub fn is_calibrating(&self) -> bool {
        self.bias_samples > 0
    }
}
