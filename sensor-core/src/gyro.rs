//! Gyro acquisition and filter pipeline.

use crate::alert::{Alert, AlertSink};
use crate::analyzer::FrequencyAnalyzer;
use crate::config::{DebugMode, GyroConfig};
use crate::device::GyroDevice;
use crate::error::SensorError;
use crate::filter::{SampleFilter, TunableNotch};
use crate::state::GyroState;
use crate::stats::{Counter, Measure, StatsSink};
use crate::status::SensorStatus;
use crate::timer::micros;
use crate::vector::{self, round_i16};

#[cfg(feature = "defmt")]
use defmt::{info, warn};

type F = f32;

/// Max change of the accelerometer reading between two ticks for the
/// vehicle to count as stationary.
const ACCEL_STILL: F = 0.05;
/// Max angular rate in rad/s for the vehicle to count as stationary.
const GYRO_STILL: F = 0.20;

/// Dynamic notches are retuned when the low bits of the tick count are zero.
const RETUNE_MASK: u32 = 0x1f;

/// Outcome of one [`GyroSensor::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Update {
    /// Gyro inactive or not due, nothing was touched.
    Skipped,
    Updated,
}

impl Update {
    pub fn is_updated(self) -> bool {
        self == Update::Updated
    }
}

pub struct GyroSensor<D, B, S> {
    device: Option<D>,
    alerts: B,
    stats: S,
}

impl<D: GyroDevice, B: AlertSink, S: StatsSink> GyroSensor<D, B, S> {
    /// `device` is the result of [`detect`](crate::device::detect), `None` if
    /// no chip answered.
    pub fn new(device: Option<D>, alerts: B, stats: S) -> Self {
        Self {
            device,
            alerts,
            stats,
        }
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn alerts(&self) -> &B {
        &self.alerts
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    /// Pushes DLPF mode, rate divider and range to the chip and sets the
    /// pipeline rate and scale.
    ///
    /// Without a device the gyro is switched off for good.
    pub fn begin<N, A>(
        &mut self,
        config: &GyroConfig,
        status: &SensorStatus,
        state: &mut GyroState<N, A>,
    ) -> Result<(), SensorError> {
        let Some(device) = self.device.as_mut() else {
            status.set_gyro_active(false);
            warn!("gyro init failed, no device");
            return Err(SensorError::NoDevice);
        };

        let divider = config.divider.max(1);
        device.set_dlpf_mode(config.dlpf);
        device.set_rate(divider - 1);

        state.scale = config.fsr.scale();
        device.set_full_scale_gyro_range(config.fsr);

        state.timer.set_rate(config.sample_rate_hz());

        info!(
            "gyro init {} {} {} {} {} {}",
            config.dlpf,
            divider,
            state.timer.rate(),
            state.timer.interval(),
            device.name(),
            true
        );

        Ok(())
    }

    /// Runs one tick of the pipeline if the gyro is active and its timer is
    /// due. Meant to be polled from the main loop.
    pub fn update<N: TunableNotch, A: FrequencyAnalyzer>(
        &mut self,
        config: &GyroConfig,
        status: &SensorStatus,
        state: &mut GyroState<N, A>,
    ) -> Update {
        self.update_at(config, status, state, micros())
    }

    /// [`update`](Self::update) with an explicit timestamp in µs.
    pub fn update_at<N: TunableNotch, A: FrequencyAnalyzer>(
        &mut self,
        config: &GyroConfig,
        status: &SensorStatus,
        state: &mut GyroState<N, A>,
        now: u32,
    ) -> Update {
        if !status.gyro_active() {
            return Update::Skipped;
        }
        let Some(device) = self.device.as_mut() else {
            return Update::Skipped;
        };
        if !state.timer.check_at(now) {
            return Update::Skipped;
        }

        {
            let _measure = Measure::new(&mut self.stats, Counter::GyroRead);
            state.raw = device.read_gyro();
        }

        let _measure = Measure::new(&mut self.stats, Counter::GyroFilter);

        if !status.gyro_active() {
            return Update::Skipped;
        }

        config.align.apply(&mut state.raw);
        let mut gyro = vector::scale(vector::to_float(state.raw), state.scale);

        if state.bias_samples > 0 {
            let accel_delta = vector::sub(state.accel, state.accel_prev);
            state.accel_prev = state.accel;
            if vector::magnitude(accel_delta) < ACCEL_STILL && vector::magnitude(gyro) < GYRO_STILL
            {
                let step = vector::scale(vector::sub(gyro, state.bias), state.bias_alpha);
                state.bias = vector::add(state.bias, step);
                state.bias_samples -= 1;
                if state.bias_samples == 0 {
                    self.alerts.push(Alert::GyroCalibrated);
                    info!(
                        "gyro calibrated {} {} {}",
                        state.bias[0], state.bias[1], state.bias[2]
                    );
                }
            }
        }
        gyro = vector::sub(gyro, state.bias);

        let dynamic = config.dynamic_filter;
        let retune = state.timer.iteration() & RETUNE_MASK == 0;
        let accel_active = status.accel_active();

        for (i, axis) in state.axes.iter_mut().enumerate() {
            let mut x = gyro[i];

            match config.debug_mode {
                DebugMode::Gyro => state.debug[i] = state.raw[i],
                DebugMode::Notch => state.debug[i] = round_i16(x.to_degrees()),
                DebugMode::None | DebugMode::FftFreq => {}
            }

            if dynamic || config.debug_mode == DebugMode::FftFreq {
                axis.analyzer.update(x);
                if config.debug_mode == DebugMode::FftFreq {
                    state.debug[i] = round_i16(axis.analyzer.freq());
                    if i == 0 {
                        state.debug[3] = round_i16(x.to_degrees());
                    }
                }
            }

            if dynamic {
                if retune {
                    axis.retune();
                }
                x = axis.dynamic_notch.update(x);
            }

            state.gyro[i] = axis.fixed(x);
            if accel_active {
                state.imu[i] = axis.imu_lpf.update(x);
            }
        }

        Update::Updated
    }
}
