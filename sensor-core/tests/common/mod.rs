//! Shared mocks for pipeline tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sensor_core::{
    Alert, AlertSink, FilterConfig, FrequencyAnalyzer, GyroConfig, GyroDevice, GyroDlpf, GyroFsr,
    GyroSensor, GyroState, SampleFilter, SensorStatus, Stats, TunableNotch, Update,
};

/// Shared state of a [`MockGyro`], inspected by the test after handing the
/// device to the sensor.
#[derive(Debug, Default)]
pub struct MockState {
    pub present: bool,
    /// samples returned by successive reads, the last one repeats
    pub sequence: Vec<[i16; 3]>,
    pub reads: usize,

    pub dlpf: Option<GyroDlpf>,
    pub divider: Option<u8>,
    pub fsr: Option<GyroFsr>,

    /// switched off from "another context" during the next read
    pub disable_on_read: Option<Rc<SensorStatus>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockGyro {
    pub state: Rc<RefCell<MockState>>,
}

impl MockGyro {
    pub fn new(sequence: &[[i16; 3]]) -> Self {
        let mock = Self::default();
        {
            let mut state = mock.state.borrow_mut();
            state.present = true;
            state.sequence = sequence.to_vec();
        }
        mock
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn set_sample(&self, sample: [i16; 3]) {
        let mut state = self.state.borrow_mut();
        state.sequence = vec![sample];
        state.reads = 0;
    }

    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    pub fn disable_on_read(&self, status: Rc<SensorStatus>) {
        self.state.borrow_mut().disable_on_read = Some(status);
    }
}

impl GyroDevice for MockGyro {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn begin(&mut self) -> bool {
        self.state.borrow().present
    }

    fn set_dlpf_mode(&mut self, mode: GyroDlpf) {
        self.state.borrow_mut().dlpf = Some(mode);
    }

    fn set_rate(&mut self, divider: u8) {
        self.state.borrow_mut().divider = Some(divider);
    }

    fn set_full_scale_gyro_range(&mut self, range: GyroFsr) {
        self.state.borrow_mut().fsr = Some(range);
    }

    fn read_gyro(&mut self) -> [i16; 3] {
        let mut state = self.state.borrow_mut();
        let sample = state
            .sequence
            .get(state.reads)
            .or(state.sequence.last())
            .copied()
            .unwrap_or_default();
        state.reads += 1;
        if let Some(status) = state.disable_on_read.take() {
            status.set_gyro_active(false);
        }
        sample
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlerts(pub Vec<Alert>);

impl AlertSink for RecordingAlerts {
    fn push(&mut self, alert: Alert) {
        self.0.push(alert);
    }
}

/// Pass-through notch that counts how often it was retuned.
#[derive(Debug, Clone, PartialEq)]
pub struct SpyNotch {
    pub reconfigured: u32,
    pub center: f32,
    pub cutoff: f32,
}

impl SpyNotch {
    pub fn new() -> Self {
        Self {
            reconfigured: 0,
            center: 0.0,
            cutoff: 0.0,
        }
    }
}

impl SampleFilter for SpyNotch {
    fn update(&mut self, sample: f32) -> f32 {
        sample
    }
}

impl TunableNotch for SpyNotch {
    fn reconfigure(&mut self, center_hz: f32, cutoff_hz: f32) {
        self.reconfigured += 1;
        self.center = center_hz;
        self.cutoff = cutoff_hz;
    }
}

pub type Sensor = GyroSensor<MockGyro, RecordingAlerts, Stats>;

pub fn sensor(device: &MockGyro) -> Sensor {
    GyroSensor::new(Some(device.clone()), RecordingAlerts::default(), Stats::new())
}

/// Config with every filter stage off, so outputs equal the scaled samples.
pub fn unfiltered_config() -> GyroConfig {
    GyroConfig {
        lpf1: FilterConfig::None,
        imu_lpf: FilterConfig::None,
        ..GyroConfig::default()
    }
}

/// Calls `update` exactly when the gyro timer is due.
pub fn tick<N: TunableNotch, A: FrequencyAnalyzer>(
    sensor: &mut Sensor,
    config: &GyroConfig,
    status: &SensorStatus,
    state: &mut GyroState<N, A>,
) -> Update {
    let now = state.timer.last().wrapping_add(state.timer.interval());
    sensor.update_at(config, status, state, now)
}

pub fn assert_close(a: [f32; 3], b: [f32; 3], eps: f32) {
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < eps, "axis {i}: {a:?} != {b:?}");
    }
}
