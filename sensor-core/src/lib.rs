#![no_std]
//! Gyro acquisition and signal conditioning for the flight controller.
//!
//! A master loop calls [`GyroSensor::update`] as often as it can; the sensor's
//! own [`Timer`] decides which calls do work. Each working tick reads the
//! device, aligns, scales and de-biases the sample, then runs it through the
//! dynamic notch, the fixed notches and the low-pass cascade.

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
#[macro_use]
#[allow(unused_macros)]
mod fmt {
    macro_rules! info {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! warn {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }
}

pub mod alert;
pub mod analyzer;
pub mod config;
pub mod device;
pub mod error;
pub mod filter;
pub mod gyro;
pub mod state;
pub mod stats;
pub mod status;
pub mod timer;
pub mod vector;

pub use alert::{Alert, AlertSink};
pub use analyzer::{FreqAnalyzer, FrequencyAnalyzer};
pub use config::{DebugMode, DynamicFilterConfig, FilterConfig, GyroConfig, GyroDlpf, GyroFsr};
pub use device::{GyroDevice, detect};
pub use error::SensorError;
pub use filter::{Filter, SampleFilter, TunableNotch};
pub use gyro::{GyroSensor, Update};
pub use state::{AxisFilters, GyroState};
pub use stats::{Counter, Measure, Stats, StatsSink};
pub use status::SensorStatus;
pub use timer::Timer;
pub use vector::Align;
