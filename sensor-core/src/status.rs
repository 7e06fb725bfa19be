//! Subsystem enable flags shared with the rest of the firmware.
//!
//! Flags are atomics so another context can switch the gyro off while a
//! device read is in flight. The sensor checks again after the read.

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct SensorStatus {
    gyro_active: AtomicBool,
    accel_active: AtomicBool,
}

impl SensorStatus {
    pub const fn new(gyro_active: bool, accel_active: bool) -> Self {
        Self {
            gyro_active: AtomicBool::new(gyro_active),
            accel_active: AtomicBool::new(accel_active),
        }
    }

    /// The accelerometer shares the gyro chip, so it needs the gyro present.
    pub const fn from_detection(gyro_present: bool, accel_enabled: bool) -> Self {
        Self::new(gyro_present, gyro_present && accel_enabled)
    }

    pub fn gyro_active(&self) -> bool {
        self.gyro_active.load(Ordering::Acquire)
    }

    pub fn accel_active(&self) -> bool {
        self.accel_active.load(Ordering::Acquire)
    }

    pub fn set_gyro_active(&self, active: bool) {
        self.gyro_active.store(active, Ordering::Release);
    }

    pub fn set_accel_active(&self, active: bool) {
        self.accel_active.store(active, Ordering::Release);
    }
}
