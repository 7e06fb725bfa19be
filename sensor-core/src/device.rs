//! Gyro chip capability and detection.
//!
//! Drivers are built by the board layer with their bus handle (I2C address or
//! SPI chip select) already bound. This module only probes them and hands the
//! first one that answers to the sensor.

use crate::config::{GyroDlpf, GyroFsr};

#[cfg(feature = "defmt")]
use defmt::{info, warn};

pub trait GyroDevice {
    /// Chip name for logging.
    fn name(&self) -> &'static str;

    /// Probes and initialises the chip, `false` if it did not answer.
    fn begin(&mut self) -> bool;

    fn set_dlpf_mode(&mut self, mode: GyroDlpf);

    /// Sample clock divider, the chip outputs at `clock / (divider + 1)`.
    fn set_rate(&mut self, divider: u8);

    fn set_full_scale_gyro_range(&mut self, range: GyroFsr);

    /// Latest raw sample, chip axes, chip units.
    fn read_gyro(&mut self) -> [i16; 3];
}

impl<D: GyroDevice + ?Sized> GyroDevice for &mut D {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn begin(&mut self) -> bool {
        (**self).begin()
    }

    fn set_dlpf_mode(&mut self, mode: GyroDlpf) {
        (**self).set_dlpf_mode(mode)
    }

    fn set_rate(&mut self, divider: u8) {
        (**self).set_rate(divider)
    }

    fn set_full_scale_gyro_range(&mut self, range: GyroFsr) {
        (**self).set_full_scale_gyro_range(range)
    }

    fn read_gyro(&mut self) -> [i16; 3] {
        (**self).read_gyro()
    }
}

/// Probes `candidates` in order and returns the first chip that answers.
///
/// Later candidates are not probed once one is found.
pub fn detect<D: GyroDevice>(candidates: impl IntoIterator<Item = D>) -> Option<D> {
    for mut candidate in candidates {
        let status = candidate.begin();
        info!("gyro detect {} {}", candidate.name(), status);
        if status {
            return Some(candidate);
        }
    }
    warn!("no gyro detected");
    None
}
