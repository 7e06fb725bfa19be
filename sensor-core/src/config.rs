//! Gyro configuration, read-only to the pipeline.

use core::f32::consts::PI;

use crate::vector::Align;

/// Digital low-pass mode of the gyro chip itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroDlpf {
    #[default]
    Hz256 = 0,
    Hz188 = 1,
    Hz98 = 2,
    Hz42 = 3,
    Hz20 = 4,
    Hz10 = 5,
    Hz5 = 6,
}

impl GyroDlpf {
    /// Internal sample clock of the chip in this mode.
    pub const fn sample_clock_hz(self) -> u32 {
        match self {
            GyroDlpf::Hz256 => 8000,
            _ => 1000,
        }
    }
}

/// Gyro full scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFsr {
    Dps250 = 0,
    Dps500 = 1,
    Dps1000 = 2,
    #[default]
    Dps2000 = 3,
}

impl GyroFsr {
    /// Raw counts per °/s.
    pub const fn lsb_per_dps(self) -> f32 {
        match self {
            GyroFsr::Dps250 => 131.072,
            GyroFsr::Dps500 => 65.536,
            GyroFsr::Dps1000 => 32.768,
            GyroFsr::Dps2000 => 16.384,
        }
    }

    /// rad/s per raw count.
    pub fn scale(self) -> f32 {
        PI / (self.lsb_per_dps() * 180.0)
    }
}

/// One filter stage, instantiated at the gyro sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterConfig {
    #[default]
    None,
    Pt1 {
        cutoff: u16,
    },
    /// 2nd order Butterworth low-pass
    Biquad {
        cutoff: u16,
    },
    /// `cutoff` is the lower edge of the stop band
    Notch {
        freq: u16,
        cutoff: u16,
    },
}

/// Search band of the per-axis frequency analyzer that tunes the dynamic notch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DynamicFilterConfig {
    pub min_freq: u16,
    pub max_freq: u16,
    /// notch lower edge as a fraction of the tracked frequency
    pub cutoff_ratio: f32,
}

impl Default for DynamicFilterConfig {
    fn default() -> Self {
        Self {
            min_freq: 80,
            max_freq: 400,
            cutoff_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebugMode {
    #[default]
    None,
    /// aligned raw counts
    Gyro,
    /// bias corrected rate in °/s
    Notch,
    /// analyzer frequency per axis, roll rate in °/s in slot 3
    FftFreq,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroConfig {
    pub dlpf: GyroDlpf,
    pub fsr: GyroFsr,
    pub align: Align,
    /// divides the chip sample clock, 1 = every sample
    pub divider: u8,

    pub notch1: FilterConfig,
    pub notch2: FilterConfig,
    pub lpf1: FilterConfig,
    pub lpf2: FilterConfig,
    pub lpf3: FilterConfig,
    /// fusion path low-pass
    pub imu_lpf: FilterConfig,

    pub dynamic_filter: bool,
    pub dynamic: DynamicFilterConfig,

    pub debug_mode: DebugMode,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            dlpf: GyroDlpf::Hz256,
            fsr: GyroFsr::Dps2000,
            align: Align::Default,
            divider: 8,
            notch1: FilterConfig::None,
            notch2: FilterConfig::None,
            lpf1: FilterConfig::Pt1 { cutoff: 100 },
            lpf2: FilterConfig::None,
            lpf3: FilterConfig::None,
            imu_lpf: FilterConfig::Pt1 { cutoff: 80 },
            dynamic_filter: false,
            dynamic: DynamicFilterConfig::default(),
            debug_mode: DebugMode::None,
        }
    }
}

impl GyroConfig {
    /// Rate at which the pipeline runs, in Hz.
    pub fn sample_rate_hz(&self) -> u32 {
        self.dlpf.sample_clock_hz() / self.divider.max(1) as u32
    }
}
