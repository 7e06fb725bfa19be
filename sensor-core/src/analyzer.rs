//! Online estimate of the dominant vibration frequency on one axis.

use crate::config::DynamicFilterConfig;
use crate::filter::{Filter, SampleFilter};

type F = f32;

/// Weight of a new period measurement in the running estimate.
const SMOOTHING: F = 0.25;

pub trait FrequencyAnalyzer {
    fn update(&mut self, sample: F);
    /// Current estimate in Hz.
    fn freq(&self) -> F;
    /// Suggested lower edge of a notch centred on [`freq`](Self::freq).
    fn cutoff(&self) -> F;
}

/// Zero crossing frequency tracker.
///
/// The input is band-passed to the search band, then the period between
/// rising zero crossings is measured. The smoothed result is clamped to
/// `[min_freq, max_freq]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FreqAnalyzer {
    rate: F,
    min_freq: F,
    max_freq: F,
    cutoff_ratio: F,

    bpf: Filter,
    prev: F,
    samples: u32,

    freq: F,
    cutoff: F,
}

impl FreqAnalyzer {
    pub fn new(config: &DynamicFilterConfig, rate_hz: u32) -> Self {
        let min_freq = config.min_freq.min(config.max_freq) as F;
        let max_freq = config.max_freq.max(config.min_freq) as F;
        let center = libm::sqrtf(min_freq * max_freq);
        let q = (center / (max_freq - min_freq).max(1.0)).max(0.5);
        let freq = (min_freq + max_freq) / 2.0;

        Self {
            rate: rate_hz as F,
            min_freq,
            max_freq,
            cutoff_ratio: config.cutoff_ratio,
            bpf: Filter::bandpass(center, q, rate_hz),
            prev: 0.0,
            samples: 0,
            freq,
            cutoff: freq * config.cutoff_ratio,
        }
    }
}

impl FrequencyAnalyzer for FreqAnalyzer {
    fn update(&mut self, sample: F) {
        let y = self.bpf.update(sample);
        self.samples = self.samples.saturating_add(1);

        if self.prev < 0.0 && y >= 0.0 {
            let measured = (self.rate / self.samples as F).clamp(self.min_freq, self.max_freq);
            self.samples = 0;
            self.freq += (measured - self.freq) * SMOOTHING;
            self.cutoff = self.freq * self.cutoff_ratio;
        }
        self.prev = y;
    }

    fn freq(&self) -> F {
        self.freq
    }

    fn cutoff(&self) -> F {
        self.cutoff
    }
}
