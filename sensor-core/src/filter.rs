//! Per-axis IIR filter stages.
//!
//! Every stage is an owned object holding its coefficients and history, so a
//! cascade is just calling `update` on one stage after the other.

use core::f32::consts::{FRAC_1_SQRT_2, PI};

use crate::config::FilterConfig;

type F = f32;

/// A single-input single-output filter stage.
pub trait SampleFilter {
    fn update(&mut self, sample: F) -> F;
}

/// A notch whose centre can be moved while running.
pub trait TunableNotch: SampleFilter {
    /// Moves the notch to `center_hz`, `cutoff_hz` being the lower edge of the
    /// stop band. Filter history is kept.
    fn reconfigure(&mut self, center_hz: F, cutoff_hz: F);
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Filter {
    rate: F,
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Kind {
    None,
    Pt1 { k: F, y: F },
    Biquad(Biquad),
}

/// Direct form I biquad, coefficients normalised by a0.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Biquad {
    b0: F,
    b1: F,
    b2: F,
    a1: F,
    a2: F,

    x1: F,
    x2: F,
    y1: F,
    y2: F,
}

impl Biquad {
    const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
        x1: 0.0,
        x2: 0.0,
        y1: 0.0,
        y2: 0.0,
    };

    fn set_coefficients(&mut self, b: [F; 3], a: [F; 3]) {
        let a0 = a[0];
        self.b0 = b[0] / a0;
        self.b1 = b[1] / a0;
        self.b2 = b[2] / a0;
        self.a1 = a[1] / a0;
        self.a2 = a[2] / a0;
    }

    fn set_identity(&mut self) {
        self.set_coefficients([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    }

    fn omega(freq: F, rate: F) -> (F, F) {
        let w0 = 2.0 * PI * freq / rate;
        (libm::sinf(w0), libm::cosf(w0))
    }

    fn set_lowpass(&mut self, cutoff: F, rate: F) {
        let (sn, cs) = Self::omega(cutoff, rate);
        let alpha = sn / (2.0 * FRAC_1_SQRT_2);
        let b1 = 1.0 - cs;
        self.set_coefficients([b1 / 2.0, b1, b1 / 2.0], [1.0 + alpha, -2.0 * cs, 1.0 - alpha]);
    }

    fn set_notch(&mut self, center: F, cutoff: F, rate: F) {
        if !(cutoff > 0.0 && cutoff < center && center < rate / 2.0) {
            self.set_identity();
            return;
        }
        let q = center * cutoff / (center * center - cutoff * cutoff);
        let (sn, cs) = Self::omega(center, rate);
        let alpha = sn / (2.0 * q);
        self.set_coefficients([1.0, -2.0 * cs, 1.0], [1.0 + alpha, -2.0 * cs, 1.0 - alpha]);
    }

    fn set_bandpass(&mut self, center: F, q: F, rate: F) {
        let (sn, cs) = Self::omega(center, rate);
        let alpha = sn / (2.0 * q);
        self.set_coefficients([alpha, 0.0, -alpha], [1.0 + alpha, -2.0 * cs, 1.0 - alpha]);
    }

    fn update(&mut self, x: F) -> F {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

impl Filter {
    /// Pass-through stage.
    pub const fn none() -> Self {
        Self {
            rate: 0.0,
            kind: Kind::None,
        }
    }

    pub fn new(config: FilterConfig, rate_hz: u32) -> Self {
        match config {
            FilterConfig::None => Self::none(),
            FilterConfig::Pt1 { cutoff } => Self::pt1(cutoff as F, rate_hz),
            FilterConfig::Biquad { cutoff } => Self::lowpass(cutoff as F, rate_hz),
            FilterConfig::Notch { freq, cutoff } => Self::notch(freq as F, cutoff as F, rate_hz),
        }
    }

    /// First order RC low-pass.
    pub fn pt1(cutoff: F, rate_hz: u32) -> Self {
        let rate = rate_hz as F;
        if cutoff <= 0.0 || rate <= 0.0 {
            return Self::none();
        }
        let rc = 1.0 / (2.0 * PI * cutoff);
        let dt = 1.0 / rate;
        Self {
            rate,
            kind: Kind::Pt1 {
                k: dt / (rc + dt),
                y: 0.0,
            },
        }
    }

    /// Second order Butterworth low-pass.
    pub fn lowpass(cutoff: F, rate_hz: u32) -> Self {
        let rate = rate_hz as F;
        if cutoff <= 0.0 || cutoff >= rate / 2.0 {
            return Self::none();
        }
        let mut biquad = Biquad::IDENTITY;
        biquad.set_lowpass(cutoff, rate);
        Self {
            rate,
            kind: Kind::Biquad(biquad),
        }
    }

    /// Notch at `center`, with `cutoff` as the lower edge of the stop band.
    ///
    /// Out of range parameters give an identity stage that can still be
    /// retuned later.
    pub fn notch(center: F, cutoff: F, rate_hz: u32) -> Self {
        let rate = rate_hz as F;
        let mut biquad = Biquad::IDENTITY;
        biquad.set_notch(center, cutoff, rate);
        Self {
            rate,
            kind: Kind::Biquad(biquad),
        }
    }

    /// Constant peak gain band-pass.
    pub fn bandpass(center: F, q: F, rate_hz: u32) -> Self {
        let rate = rate_hz as F;
        if center <= 0.0 || center >= rate / 2.0 || q <= 0.0 {
            return Self::none();
        }
        let mut biquad = Biquad::IDENTITY;
        biquad.set_bandpass(center, q, rate);
        Self {
            rate,
            kind: Kind::Biquad(biquad),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, Kind::None)
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::none()
    }
}

impl SampleFilter for Filter {
    fn update(&mut self, sample: F) -> F {
        match &mut self.kind {
            Kind::None => sample,
            Kind::Pt1 { k, y } => {
                *y += *k * (sample - *y);
                *y
            }
            Kind::Biquad(biquad) => biquad.update(sample),
        }
    }
}

/// Only biquad stages are retuned. Pass-through and PT1 stages ignore
/// `reconfigure`, so a dynamic notch has to start out as [`Filter::notch`].
impl TunableNotch for Filter {
    fn reconfigure(&mut self, center_hz: F, cutoff_hz: F) {
        if let Kind::Biquad(biquad) = &mut self.kind {
            biquad.set_notch(center_hz, cutoff_hz, self.rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    /// RMS of the filter output for a sine input, after a settling period.
    fn sine_rms(filter: &mut impl SampleFilter, freq: F) -> F {
        let mut sum = 0.0;
        let mut n = 0;
        for i in 0..4000 {
            let t = i as F / RATE as F;
            let y = filter.update(libm::sinf(2.0 * PI * freq * t));
            if i >= 2000 {
                sum += y * y;
                n += 1;
            }
        }
        libm::sqrtf(sum / n as F)
    }

    const SINE_RMS: F = FRAC_1_SQRT_2;

    #[test]
    fn none_passes_through() {
        let mut filter = Filter::new(FilterConfig::None, RATE);
        assert!(filter.is_none());
        for x in [0.0, 1.5, -3.25, 1e6] {
            assert_eq!(filter.update(x), x);
        }
    }

    #[test]
    fn pt1_converges_to_step() {
        let mut filter = Filter::new(FilterConfig::Pt1 { cutoff: 50 }, RATE);
        let first = filter.update(1.0);
        assert!(first > 0.0 && first < 1.0);
        let mut y = first;
        for _ in 0..200 {
            y = filter.update(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "{y}");
    }

    #[test]
    fn pt1_with_zero_cutoff_is_none() {
        assert!(Filter::pt1(0.0, RATE).is_none());
    }

    #[test]
    fn biquad_lowpass_separates_bands() {
        let pass = sine_rms(&mut Filter::new(FilterConfig::Biquad { cutoff: 100 }, RATE), 10.0);
        let stop = sine_rms(&mut Filter::new(FilterConfig::Biquad { cutoff: 100 }, RATE), 400.0);
        assert!((pass - SINE_RMS).abs() < 0.02, "{pass}");
        assert!(stop < 0.05 * SINE_RMS, "{stop}");
    }

    #[test]
    fn lowpass_above_nyquist_is_none() {
        assert!(Filter::lowpass(600.0, RATE).is_none());
    }

    #[test]
    fn notch_removes_center_frequency() {
        let config = FilterConfig::Notch {
            freq: 200,
            cutoff: 150,
        };
        let center = sine_rms(&mut Filter::new(config, RATE), 200.0);
        let outside = sine_rms(&mut Filter::new(config, RATE), 20.0);
        assert!(center < 0.01, "{center}");
        assert!((outside - SINE_RMS).abs() < 0.05, "{outside}");
    }

    #[test]
    fn invalid_notch_is_identity() {
        for (center, cutoff) in [(0.0, 0.0), (100.0, 100.0), (100.0, 150.0), (600.0, 300.0)] {
            let mut filter = Filter::notch(center, cutoff, RATE);
            for x in [0.25, -1.0, 3.0] {
                assert_eq!(filter.update(x), x);
            }
        }
    }

    #[test]
    fn retuned_notch_follows_new_center() {
        let mut filter = Filter::notch(100.0, 80.0, RATE);
        filter.reconfigure(300.0, 240.0);
        let center = sine_rms(&mut filter, 300.0);
        assert!(center < 0.01, "{center}");
    }

    #[test]
    fn retune_keeps_history() {
        let mut retuned = Filter::notch(100.0, 80.0, RATE);
        let mut untouched = Filter::notch(100.0, 80.0, RATE);
        for i in 0..50 {
            let x = (i % 7) as F;
            assert_eq!(retuned.update(x), untouched.update(x));
        }
        retuned.reconfigure(100.0, 80.0);
        for i in 0..50 {
            let x = (i % 5) as F;
            assert_eq!(retuned.update(x), untouched.update(x));
        }
    }

    #[test]
    fn only_biquads_are_retuned() {
        let mut retuned = Filter::pt1(50.0, RATE);
        let mut untouched = Filter::pt1(50.0, RATE);
        retuned.reconfigure(200.0, 150.0);
        assert_eq!(retuned, untouched);
        for i in 0..20 {
            let x = (i % 3) as F;
            assert_eq!(retuned.update(x), untouched.update(x));
        }

        let mut none = Filter::none();
        none.reconfigure(200.0, 150.0);
        assert!(none.is_none());
        assert_eq!(none.update(0.5), 0.5);

        // an out of range notch is still a biquad and can be moved into range
        let mut notch = Filter::notch(0.0, 0.0, RATE);
        notch.reconfigure(200.0, 150.0);
        assert!(sine_rms(&mut notch, 200.0) < 0.01);
    }

    #[test]
    fn bandpass_peaks_at_center() {
        let center = sine_rms(&mut Filter::bandpass(100.0, 1.0, RATE), 100.0);
        let low = sine_rms(&mut Filter::bandpass(100.0, 1.0, RATE), 5.0);
        assert!((center - SINE_RMS).abs() < 0.02, "{center}");
        assert!(low < 0.2 * SINE_RMS, "{low}");
    }
}
