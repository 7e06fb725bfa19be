//! Three-axis sample helpers and board alignment.

type F = f32;

pub const ZERO: [F; 3] = [0.0; 3];

pub fn to_float(raw: [i16; 3]) -> [F; 3] {
    raw.map(F::from)
}

pub fn scale(v: [F; 3], k: F) -> [F; 3] {
    v.map(|x| x * k)
}

pub fn add(a: [F; 3], b: [F; 3]) -> [F; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: [F; 3], b: [F; 3]) -> [F; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn magnitude(v: [F; 3]) -> F {
    libm::sqrtf(v.iter().map(|x| x * x).sum())
}

/// Rounds to the nearest whole number, used for the integer debug slots.
pub fn round_i16(x: F) -> i16 {
    libm::roundf(x) as i16
}

/// Mounting orientation of the gyro chip relative to the airframe.
///
/// `CwN` rotates the chip N degrees clockwise around Z, the `Flip` variants
/// additionally mount it upside down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    #[default]
    Default,
    Cw0,
    Cw90,
    Cw180,
    Cw270,
    Cw0Flip,
    Cw90Flip,
    Cw180Flip,
    Cw270Flip,
}

impl Align {
    /// Rotates a raw sample into the airframe frame, in place.
    pub fn apply(self, v: &mut [i16; 3]) {
        let [x, y, z] = *v;
        *v = match self {
            Align::Default | Align::Cw0 => [x, y, z],
            Align::Cw90 => [y, x.wrapping_neg(), z],
            Align::Cw180 => [x.wrapping_neg(), y.wrapping_neg(), z],
            Align::Cw270 => [y.wrapping_neg(), x, z],
            Align::Cw0Flip => [x.wrapping_neg(), y, z.wrapping_neg()],
            Align::Cw90Flip => [y, x, z.wrapping_neg()],
            Align::Cw180Flip => [x, y.wrapping_neg(), z.wrapping_neg()],
            Align::Cw270Flip => [y.wrapping_neg(), x.wrapping_neg(), z.wrapping_neg()],
        };
    }
}
