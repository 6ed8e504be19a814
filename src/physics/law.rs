//! Closed-form Atwood-machine kinematics and unit conversion.

use crate::config::{GRAVITY, METERS_PER_PIXEL, PIXELS_PER_METER};

/// Acceleration of the hanging rider for a pulley carrying `m1` on each
/// side plus `m2` on one of them: `m2 / (2 m1 + m2) * g`.
///
/// Defined for `m1 > 0`; `m2 == 0` yields zero.
#[inline]
pub fn acceleration(m1: f32, m2: f32) -> f32 {
    (m2 / (2.0 * m1 + m2)) * GRAVITY
}

#[inline]
pub fn to_meters(px: f32) -> f32 {
    px * METERS_PER_PIXEL
}

#[inline]
pub fn to_pixels(m: f32) -> f32 {
    m * PIXELS_PER_METER
}

/// Back-compute g from final speed `v` after falling `h`:
/// `(2 m1 + m2) v^2 / (2 m2 h)`.
pub fn gravity_from_energy(m1: f32, m2: f32, h: f32, v: f32) -> f32 {
    (2.0 * m1 + m2) * v * v / (2.0 * m2 * h)
}

/// Back-compute g from height `h`, time `t` and a secondary distance
/// `big_h`: `(2 m1 + m2) H^2 / (2 m2 h t^2)`.
///
/// With `H = v t` this agrees with [`gravity_from_energy`].
pub fn gravity_from_timing(m1: f32, m2: f32, h: f32, big_h: f32, t: f32) -> f32 {
    (2.0 * m1 + m2) * big_h * big_h / (2.0 * m2 * h * t * t)
}
