use std::f64::consts::TAU;

/// Linear interpolation, unclamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Inverse of [`lerp`]; returns `0` for an empty range.
pub fn inverse_lerp(a: f64, b: f64, v: f64) -> f64 {
    if (b - a).abs() <= f64::EPSILON {
        0.0
    } else {
        (v - a) / (b - a)
    }
}

/// Map `v` from `[a0,a1]` into `[0,1]`, clamped.
pub fn remap_clamped(v: f64, a0: f64, a1: f64) -> f64 {
    inverse_lerp(a0, a1, v).clamp(0.0, 1.0)
}

/// Wrap an angle into `[0, TAU)`.
pub fn wrap_angle(rad: f64) -> f64 {
    let w = rad.rem_euclid(TAU);
    if w >= TAU { 0.0 } else { w }
}

/// Uppercase initials of the first two words of `name`, used for placeholder artwork.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
