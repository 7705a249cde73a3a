/// Decimal precision reduction
/// Rounds half away from zero at a fixed number of decimal places.
/// The round trip error bound of every encoded field follows from this.

/// Decimal places kept for latitude/longitude deltas (~0.11 m).
pub const COORDINATE_DECIMALS: u32 = 6;
/// Decimal places kept for acceleration components and confidence.
pub const ACCELERATION_DECIMALS: u32 = 2;
pub const CONFIDENCE_DECIMALS: u32 = 2;
/// Decimal places kept for rotation components (degrees).
pub const ROTATION_DECIMALS: u32 = 1;

/// Round `value` to `decimals` places, ties away from zero.
///
/// Non-finite input is returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    // f64::round already breaks ties away from zero
    scaled.round() / factor
}

/// Largest absolute error introduced by [`round_to`] at `decimals` places.
pub fn max_error(decimals: u32) -> f64 {
    0.5 / 10f64.powi(decimals as i32)
}
