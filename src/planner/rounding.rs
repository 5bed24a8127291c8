use crate::planner::constants::HALF_EPSILON;

/// Round half to even at `decimals` places.
///
/// The scaled value is first snapped to 8 decimals so representation noise
/// (`0.125 * 100 = 12.500000000000002`) still counts as an exact half.
/// Anything not at a half rounds to nearest.
pub fn bankers_round(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let factor = 10_f64.powi(decimals as i32);
    let scaled = snap(value * factor);
    let floor = scaled.floor();
    let fraction = scaled - floor;

    let rounded = if (fraction - 0.5).abs() < HALF_EPSILON {
        if floor.rem_euclid(2.0) == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / factor
}

fn snap(x: f64) -> f64 {
    (x * 1e8).round() / 1e8
}
