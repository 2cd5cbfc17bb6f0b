/////////////////////////////////////////////////////////////////////////////////////////////////
//// Slider-to-angle mapping. The UI exposes discrete range controls, one per
//// (joint, axis) pair; this is the only place their values turn into radians.

/// Lowest value a range control emits.
pub const SLIDER_MIN: i32 = 1;
/// Highest value a range control emits.
pub const SLIDER_MAX: i32 = 30;

/// Linearly map a control value in [SLIDER_MIN, SLIDER_MAX] onto [min_angle, max_angle].
///
/// Pure function. Input is constrained by the control itself, so out-of-range
/// values are not validated and simply extrapolate.
pub fn slider_to_angle(value: i32, min_angle: f64, max_angle: f64) -> f64 {
    let span = (SLIDER_MAX - SLIDER_MIN) as f64;
    min_angle + (value - SLIDER_MIN) as f64 * (max_angle - min_angle) / span
}

/////////////////////////////////////////////////////////////////////////////////////////////////
