use crate::color::Rgb;
use crate::color_domain::ColorDomain;

/// Color for values above the top breakpoint.
pub const OUT_OF_RANGE_HIGH: Rgb = Rgb::DARK_RED;
/// Color for values below the bottom breakpoint, and for NaN.
pub const OUT_OF_RANGE_LOW: Rgb = Rgb::GREY;

/// Fractional stop index of `value`: `i + t` when `value` lies `t` of the
/// way from breakpoint `i` to breakpoint `i + 1`. Values past the last
/// paired breakpoint but within the domain sit on the last stop.
///
/// `None` when the value is outside the domain or NaN.
pub fn scale_position(value: f64, domain: &ColorDomain) -> Option<f64> {
    let b = domain.breakpoints();
    if value.is_nan() || value < domain.min() || value > domain.max() {
        return None;
    }
    let last = b.len() - 1;
    if value >= b[last] {
        return Some(last as f64);
    }
    let i = b
        .windows(2)
        .position(|w| value <= w[1])
        .unwrap_or(b.len() - 2);
    Some(i as f64 + (value - b[i]) / (b[i + 1] - b[i]))
}

/// Piecewise-linear RGB interpolation through the domain's stops.
pub fn color_for(value: f64, domain: &ColorDomain) -> Rgb {
    if value > domain.max() {
        return OUT_OF_RANGE_HIGH;
    }
    let Some(position) = scale_position(value, domain) else {
        return OUT_OF_RANGE_LOW;
    };
    let colors = domain.colors();
    let lower = (position.floor() as usize).min(colors.len() - 1);
    let upper = (lower + 1).min(colors.len() - 1);
    colors[lower].lerp(colors[upper], position - lower as f64)
}
