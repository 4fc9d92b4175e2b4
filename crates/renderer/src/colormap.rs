//! The "jet" colormap (blue → cyan → yellow → red).

/// Piecewise-linear control points `(position, value)` per channel.
const JET_RED: &[(f32, f32)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f32, f32)] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[(f32, f32)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// Map a value in `[0, 1]` to jet RGB components in `[0, 1]`. Values outside
/// the range are clamped; NaN maps to the low end.
pub fn jet(value: f32) -> [f32; 3] {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    [
        interpolate(JET_RED, v),
        interpolate(JET_GREEN, v),
        interpolate(JET_BLUE, v),
    ]
}

/// Jet color as 8-bit RGB.
pub fn jet_colormap(value: f32) -> [u8; 3] {
    jet(value).map(|c| (c * 255.0).round() as u8)
}

fn interpolate(points: &[(f32, f32)], v: f32) -> f32 {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if v <= x1 {
            let t = if x1 > x0 { (v - x0) / (x1 - x0) } else { 0.0 };
            return y0 + (y1 - y0) * t;
        }
    }
    points.last().map(|p| p.1).unwrap_or(0.0)
}
