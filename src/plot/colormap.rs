//! Colour maps, taken from plotters' HSL colours and built-in viridis scale.

use plotters::prelude::{Color, HSLColor, ViridisRGB};

use crate::plot::figure::Rgb;

/// Entries in the cyclic hue map.
pub const HSV_N: usize = 256;

/// Entry `index % HSV_N` of a full-saturation hue wheel.
pub fn hsv(index: usize) -> Rgb {
    HSLColor((index % HSV_N) as f64 / HSV_N as f64, 1.0, 0.5).rgb()
}

/// Viridis at `t ∈ [0, 1]`, clamped; NaN maps to white.
pub fn viridis(t: f64) -> Rgb {
    if t.is_nan() {
        return (255, 255, 255);
    }
    ViridisRGB::get_color(t.clamp(0.0, 1.0)).rgb()
}
