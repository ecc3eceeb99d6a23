//! Named color matrices.
//!
//! Amount-based presets follow the CSS filter-effects definitions, where an
//! amount of `1` is the full effect and `0` leaves the image unchanged (for
//! `brightness` and `contrast`, `1` is unchanged).

use super::ColorMatrix;
use crate::draw::Color;

// Rec. 709 luma weights shared by the CSS definitions
const LR: f64 = 0.213;
const LG: f64 = 0.715;
const LB: f64 = 0.072;

pub fn normal() -> ColorMatrix {
    ColorMatrix::IDENTITY
}

pub fn saturate(amount: f64) -> ColorMatrix {
    let s = amount;
    ColorMatrix::new([
        LR + (1.0 - LR) * s, LG - LG * s, LB - LB * s, 0.0, 0.0, //
        LR - LR * s, LG + (1.0 - LG) * s, LB - LB * s, 0.0, 0.0, //
        LR - LR * s, LG - LG * s, LB + (1.0 - LB) * s, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

/// Rotates hue by `radians`.
pub fn hue_rotate(radians: f64) -> ColorMatrix {
    let (sin, cos) = radians.sin_cos();
    ColorMatrix::new([
        LR + cos * (1.0 - LR) - sin * LR,
        LG - cos * LG - sin * LG,
        LB - cos * LB + sin * (1.0 - LB),
        0.0,
        0.0,
        LR - cos * LR + sin * 0.143,
        LG + cos * (1.0 - LG) + sin * 0.140,
        LB - cos * LB - sin * 0.283,
        0.0,
        0.0,
        LR - cos * LR - sin * (1.0 - LR),
        LG - cos * LG + sin * LG,
        LB + cos * (1.0 - LB) + sin * LB,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        1.0,
        0.0,
    ])
}

pub fn luminance_to_alpha() -> ColorMatrix {
    ColorMatrix::new([
        0.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 0.0, 0.0, //
        0.2125, 0.7154, 0.0721, 0.0, 0.0,
    ])
}

pub fn invert() -> ColorMatrix {
    ColorMatrix::new([
        -1.0, 0.0, 0.0, 0.0, 1.0, //
        0.0, -1.0, 0.0, 0.0, 1.0, //
        0.0, 0.0, -1.0, 0.0, 1.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

pub fn grayscale(amount: f64) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    ColorMatrix::new([
        0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k, 0.0, 0.0, //
        0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k, 0.0, 0.0, //
        0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

pub fn sepia(amount: f64) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    ColorMatrix::new([
        0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k, 0.0, 0.0, //
        0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k, 0.0, 0.0, //
        0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

pub fn brightness(amount: f64) -> ColorMatrix {
    scale_rgb(amount, amount, amount, 0.0)
}

pub fn contrast(amount: f64) -> ColorMatrix {
    scale_rgb(amount, amount, amount, 0.5 * (1.0 - amount))
}

/// Positive values warm the image, negative values cool it.
pub fn temperature(amount: f64) -> ColorMatrix {
    scale_rgb(1.0 + amount, 1.0, 1.0 - amount, 0.0)
}

/// Positive values shift toward magenta, negative toward green.
pub fn tint(amount: f64) -> ColorMatrix {
    scale_rgb(1.0 + amount, 1.0, 1.0 + amount, 0.0)
}

pub fn warm() -> ColorMatrix {
    scale_rgb(1.06, 1.01, 0.93, 0.0)
}

pub fn cool() -> ColorMatrix {
    scale_rgb(0.99, 0.93, 1.08, 0.0)
}

pub fn night_vision() -> ColorMatrix {
    ColorMatrix::new([
        0.1, 0.4, 0.0, 0.0, 0.0, //
        0.3, 1.0, 0.3, 0.0, 0.0, //
        0.0, 0.4, 0.1, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

pub fn polaroid() -> ColorMatrix {
    ColorMatrix::new([
        1.438, -0.062, -0.062, 0.0, 0.0, //
        -0.122, 1.378, -0.122, 0.0, 0.0, //
        -0.016, -0.016, 1.483, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}

/// Two-tone effect: luminance drives red, `light` and `dark` feed the other
/// channels, weighted by `desaturation` and `toned`.
pub fn color_tone(desaturation: f64, toned: f64, light: Color, dark: Color) -> ColorMatrix {
    ColorMatrix::new([
        0.3, 0.59, 0.11, 0.0, 0.0, //
        light.r, light.g, light.b, desaturation, 0.0, //
        dark.r, dark.g, dark.b, toned, 0.0, //
        light.r - dark.r, light.g - dark.g, light.b - dark.b, 0.0, 0.0,
    ])
}

fn scale_rgb(r: f64, g: f64, b: f64, bias: f64) -> ColorMatrix {
    ColorMatrix::new([
        r, 0.0, 0.0, 0.0, bias, //
        0.0, g, 0.0, 0.0, bias, //
        0.0, 0.0, b, 0.0, bias, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ])
}
