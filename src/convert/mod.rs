//! Total conversion of declarative JSON fields into drawing primitives.
//!
//! Every conversion takes a possibly absent value plus the default to use
//! when that value is missing or malformed, and always returns a concrete
//! value. Bad host input therefore degrades to harmless default geometry.
//!
//! Values may be given bare or wrapped in a single-key object named after
//! their kind, e.g. `{"scalar": 1.5}` or `{"path": [...]}`.

use crate::draw::{Color, ShapePath, name_to_color};
use log::{debug, warn};
use serde_json::Value;

/// Converts declarative inputs relative to a target raster size.
///
/// Distances may be expressed as percentages of the raster dimensions, so
/// the converter needs the width and height of the surface being generated.
#[derive(Debug, Clone, Copy)]
pub struct InputConverter {
    width: f64,
    height: f64,
}

impl InputConverter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    /// Converts a distance, or returns `default`.
    ///
    /// Accepted forms:
    /// - a number, taken as pixels
    /// - a numeric string, taken as pixels
    /// - `"<n>w"`, `"<n>h"`, `"<n>min"`, `"<n>max"`: `n` percent of the width,
    ///   height, smaller or larger dimension
    pub fn convert_distance(&self, value: Option<&Value>, default: f64) -> f64 {
        value
            .map(|v| unwrap_tagged(v, "distance"))
            .and_then(|v| self.distance(v))
            .unwrap_or(default)
    }

    /// Converts a scalar, or returns `default`.
    ///
    /// Numbers and numeric strings are taken as-is; strings ending in `deg`
    /// are converted from degrees to radians.
    pub fn convert_scalar(&self, value: Option<&Value>, default: f64) -> f64 {
        value
            .map(|v| unwrap_tagged(v, "scalar"))
            .and_then(scalar)
            .unwrap_or(default)
    }

    /// Converts a color, or returns `default`.
    ///
    /// Accepted forms: a packed `0xAARRGGBB` integer (negative values are read
    /// as signed 32-bit), `"#rgb"`, `"#rrggbb"`, `"#rrggbbaa"`, a color name,
    /// or an `[r, g, b]` / `[r, g, b, a]` array of 0-255 components.
    pub fn convert_color(&self, value: Option<&Value>, default: Color) -> Color {
        let Some(value) = value.map(|v| unwrap_tagged(v, "color")) else {
            return default;
        };
        color(value).unwrap_or_else(|| {
            if !value.is_null() {
                warn!("Unrecognized color {}, using default", value);
            }
            default
        })
    }

    /// Converts a path, or returns `default` when the value is not a command list.
    ///
    /// The list holds either command objects (`{"moveTo": [x, y]}`,
    /// `{"lineTo": [x, y]}`, `{"quadTo": [x1, y1, x, y]}`,
    /// `{"cubicTo": [x1, y1, x2, y2, x, y]}`, `{"closePath": null}`) or bare
    /// `[x, y]` points, where the first point moves and the rest draw lines.
    /// Coordinates are distances; malformed commands are skipped.
    pub fn convert_path(&self, value: Option<&Value>, default: ShapePath) -> ShapePath {
        let Some(Value::Array(items)) = value.map(|v| unwrap_tagged(v, "path")) else {
            return default;
        };

        let mut path = ShapePath::new();
        for (index, item) in items.iter().enumerate() {
            if !self.push_command(&mut path, item) {
                debug!("Skipping malformed path command #{}: {}", index, item);
            }
        }
        path
    }

    fn push_command(&self, path: &mut ShapePath, item: &Value) -> bool {
        match item {
            Value::Array(_) => match self.coordinates(item, 2).as_deref() {
                Some([x, y]) => {
                    if path.is_empty() {
                        path.move_to(*x, *y);
                    } else {
                        path.line_to(*x, *y);
                    }
                    true
                }
                _ => false,
            },
            Value::Object(map) if map.len() == 1 => {
                let Some((name, args)) = map.iter().next() else {
                    return false;
                };
                match name.as_str() {
                    "moveTo" => match self.coordinates(args, 2).as_deref() {
                        Some([x, y]) => {
                            path.move_to(*x, *y);
                            true
                        }
                        _ => false,
                    },
                    "lineTo" => match self.coordinates(args, 2).as_deref() {
                        Some([x, y]) => {
                            path.line_to(*x, *y);
                            true
                        }
                        _ => false,
                    },
                    "quadTo" => match self.coordinates(args, 4).as_deref() {
                        Some([x1, y1, x, y]) => {
                            path.quad_to(*x1, *y1, *x, *y);
                            true
                        }
                        _ => false,
                    },
                    "cubicTo" => match self.coordinates(args, 6).as_deref() {
                        Some([x1, y1, x2, y2, x, y]) => {
                            path.cubic_to(*x1, *y1, *x2, *y2, *x, *y);
                            true
                        }
                        _ => false,
                    },
                    "closePath" => {
                        path.close();
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Reads exactly `count` distances from a flat array, or from an array of
    /// `[x, y]` pairs.
    fn coordinates(&self, args: &Value, count: usize) -> Option<Vec<f64>> {
        let Value::Array(items) = args else {
            return None;
        };

        let mut values = Vec::with_capacity(count);
        for item in items {
            match item {
                Value::Array(pair) => {
                    for inner in pair {
                        values.push(self.distance(inner)?);
                    }
                }
                other => values.push(self.distance(other)?),
            }
        }

        (values.len() == count).then_some(values)
    }

    fn distance(&self, value: &Value) -> Option<f64> {
        let pixels = match value {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => {
                let text = text.trim();
                let (number, basis) = if let Some(n) = text.strip_suffix("min") {
                    (n, Some(self.width.min(self.height)))
                } else if let Some(n) = text.strip_suffix("max") {
                    (n, Some(self.width.max(self.height)))
                } else if let Some(n) = text.strip_suffix('w') {
                    (n, Some(self.width))
                } else if let Some(n) = text.strip_suffix('h') {
                    (n, Some(self.height))
                } else {
                    (text.strip_suffix("px").unwrap_or(text), None)
                };
                let number: f64 = number.trim().parse().ok()?;
                match basis {
                    Some(basis) => number / 100.0 * basis,
                    None => number,
                }
            }
            _ => return None,
        };
        pixels.is_finite().then_some(pixels)
    }
}

/// Returns the inner value of `{"<tag>": inner}`, or the value itself.
fn unwrap_tagged<'a>(value: &'a Value, tag: &str) -> &'a Value {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(tag).unwrap_or(value),
        _ => value,
    }
}

fn scalar(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let text = text.trim();
            if let Some(degrees) = text.strip_suffix("deg") {
                degrees.trim().parse::<f64>().ok()?.to_radians()
            } else {
                text.strip_suffix("rad")
                    .unwrap_or(text)
                    .trim()
                    .parse()
                    .ok()?
            }
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn color(value: &Value) -> Option<Color> {
    match value {
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                u32::try_from(unsigned).ok().map(Color::from_argb)
            } else {
                let signed = number.as_i64()?;
                i32::try_from(signed)
                    .ok()
                    .map(|packed| Color::from_argb(packed as u32))
            }
        }
        Value::String(text) => {
            let text = text.trim();
            match text.strip_prefix('#') {
                Some(hex) => hex_color(hex),
                None => name_to_color(text),
            }
        }
        Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let mut channels = [255u8; 4];
            for (slot, item) in channels.iter_mut().zip(items) {
                *slot = u8::try_from(item.as_u64()?).ok()?;
            }
            let [r, g, b, a] = channels;
            Some(Color::from_argb(u32::from_be_bytes([a, r, g, b])))
        }
        _ => None,
    }
}

fn hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).chain("ff".chars()).collect(),
        6 => format!("{}ff", hex),
        8 => hex.to_string(),
        _ => return None,
    };
    let rgba = u32::from_str_radix(&expanded, 16).ok()?;
    Some(Color::from_argb(rgba.rotate_right(8)))
}
