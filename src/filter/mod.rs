//! Color matrix filters applied to generated rasters.
//!
//! A filter is described declaratively, e.g. `{"name": "saturate", "value":
//! 0.5}` or `{"name": "colorMatrix", "matrix": [20 numbers]}`, and resolves
//! to a single [`ColorMatrix`]. Names are matched case-insensitively, so
//! `"HueRotate"` and `"hueRotate"` are the same preset.

mod matrix;
pub mod presets;

pub use matrix::ColorMatrix;

use crate::convert::InputConverter;
use crate::draw::Color;
use log::{debug, warn};
use serde_json::Value;

/// Parses a filter description.
///
/// Returns `None` for an unknown name or a `colorMatrix` without 20 numeric
/// entries. Preset arguments are optional and fall back to the preset's
/// neutral or customary value when missing or malformed.
pub fn from_config(config: &Value) -> Option<ColorMatrix> {
    let Some(name) = config.get("name").and_then(Value::as_str) else {
        warn!("Color matrix filter without a name: {}", config);
        return None;
    };

    let converter = InputConverter::new(1, 1);
    let arg = |key: &str, default: f64| converter.convert_scalar(config.get(key), default);
    let value = |default: f64| arg("value", default);

    let matrix = match name.to_ascii_lowercase().as_str() {
        "normal" => presets::normal(),
        "colormatrix" => explicit_matrix(config.get("matrix"))?,
        "saturate" => presets::saturate(value(1.0)),
        "huerotate" => presets::hue_rotate(value(0.0)),
        "luminancetoalpha" => presets::luminance_to_alpha(),
        "invert" => presets::invert(),
        "grayscale" => presets::grayscale(value(1.0)),
        "sepia" => presets::sepia(value(1.0)),
        "brightness" => presets::brightness(value(1.0)),
        "contrast" => presets::contrast(value(1.0)),
        "temperature" => presets::temperature(value(0.0)),
        "tint" => presets::tint(value(0.0)),
        "warm" => presets::warm(),
        "cool" => presets::cool(),
        "nightvision" => presets::night_vision(),
        "polaroid" => presets::polaroid(),
        "colortone" => presets::color_tone(
            arg("desaturation", 0.2),
            arg("toned", 0.15),
            converter.convert_color(config.get("lightColor"), Color::from_argb(0xFFFFE580)),
            converter.convert_color(config.get("darkColor"), Color::from_argb(0xFF338000)),
        ),
        _ => {
            warn!("Unknown color matrix filter '{}'", name);
            return None;
        }
    };

    debug!("Resolved color matrix filter '{}'", name);
    Some(matrix)
}

fn explicit_matrix(value: Option<&Value>) -> Option<ColorMatrix> {
    let items = value?.as_array()?;
    let mut values = [0.0; 20];
    if items.len() != values.len() {
        warn!("colorMatrix needs 20 entries, got {}", items.len());
        return None;
    }
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = item.as_f64().filter(|v| v.is_finite())?;
    }
    Some(ColorMatrix::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presets_resolve_by_name_and_value() {
        assert_eq!(
            from_config(&json!({"name": "Saturate", "value": 0.3})),
            Some(presets::saturate(0.3))
        );
        assert_eq!(
            from_config(&json!({"name": "hueRotate", "value": "90deg"})),
            Some(presets::hue_rotate(90f64.to_radians()))
        );
        assert_eq!(
            from_config(&json!({"name": "sepia"})),
            Some(presets::sepia(1.0))
        );
    }

    #[test]
    fn color_tone_takes_four_arguments() {
        let matrix = from_config(&json!({
            "name": "ColorTone",
            "desaturation": 0.5,
            "toned": 0.25,
            "lightColor": "white",
            "darkColor": "#000000"
        }))
        .unwrap();
        assert_eq!(
            matrix,
            presets::color_tone(0.5, 0.25, crate::draw::WHITE, crate::draw::BLACK)
        );
    }

    #[test]
    fn explicit_matrix_needs_twenty_numbers() {
        let mut entries = vec![0.0; 20];
        entries[18] = 1.0;
        let parsed = from_config(&json!({"name": "colorMatrix", "matrix": entries})).unwrap();
        assert_eq!(parsed.values()[18], 1.0);

        assert!(from_config(&json!({"name": "colorMatrix", "matrix": [1, 2, 3]})).is_none());
        assert!(from_config(&json!({"name": "colorMatrix"})).is_none());
    }

    #[test]
    fn unknown_or_missing_names_are_rejected() {
        assert!(from_config(&json!({"name": "blur"})).is_none());
        assert!(from_config(&json!({"value": 1})).is_none());
    }
}
