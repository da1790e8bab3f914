//! SVG length parsing and conversion to pixels (96 px per inch).

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A length string that cannot be converted to pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert `{value}` to pixels: {reason}")]
pub struct UnitConversionError {
    pub value: String,
    pub reason: &'static str,
}

impl UnitConversionError {
    fn new(value: &str, reason: &'static str) -> Self {
        Self {
            value: value.trim().to_string(),
            reason,
        }
    }
}

/// Pixels per unit, CSS reference resolution.
fn pixels_per(unit: &str) -> Option<f64> {
    let factor = match unit {
        "" | "px" => 1.0,
        "in" => 96.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "mm" => 96.0 / 25.4,
        "cm" => 96.0 / 2.54,
        "m" => 96.0 / 0.0254,
        "km" => 96.0 / 0.0000254,
        "Q" => 96.0 / 101.6,
        "ft" => 96.0 * 12.0,
        "yd" => 96.0 * 36.0,
        _ => return None,
    };
    Some(factor)
}

/// Convert a length such as `12.5`, `3mm` or `1.5e2pt` to pixels.
///
/// Surrounding whitespace (including the trailing newline of a CLI answer)
/// is ignored.
pub fn to_pixels(value: &str) -> Result<f64, UnitConversionError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*([a-zA-Z]*)\s*$").unwrap()
    });

    let caps = re
        .captures(value)
        .ok_or_else(|| UnitConversionError::new(value, "not a number"))?;
    let number: f64 = caps[1]
        .parse()
        .map_err(|_| UnitConversionError::new(value, "not a number"))?;
    let factor =
        pixels_per(&caps[2]).ok_or_else(|| UnitConversionError::new(value, "unknown unit"))?;

    let pixels = number * factor;
    if !pixels.is_finite() {
        return Err(UnitConversionError::new(value, "out of range"));
    }
    Ok(pixels)
}
