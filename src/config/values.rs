//! Value parsers shared by the build document entries
//!
//! Frequencies, color temperatures and durations accept either a bare
//! number or a string with a unit suffix.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Split "125 Hz" / "6500K" into the numeric part and the lowercase unit
fn split_unit(raw: &str) -> Option<(f64, String)> {
    let raw = raw.trim();
    let idx = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(idx);
    let number = number.parse::<f64>().ok()?;
    Some((number, unit.trim().to_lowercase()))
}

/// Parse a frequency in Hz
pub fn parse_frequency(raw: &str) -> Option<f64> {
    let (value, unit) = split_unit(raw)?;
    match unit.as_str() {
        "" | "hz" => Some(value),
        "khz" => Some(value * 1_000.0),
        "mhz" => Some(value * 1_000_000.0),
        _ => None,
    }
}

/// Parse a color temperature, returning mireds
///
/// Kelvin values convert as 1,000,000 / K so that colder light has the
/// lower number.
pub fn parse_color_temperature(raw: &str) -> Option<f64> {
    let (value, unit) = split_unit(raw)?;
    match unit.as_str() {
        "" | "mired" | "mireds" => Some(value),
        "k" | "kelvin" if value > 0.0 => Some(1_000_000.0 / value),
        _ => None,
    }
}

/// Parse a duration, returning milliseconds
pub fn parse_duration_ms(raw: &str) -> Option<u32> {
    let (value, unit) = split_unit(raw)?;
    if value < 0.0 {
        return None;
    }
    let ms = match unit.as_str() {
        "" | "ms" => value,
        "s" => value * 1_000.0,
        "min" => value * 60_000.0,
        _ => return None,
    };
    Some(ms as u32)
}

pub fn deserialize_frequency<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Int(i) => Ok(Some(i as f64)),
        NumOrString::Float(f) => Ok(Some(f)),
        NumOrString::Text(s) => parse_frequency(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid frequency '{s}'"))),
    }
}

pub fn deserialize_color_temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Int(i) => Ok(Some(i as f64)),
        NumOrString::Float(f) => Ok(Some(f)),
        NumOrString::Text(s) => parse_color_temperature(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color temperature '{s}'"))),
    }
}

pub fn deserialize_duration_ms<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Int(i) => u32::try_from(i)
            .map_err(|_| serde::de::Error::custom(format!("invalid duration '{i}'"))),
        NumOrString::Float(f) if f >= 0.0 => Ok(f as u32),
        NumOrString::Float(f) => Err(serde::de::Error::custom(format!("invalid duration '{f}'"))),
        NumOrString::Text(s) => parse_duration_ms(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration '{s}'"))),
    }
}
