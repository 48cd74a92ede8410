//! Raw configuration entries as they appear in the build document
//!
//! These are parsed but not validated. Validation and linkage happen in
//! the `light` module; the network and socket sections are consumed by
//! their selectors at finalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::values::{deserialize_color_temperature, deserialize_duration_ms, deserialize_frequency};
use crate::constants;
use crate::socket::SocketImplementation;

/// A PWM output declared by the output subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Hz; unset means the output subsystem default
    #[serde(default, deserialize_with = "deserialize_frequency", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

/// A global variable a light can mirror its forced address into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalEntry {
    pub id: String,
}

/// The `aux` discriminator: a boolean or a named variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxMarker {
    Flag(bool),
    Named(String),
}

/// How a light recovers its state after boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RestoreMode {
    RestoreDefaultOff,
    RestoreDefaultOn,
    #[default]
    AlwaysOff,
    AlwaysOn,
    RestoreInvertedDefaultOff,
    RestoreInvertedDefaultOn,
    RestoreAndOff,
    RestoreAndOn,
}

impl FromStr for RestoreMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "RESTORE_DEFAULT_OFF" => Ok(RestoreMode::RestoreDefaultOff),
            "RESTORE_DEFAULT_ON" => Ok(RestoreMode::RestoreDefaultOn),
            "ALWAYS_OFF" => Ok(RestoreMode::AlwaysOff),
            "ALWAYS_ON" => Ok(RestoreMode::AlwaysOn),
            "RESTORE_INVERTED_DEFAULT_OFF" => Ok(RestoreMode::RestoreInvertedDefaultOff),
            "RESTORE_INVERTED_DEFAULT_ON" => Ok(RestoreMode::RestoreInvertedDefaultOn),
            "RESTORE_AND_OFF" => Ok(RestoreMode::RestoreAndOff),
            "RESTORE_AND_ON" => Ok(RestoreMode::RestoreAndOn),
            _ => Err(format!("unknown restore_mode '{s}'")),
        }
    }
}

impl TryFrom<String> for RestoreMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestoreMode::RestoreDefaultOff => "RESTORE_DEFAULT_OFF",
            RestoreMode::RestoreDefaultOn => "RESTORE_DEFAULT_ON",
            RestoreMode::AlwaysOff => "ALWAYS_OFF",
            RestoreMode::AlwaysOn => "ALWAYS_ON",
            RestoreMode::RestoreInvertedDefaultOff => "RESTORE_INVERTED_DEFAULT_OFF",
            RestoreMode::RestoreInvertedDefaultOn => "RESTORE_INVERTED_DEFAULT_ON",
            RestoreMode::RestoreAndOff => "RESTORE_AND_OFF",
            RestoreMode::RestoreAndOn => "RESTORE_AND_ON",
        };
        f.write_str(name)
    }
}

/// Entity fields owned by the generic entity framework, carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<String>,
}

/// Runtime behavior settings handed to the light state object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightBehavior {
    #[serde(default)]
    pub restore_mode: RestoreMode,
    #[serde(default = "default_gamma_correct")]
    pub gamma_correct: f32,
    /// Milliseconds
    #[serde(default = "default_transition_length", deserialize_with = "deserialize_duration_ms")]
    pub default_transition_length: u32,
    /// Milliseconds
    #[serde(default = "default_flash_transition_length", deserialize_with = "deserialize_duration_ms")]
    pub flash_transition_length: u32,
    #[serde(default)]
    pub constant_brightness: bool,
    #[serde(default)]
    pub color_interlock: bool,
}

fn default_gamma_correct() -> f32 {
    constants::light::DEFAULT_GAMMA_CORRECT
}

fn default_transition_length() -> u32 {
    constants::light::DEFAULT_TRANSITION_LENGTH_MS
}

fn default_flash_transition_length() -> u32 {
    constants::light::DEFAULT_FLASH_TRANSITION_LENGTH_MS
}

impl Default for LightBehavior {
    fn default() -> Self {
        Self {
            restore_mode: RestoreMode::default(),
            gamma_correct: default_gamma_correct(),
            default_transition_length: default_transition_length(),
            flash_transition_length: default_flash_transition_length(),
            constant_brightness: false,
            color_interlock: false,
        }
    }
}

/// One declared light, before role inference and validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LightEntry {
    pub id: String,
    #[serde(flatten)]
    pub entity: EntityBase,
    #[serde(flatten)]
    pub behavior: LightBehavior,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux: Option<AuxMarker>,

    // PWM channel outputs (by output id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_white: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_white: Option<String>,

    // Mireds
    #[serde(default, deserialize_with = "deserialize_color_temperature", skip_serializing_if = "Option::is_none")]
    pub cold_white_color_temperature: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_color_temperature", skip_serializing_if = "Option::is_none")]
    pub warm_white_color_temperature: Option<f64>,

    // Linkage (by light id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_rgb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_rgb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_light: Option<String>,

    // Persistent storage pinning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_addr: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_hash: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_addr: Option<String>,

    /// Keys no light field claims; rejected by validation
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

/// The `network:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSection {
    /// Explicit override of the aggregated high-performance request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_high_performance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ipv6: Option<bool>,
    #[serde(default)]
    pub min_ipv6_addr_count: u32,
}

/// The `socket:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketSection {
    /// Unset means the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<SocketImplementation>,
    /// Omit for stock behavior; false disables forced scheduler wake nudges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp8266_wake_schedule: Option<bool>,
    /// Omit for stock behavior; false disables the early-exit wake flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp8266_wake_flag: Option<bool>,
}

/// Requirements registered by some other component of the firmware
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentRequest {
    pub component: String,
    #[serde(default)]
    pub high_performance_networking: bool,
    #[serde(default)]
    pub sockets: u32,
    #[serde(default)]
    pub wake_loop_threadsafe: bool,
}
