//! Configuration errors raised while composing a build
//!
//! Every variant is fatal: a violation aborts parameter emission for the
//! whole build. Messages name the offending fields and values.

use thiserror::Error;

use crate::light::LightRole;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Main light '{light}' requires a {channel} PWM output")]
    MissingChannel { light: String, channel: &'static str },

    #[error("{role} light '{light}' must not have a {field}")]
    IllegalField {
        light: String,
        field: &'static str,
        role: LightRole,
    },

    #[error("{role} light '{light}' requires a main_light")]
    MissingMainLight { light: String, role: LightRole },

    #[error("Light '{light}': use aux: warm or aux: cold instead of aux: true when specifying main_light")]
    AmbiguousAuxRole { light: String },

    #[error(
        "Light '{light}': color temperature of the cold white channel ({cold} mireds) must be colder than that of the warm white channel ({warm} mireds)"
    )]
    InvalidColorTemperatureOrdering { light: String, cold: f64, warm: f64 },

    #[error("Light '{light}': cold_white_color_temperature and warm_white_color_temperature must be given together (missing {missing})")]
    IncompleteColorTemperature { light: String, missing: &'static str },

    #[error("Light '{light}': forced_addr is not supported on {platform}")]
    UnsupportedForcedAddressing { light: String, platform: String },

    #[error(
        "Light '{light}': start_free ({start_free}) must be above forced_addr + {reserved} ({forced_addr} + {reserved})"
    )]
    AddressConflict {
        light: String,
        forced_addr: u32,
        start_free: u32,
        reserved: u32,
    },

    #[error("Light '{light}': forced_addr requires global_addr")]
    MissingGlobalAddress { light: String },

    #[error("Lights '{first}' and '{second}' reserve overlapping persistent slots (forced_addr {first_addr} and {second_addr})")]
    OverlappingForcedAddress {
        first: String,
        first_addr: u32,
        second: String,
        second_addr: u32,
    },

    #[error("Lights '{first}' and '{second}' share forced_hash {hash}")]
    DuplicateForcedHash {
        first: String,
        second: String,
        hash: u32,
    },

    #[error("{option} is not available here: {reason}")]
    PlatformMismatch { option: String, reason: String },

    #[error("{disabled}: false with {enabled}: true is pointless; disable {enabled} too")]
    RedundantConfiguration {
        disabled: &'static str,
        enabled: &'static str,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Unknown {kind} '{id}' referenced by '{referrer}'")]
    UnknownReference {
        kind: &'static str,
        id: String,
        referrer: String,
    },

    #[error("Light '{light}': {field} points at '{target}', which is a {actual} light, not {expected}")]
    InvalidLinkTarget {
        light: String,
        field: &'static str,
        target: String,
        actual: LightRole,
        expected: &'static str,
    },

    #[error("Main light '{main}' already has a {slot} aux light ('{existing}'); '{duplicate}' cannot be linked too")]
    DuplicateLinkage {
        main: String,
        slot: &'static str,
        existing: String,
        duplicate: String,
    },

    #[error("Define {name} emitted twice with different values ({existing} vs {new})")]
    ConflictingDefine {
        name: String,
        existing: String,
        new: String,
    },

    #[error("Light '{light}': unknown option '{field}'")]
    UnknownField { light: String, field: String },

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
