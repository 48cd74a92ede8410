//! Emitted build parameters: preprocessor defines, SDK config options, build flags
//!
//! The sink only accepts a key twice when both values agree, so the
//! emitted set is conflict-free by construction.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Bare define with no value
    Flag,
    Bool(bool),
    Int(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Flag => f.write_str("<set>"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSink {
    pub defines: BTreeMap<String, ParamValue>,
    pub sdkconfig: BTreeMap<String, ParamValue>,
    pub build_flags: Vec<String>,
}

fn insert_checked(
    map: &mut BTreeMap<String, ParamValue>,
    name: &str,
    value: ParamValue,
) -> ConfigResult<()> {
    match map.get(name) {
        Some(existing) if *existing == value => Ok(()),
        Some(existing) => Err(ConfigError::ConflictingDefine {
            name: name.to_string(),
            existing: existing.to_string(),
            new: value.to_string(),
        }),
        None => {
            map.insert(name.to_string(), value);
            Ok(())
        }
    }
}

impl ParameterSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bare `#define NAME`
    pub fn add_flag(&mut self, name: &str) -> ConfigResult<()> {
        self.add_define(name, ParamValue::Flag)
    }

    pub fn add_define(&mut self, name: &str, value: impl Into<ParamValue>) -> ConfigResult<()> {
        let value = value.into();
        debug!(define = %name, value = %value, "add define");
        insert_checked(&mut self.defines, name, value)
    }

    pub fn add_sdkconfig_option(&mut self, key: &str, value: impl Into<ParamValue>) -> ConfigResult<()> {
        let value = value.into();
        debug!(option = %key, value = %value, "add sdkconfig option");
        insert_checked(&mut self.sdkconfig, key, value)
    }

    pub fn add_build_flag(&mut self, flag: &str) {
        if !self.build_flags.iter().any(|f| f == flag) {
            self.build_flags.push(flag.to_string());
        }
    }

    pub fn define(&self, name: &str) -> Option<&ParamValue> {
        self.defines.get(name)
    }

    pub fn sdkconfig_option(&self, key: &str) -> Option<&ParamValue> {
        self.sdkconfig.get(key)
    }
}
