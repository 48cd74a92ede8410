//! Light entities: validation, main/aux linkage, PWM steps and storage pins
//!
//! - **role**: the closed role enum decided from the `aux` marker
//! - **validate**: per-light field rules
//! - **linkage**: composition of validated lights into linked groups
//! - **pwm**: output frequency to PWM step conversion
//! - **address**: forced persistent address/hash checks

pub mod address;
pub mod linkage;
pub mod pwm;
pub mod role;
pub mod validate;

use serde::Serialize;

use crate::config::{EntityBase, LightBehavior};
use crate::registry::{Handle, Identified};

pub use address::{ReservedSlot, check_forced_addresses};
pub use linkage::{LinkedLight, RegistrationEvent, compose_lights};
pub use pwm::PwmSteps;
pub use role::{AuxSlot, LightRole};
pub use validate::validate_light;

/// The five PWM outputs of a main light
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSet {
    pub red: String,
    pub green: String,
    pub blue: String,
    pub cold_white: String,
    pub warm_white: String,
}

/// Cold/warm white points, in mireds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorTemperature {
    pub cold: f64,
    pub warm: f64,
}

/// Persistent storage pin of a light
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoragePin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_addr: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_hash: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_addr: Option<String>,
}

/// A validated light. The role is fixed at validation time.
#[derive(Debug, Clone)]
pub struct LightConfig {
    pub id: String,
    pub(crate) role: LightRole,
    pub entity: EntityBase,
    pub behavior: LightBehavior,
    /// Present exactly when the role is `Main`
    pub channels: Option<ChannelSet>,
    pub color_temperature: Option<ColorTemperature>,
    pub storage: StoragePin,
    pub main_light_ref: Option<String>,
    pub cold_rgb_ref: Option<String>,
    pub warm_rgb_ref: Option<String>,
}

impl LightConfig {
    pub fn role(&self) -> LightRole {
        self.role
    }
}

impl Identified for LightConfig {
    const KIND: &'static str = "light";

    fn id(&self) -> &str {
        &self.id
    }
}

pub type LightHandle = Handle<LightConfig>;
