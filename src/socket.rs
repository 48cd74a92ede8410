//! Socket backend selection
//!
//! Exactly one of three socket implementations is compiled in per build.
//! Each platform family has a default that the `socket:` section may
//! override. The two ESP8266 wake tuning toggles only make sense for the
//! raw lwIP TCP implementation on ESP8266.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::config::SocketSection;
use crate::constants::socket as consts;
use crate::context::FinalizedContext;
use crate::error::{ConfigError, ConfigResult};
use crate::platform::{PlatformFacts, PlatformFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SocketImplementation {
    LwipTcp,
    LwipSockets,
    BsdSockets,
}

impl SocketImplementation {
    pub const ALL: [SocketImplementation; 3] = [
        SocketImplementation::LwipTcp,
        SocketImplementation::LwipSockets,
        SocketImplementation::BsdSockets,
    ];

    /// Platform default when the section does not choose one
    pub fn default_for(family: PlatformFamily) -> Self {
        match family {
            PlatformFamily::Esp8266 | PlatformFamily::Rp2040 => SocketImplementation::LwipTcp,
            PlatformFamily::Esp32 | PlatformFamily::Host => SocketImplementation::BsdSockets,
            PlatformFamily::Bk72xx | PlatformFamily::Ln882x | PlatformFamily::Rtl87xx => {
                SocketImplementation::LwipSockets
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocketImplementation::LwipTcp => "lwip_tcp",
            SocketImplementation::LwipSockets => "lwip_sockets",
            SocketImplementation::BsdSockets => "bsd_sockets",
        }
    }

    pub fn define(&self) -> &'static str {
        match self {
            SocketImplementation::LwipTcp => consts::DEFINE_IMPL_LWIP_TCP,
            SocketImplementation::LwipSockets => consts::DEFINE_IMPL_LWIP_SOCKETS,
            SocketImplementation::BsdSockets => consts::DEFINE_IMPL_BSD_SOCKETS,
        }
    }

    /// Whether a select()-style readiness mechanism is available
    pub fn has_select_support(&self) -> bool {
        !matches!(self, SocketImplementation::LwipTcp)
    }

    pub fn source_file(&self) -> &'static str {
        match self {
            SocketImplementation::LwipTcp => consts::SOURCE_LWIP_TCP,
            SocketImplementation::LwipSockets => consts::SOURCE_LWIP_SOCKETS,
            SocketImplementation::BsdSockets => consts::SOURCE_BSD_SOCKETS,
        }
    }
}

impl FromStr for SocketImplementation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "_");
        SocketImplementation::ALL
            .into_iter()
            .find(|implementation| implementation.as_str() == normalized)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "socket implementation",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for SocketImplementation {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SocketImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure selection: platform default unless overridden
pub fn select_implementation(
    family: PlatformFamily,
    requested: Option<SocketImplementation>,
) -> SocketImplementation {
    requested.unwrap_or_else(|| SocketImplementation::default_for(family))
}

/// Sockets each consumer needs; informational capacity reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocketLedger {
    consumers: BTreeMap<String, u32>,
}

impl SocketLedger {
    pub fn consume(&mut self, count: u32, consumer: &str) {
        let entry = self.consumers.entry(consumer.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn count(&self, consumer: &str) -> u32 {
        self.consumers.get(consumer).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.consumers.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.consumers.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

/// Outcome of socket backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketSelection {
    pub implementation: SocketImplementation,
    pub select_support: bool,
    /// Implementation sources not compiled into this build
    pub excluded_sources: Vec<&'static str>,
}

/// Validate the ESP8266 wake tuning toggles against the selected backend
pub fn validate_section(
    section: &SocketSection,
    platform: &PlatformFacts,
    implementation: SocketImplementation,
) -> ConfigResult<()> {
    let has_toggle = section.esp8266_wake_schedule.is_some() || section.esp8266_wake_flag.is_some();
    if has_toggle {
        let option = format!("{} / {}", consts::OPTION_WAKE_SCHEDULE, consts::OPTION_WAKE_FLAG);
        if !platform.is_esp8266() {
            return Err(ConfigError::PlatformMismatch {
                option,
                reason: format!("ESP8266-only options, platform is {}", platform.family),
            });
        }
        if implementation != SocketImplementation::LwipTcp {
            return Err(ConfigError::PlatformMismatch {
                option,
                reason: format!("only apply to the lwip_tcp implementation, selected {implementation}"),
            });
        }
    }

    if section.esp8266_wake_flag == Some(false) && section.esp8266_wake_schedule == Some(true) {
        return Err(ConfigError::RedundantConfiguration {
            disabled: consts::OPTION_WAKE_FLAG,
            enabled: consts::OPTION_WAKE_SCHEDULE,
        });
    }
    Ok(())
}

/// Select the backend and emit its defines
///
/// Runs when a socket section is present or networking is configured;
/// otherwise no socket backend is part of the build.
pub fn finalize(
    section: Option<&SocketSection>,
    ctx: &mut FinalizedContext,
) -> ConfigResult<Option<SocketSelection>> {
    let default_section = SocketSection::default();
    let section = match section {
        Some(section) => section,
        None if ctx.has_networking() => &default_section,
        None => return Ok(None),
    };

    let platform = ctx.platform().clone();
    let implementation = select_implementation(platform.family, section.implementation);
    validate_section(section, &platform, implementation)?;

    let params = ctx.params_mut();
    params.add_flag(implementation.define())?;
    if implementation.has_select_support() {
        params.add_flag(consts::DEFINE_SELECT_SUPPORT)?;
    }
    if platform.is_esp8266() {
        if section.esp8266_wake_schedule == Some(false) {
            params.add_flag(consts::DEFINE_DISABLE_WAKE_SCHEDULE)?;
        }
        if section.esp8266_wake_flag == Some(false) {
            params.add_flag(consts::DEFINE_DISABLE_WAKE_FLAG)?;
        }
    }

    let excluded_sources = SocketImplementation::ALL
        .into_iter()
        .filter(|other| *other != implementation)
        .map(|other| other.source_file())
        .collect();

    info!(
        implementation = %implementation,
        platform = %platform.family,
        sockets = ctx.sockets().total(),
        wake_loop = ctx.sockets().count(consts::WAKE_LOOP_CONSUMER),
        "Selected socket implementation"
    );

    Ok(Some(SocketSelection {
        implementation,
        select_support: implementation.has_select_support(),
        excluded_sources,
    }))
}
