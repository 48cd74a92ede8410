//! Target platform identity and capability facts

use serde::{Deserialize, Serialize};
use std::fmt;

/// MCU family the firmware is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Esp8266,
    Esp32,
    Rp2040,
    Bk72xx,
    Ln882x,
    Rtl87xx,
    Host,
}

impl PlatformFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Esp8266 => "esp8266",
            PlatformFamily::Esp32 => "esp32",
            PlatformFamily::Rp2040 => "rp2040",
            PlatformFamily::Bk72xx => "bk72xx",
            PlatformFamily::Ln882x => "ln882x",
            PlatformFamily::Rtl87xx => "rtl87xx",
            PlatformFamily::Host => "host",
        }
    }

    /// Only ESP8266 exposes a relocatable persistent-storage free boundary
    pub fn supports_forced_addressing(&self) -> bool {
        matches!(self, PlatformFamily::Esp8266)
    }

    /// IPv6 setting when the user leaves it unset; `None` means the family
    /// has no IPv6 stack to configure
    pub fn ipv6_default(&self) -> Option<bool> {
        match self {
            PlatformFamily::Ln882x | PlatformFamily::Rtl87xx => None,
            _ => Some(false),
        }
    }

    pub fn supports_ipv6(&self) -> bool {
        self.ipv6_default().is_some()
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework the firmware is compiled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    #[default]
    Arduino,
    #[serde(alias = "esp_idf", alias = "idf")]
    EspIdf,
}

/// Platform facts supplied by the platform's own configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformFacts {
    pub family: PlatformFamily,
    #[serde(default)]
    pub framework: Framework,
    /// Set by an earlier validation pass when PSRAM is known to be present
    #[serde(default)]
    pub psram_guaranteed: bool,
    /// Lowest address the automatic persistent-storage allocator may use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_free: Option<u32>,
}

impl PlatformFacts {
    pub fn new(family: PlatformFamily, framework: Framework) -> Self {
        Self {
            family,
            framework,
            psram_guaranteed: false,
            start_free: None,
        }
    }

    pub fn is_esp32(&self) -> bool {
        self.family == PlatformFamily::Esp32
    }

    pub fn is_esp8266(&self) -> bool {
        self.family == PlatformFamily::Esp8266
    }

    pub fn using_esp_idf(&self) -> bool {
        self.framework == Framework::EspIdf
    }
}
