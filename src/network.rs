//! Network tuning selection
//!
//! Components request high-performance networking during composition.
//! At finalization the user's `enable_high_performance` override (if any)
//! wins over the aggregated request; when enabled on ESP32 with ESP-IDF,
//! the lwIP profile is picked by whether PSRAM is guaranteed.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::config::NetworkSection;
use crate::constants::network as consts;
use crate::context::FinalizedContext;
use crate::error::{ConfigError, ConfigResult};
use crate::params::{ParamValue, ParameterSink};
use crate::platform::PlatformFamily;

/// lwIP buffer/window profile applied to the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningProfile {
    /// SDK defaults, nothing emitted
    Stock,
    /// PSRAM guaranteed: window scaling, 512KB windows, 512 mailboxes
    Aggressive,
    /// No PSRAM guarantee: 65KB windows, 64 mailboxes
    Conservative,
}

impl fmt::Display for TuningProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TuningProfile::Stock => "stock",
            TuningProfile::Aggressive => "aggressive",
            TuningProfile::Conservative => "conservative",
        };
        f.write_str(name)
    }
}

// Higher maximums are only allowed because CONFIG_LWIP_WND_SCALE is set
const AGGRESSIVE_OPTIONS: &[(&str, ParamValue)] = &[
    ("CONFIG_LWIP_WND_SCALE", ParamValue::Bool(true)),
    ("CONFIG_LWIP_TCP_RCV_SCALE", ParamValue::Int(3)),
    ("CONFIG_LWIP_TCP_SND_BUF_DEFAULT", ParamValue::Int(65534)),
    ("CONFIG_LWIP_TCP_WND_DEFAULT", ParamValue::Int(512000)),
    ("CONFIG_LWIP_TCPIP_RECVMBOX_SIZE", ParamValue::Int(512)),
    ("CONFIG_LWIP_TCP_RECVMBOX_SIZE", ParamValue::Int(512)),
    ("CONFIG_LWIP_MAX_ACTIVE_TCP", ParamValue::Int(16)),
    ("CONFIG_LWIP_MAX_LISTENING_TCP", ParamValue::Int(16)),
    ("CONFIG_LWIP_TCP_MAXRTX", ParamValue::Int(12)),
    ("CONFIG_LWIP_TCP_SYNMAXRTX", ParamValue::Int(6)),
    ("CONFIG_LWIP_TCP_MSS", ParamValue::Int(1436)),
    ("CONFIG_LWIP_TCP_MSL", ParamValue::Int(60000)),
    ("CONFIG_LWIP_TCP_OVERSIZE_MSS", ParamValue::Bool(true)),
    ("CONFIG_LWIP_TCP_QUEUE_OOSEQ", ParamValue::Bool(true)),
];

const CONSERVATIVE_OPTIONS: &[(&str, ParamValue)] = &[
    ("CONFIG_LWIP_TCP_SND_BUF_DEFAULT", ParamValue::Int(65534)),
    ("CONFIG_LWIP_TCP_WND_DEFAULT", ParamValue::Int(65534)),
    ("CONFIG_LWIP_TCP_RECVMBOX_SIZE", ParamValue::Int(64)),
    ("CONFIG_LWIP_TCPIP_RECVMBOX_SIZE", ParamValue::Int(64)),
];

impl TuningProfile {
    /// The SDK options of this profile, verbatim
    pub fn options(&self) -> &'static [(&'static str, ParamValue)] {
        match self {
            TuningProfile::Stock => &[],
            TuningProfile::Aggressive => AGGRESSIVE_OPTIONS,
            TuningProfile::Conservative => CONSERVATIVE_OPTIONS,
        }
    }
}

/// Effective enablement: the explicit override when given, else the aggregated request
pub fn high_performance_enabled(user_override: Option<bool>, component_requested: bool) -> bool {
    user_override.unwrap_or(component_requested)
}

/// Pick the profile for the effective enablement and platform capability
pub fn select_profile(enabled: bool, is_esp32: bool, using_esp_idf: bool, psram_guaranteed: bool) -> TuningProfile {
    match (enabled && is_esp32 && using_esp_idf, psram_guaranteed) {
        (false, _) => TuningProfile::Stock,
        (true, true) => TuningProfile::Aggressive,
        (true, false) => TuningProfile::Conservative,
    }
}

/// Outcome of network finalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDecision {
    pub high_performance: bool,
    pub profile: TuningProfile,
    /// Unset on families without an IPv6 stack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<bool>,
}

/// Finalize the network section: profile selection and IPv6 options
pub fn finalize(section: Option<&NetworkSection>, ctx: &mut FinalizedContext) -> ConfigResult<Option<NetworkDecision>> {
    let Some(section) = section else {
        return Ok(None);
    };
    let platform = ctx.platform().clone();

    if section.enable_high_performance.is_some() && !platform.is_esp32() {
        return Err(ConfigError::PlatformMismatch {
            option: "enable_high_performance".to_string(),
            reason: format!("only available on esp32, platform is {}", platform.family),
        });
    }
    if section.enable_ipv6 == Some(true) && !platform.family.supports_ipv6() {
        return Err(ConfigError::PlatformMismatch {
            option: "enable_ipv6".to_string(),
            reason: format!("no IPv6 support on {}", platform.family),
        });
    }

    let requested = ctx.high_performance_requested();
    if section.enable_high_performance == Some(false) && requested {
        info!("High performance networking disabled by user configuration (overriding component request)");
    }
    let enabled = high_performance_enabled(section.enable_high_performance, requested);
    let profile = select_profile(enabled, platform.is_esp32(), platform.using_esp_idf(), platform.psram_guaranteed);

    debug!(profile = %profile, high_performance = enabled, "Selected network tuning profile");

    let params = ctx.params_mut();
    params.add_flag(consts::DEFINE_USE_NETWORK)?;

    match profile {
        TuningProfile::Stock => {}
        TuningProfile::Aggressive => {
            info!("Applying high-performance lwip settings (PSRAM guaranteed): 512KB TCP windows, 512 mailbox sizes")
        }
        TuningProfile::Conservative => info!("Applying optimized lwip settings: 65KB TCP windows, 64 mailbox sizes"),
    }
    for (key, value) in profile.options() {
        params.add_sdkconfig_option(key, value.clone())?;
    }

    let ipv6 = section.enable_ipv6.or(platform.family.ipv6_default());
    if let Some(enable) = ipv6 {
        apply_ipv6(params, platform.family, platform.using_esp_idf(), enable, section.min_ipv6_addr_count)?;
    }

    Ok(Some(NetworkDecision {
        high_performance: enabled,
        profile,
        ipv6,
    }))
}

fn apply_ipv6(
    params: &mut ParameterSink,
    family: PlatformFamily,
    using_esp_idf: bool,
    enable: bool,
    min_addr_count: u32,
) -> ConfigResult<()> {
    params.add_define(consts::DEFINE_IPV6, enable)?;
    if enable {
        params.add_define(consts::DEFINE_MIN_IPV6_ADDR_COUNT, min_addr_count)?;
    }

    if family == PlatformFamily::Esp32 {
        // The Arduino core is prebuilt with IPv6 support
        let value = if using_esp_idf { enable } else { true };
        params.add_sdkconfig_option(consts::LWIP_IPV6, value)?;
        params.add_sdkconfig_option(consts::LWIP_IPV6_AUTOCONFIG, value)?;
    } else if enable {
        params.add_build_flag(consts::FLAG_LWIP_IPV6);
        params.add_build_flag(consts::FLAG_LWIP_IPV6_AUTOCONFIG);
        match family {
            PlatformFamily::Rp2040 => params.add_build_flag(consts::FLAG_RP2040_IPV6),
            PlatformFamily::Esp8266 => params.add_build_flag(consts::FLAG_ESP8266_IPV6),
            PlatformFamily::Bk72xx => params.add_build_flag(consts::FLAG_BK72XX_IPV6),
            _ => {}
        }
    }
    Ok(())
}
