//! Application-wide constants
//!
//! This module contains the magic numbers, define names and SDK option keys
//! emitted by the composer, providing a single source of truth for them.

/// Build document location
pub mod config {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "bulb-composer";

    /// Default build document filename
    pub const FILENAME: &str = "build.json";
}

/// PWM timing derivation
pub mod pwm {
    /// Frequency assumed when an output does not declare one (Hz)
    pub const DEFAULT_FREQUENCY_HZ: f64 = 1000.0;

    /// Numerator of the step derivation (one second in microseconds)
    pub const STEPS_NUMERATOR: f64 = 1_000_000.0;

    /// Steps used when the channel's output cannot be found
    pub const FALLBACK_STEPS: u32 = 1000;

    pub const DEFINE_RED: &str = "KAUF_PWM_STEPS_RED";
    pub const DEFINE_GREEN: &str = "KAUF_PWM_STEPS_GREEN";
    pub const DEFINE_BLUE: &str = "KAUF_PWM_STEPS_BLUE";
    pub const DEFINE_COLD: &str = "KAUF_PWM_STEPS_COLD";
    pub const DEFINE_WARM: &str = "KAUF_PWM_STEPS_WARM";
}

/// Light entity defaults and defines
pub mod light {
    /// Enables aux-specific runtime code paths
    pub const DEFINE_HAS_AUX: &str = "KAUF_HAS_AUX";

    pub const DEFAULT_GAMMA_CORRECT: f32 = 2.8;
    pub const DEFAULT_TRANSITION_LENGTH_MS: u32 = 1000;
    pub const DEFAULT_FLASH_TRANSITION_LENGTH_MS: u32 = 0;
}

/// Persistent storage layout
pub mod storage {
    /// Width of the slot reserved after a forced address
    pub const RESERVED_SLOT_WIDTH: u32 = 11;
}

/// Network component defines and SDK options
pub mod network {
    pub const DEFINE_USE_NETWORK: &str = "USE_NETWORK";
    pub const DEFINE_IPV6: &str = "USE_NETWORK_IPV6";
    pub const DEFINE_MIN_IPV6_ADDR_COUNT: &str = "USE_NETWORK_MIN_IPV6_ADDR_COUNT";

    pub const LWIP_IPV6: &str = "CONFIG_LWIP_IPV6";
    pub const LWIP_IPV6_AUTOCONFIG: &str = "CONFIG_LWIP_IPV6_AUTOCONFIG";

    pub const FLAG_LWIP_IPV6: &str = "-DCONFIG_LWIP_IPV6";
    pub const FLAG_LWIP_IPV6_AUTOCONFIG: &str = "-DCONFIG_LWIP_IPV6_AUTOCONFIG";
    pub const FLAG_RP2040_IPV6: &str = "-DPIO_FRAMEWORK_ARDUINO_ENABLE_IPV6";
    pub const FLAG_ESP8266_IPV6: &str = "-DPIO_FRAMEWORK_ARDUINO_LWIP2_IPV6_LOW_MEMORY";
    pub const FLAG_BK72XX_IPV6: &str = "-DCONFIG_IPV6";
}

/// Socket component defines and sources
pub mod socket {
    pub const DEFINE_IMPL_LWIP_TCP: &str = "USE_SOCKET_IMPL_LWIP_TCP";
    pub const DEFINE_IMPL_LWIP_SOCKETS: &str = "USE_SOCKET_IMPL_LWIP_SOCKETS";
    pub const DEFINE_IMPL_BSD_SOCKETS: &str = "USE_SOCKET_IMPL_BSD_SOCKETS";
    pub const DEFINE_SELECT_SUPPORT: &str = "USE_SOCKET_SELECT_SUPPORT";
    pub const DEFINE_WAKE_LOOP_THREADSAFE: &str = "USE_WAKE_LOOP_THREADSAFE";
    pub const DEFINE_DISABLE_WAKE_SCHEDULE: &str = "KAUF_DISABLE_SOCKET_WAKE_SCHEDULE";
    pub const DEFINE_DISABLE_WAKE_FLAG: &str = "KAUF_DISABLE_SOCKET_WAKE_FLAG";

    pub const SOURCE_LWIP_TCP: &str = "lwip_raw_tcp_impl.cpp";
    pub const SOURCE_LWIP_SOCKETS: &str = "lwip_sockets_impl.cpp";
    pub const SOURCE_BSD_SOCKETS: &str = "bsd_sockets_impl.cpp";

    /// Ledger name for the shared wake notification socket
    pub const WAKE_LOOP_CONSUMER: &str = "socket.wake_loop_threadsafe";

    pub const OPTION_WAKE_SCHEDULE: &str = "esp8266_wake_schedule";
    pub const OPTION_WAKE_FLAG: &str = "esp8266_wake_flag";
}
