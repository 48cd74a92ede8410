//! Forced persistent storage pins
//!
//! A light with `forced_addr` X owns the flash slots X..=X+11 on the
//! ESP8266. The platform's `start_free` must sit above that range, and
//! no two pinned lights may share slots or a forced hash.

use serde::Serialize;
use tracing::debug;

use crate::config::GlobalEntry;
use crate::constants::storage::RESERVED_SLOT_WIDTH;
use crate::error::{ConfigError, ConfigResult};
use crate::platform::PlatformFacts;
use crate::registry::Registry;

use super::StoragePin;

/// Slot range reserved by one pinned light
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservedSlot {
    pub light: String,
    pub first: u32,
    pub last: u32,
    pub global_addr: String,
}

impl ReservedSlot {
    fn overlaps(&self, other: &ReservedSlot) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// Check every pinned light against the platform and against each other
///
/// Returns the reserved ranges in declaration order.
pub fn check_forced_addresses<'a>(
    lights: impl IntoIterator<Item = (&'a str, &'a StoragePin)>,
    platform: &PlatformFacts,
    globals: &Registry<GlobalEntry>,
) -> ConfigResult<Vec<ReservedSlot>> {
    if let Some(start_free) = platform.start_free
        && !platform.is_esp8266()
    {
        return Err(ConfigError::PlatformMismatch {
            option: format!("start_free ({start_free})"),
            reason: format!("only ESP8266 has a persistent address map, not {}", platform.family),
        });
    }

    let mut reserved: Vec<ReservedSlot> = Vec::new();
    let mut hashes: Vec<(&str, u32)> = Vec::new();

    for (id, pin) in lights {
        if let Some(hash) = pin.forced_hash {
            if let Some((first, _)) = hashes.iter().find(|(_, h)| *h == hash) {
                return Err(ConfigError::DuplicateForcedHash {
                    first: first.to_string(),
                    second: id.to_string(),
                    hash,
                });
            }
            hashes.push((id, hash));
        }

        let Some(forced_addr) = pin.forced_addr else {
            continue;
        };
        let slot = check_pin(id, forced_addr, pin, platform, globals)?;

        if let Some(previous) = reserved.iter().find(|r| r.overlaps(&slot)) {
            return Err(ConfigError::OverlappingForcedAddress {
                first: previous.light.clone(),
                first_addr: previous.first,
                second: slot.light,
                second_addr: slot.first,
            });
        }
        debug!(light = %id, first = slot.first, last = slot.last, "Reserved persistent slots");
        reserved.push(slot);
    }

    Ok(reserved)
}

fn check_pin(
    id: &str,
    forced_addr: u32,
    pin: &StoragePin,
    platform: &PlatformFacts,
    globals: &Registry<GlobalEntry>,
) -> ConfigResult<ReservedSlot> {
    if !platform.family.supports_forced_addressing() {
        return Err(ConfigError::UnsupportedForcedAddressing {
            light: id.to_string(),
            platform: platform.family.to_string(),
        });
    }

    let Some(global_addr) = pin.global_addr.as_deref() else {
        return Err(ConfigError::MissingGlobalAddress { light: id.to_string() });
    };
    if !globals.is_empty() {
        globals.resolve(global_addr, id)?;
    }

    let last = forced_addr.saturating_add(RESERVED_SLOT_WIDTH);
    if let Some(start_free) = platform.start_free
        && start_free <= last
    {
        return Err(ConfigError::AddressConflict {
            light: id.to_string(),
            forced_addr,
            start_free,
            reserved: RESERVED_SLOT_WIDTH,
        });
    }

    Ok(ReservedSlot {
        light: id.to_string(),
        first: forced_addr,
        last,
        global_addr: global_addr.to_string(),
    })
}
