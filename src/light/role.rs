use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::config::AuxMarker;

/// What part a light plays in a main/aux group
///
/// Decided once from the `aux` marker; everything downstream matches on
/// the variant instead of looking at the marker again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightRole {
    /// Owns all five PWM channels
    Main,
    /// Warm-white RGB variant linked to a main light
    AuxWarm,
    /// Cold-white RGB variant linked to a main light
    AuxCold,
    /// Aux light without a declared temperature variant
    AuxGeneric,
}

impl LightRole {
    pub fn from_marker(marker: Option<&AuxMarker>, light: &str) -> Self {
        match marker {
            None | Some(AuxMarker::Flag(false)) => LightRole::Main,
            Some(AuxMarker::Flag(true)) => LightRole::AuxGeneric,
            Some(AuxMarker::Named(name)) => match name.trim().to_lowercase().as_str() {
                "main" => LightRole::Main,
                "warm" => LightRole::AuxWarm,
                "cold" => LightRole::AuxCold,
                other => {
                    warn!(light = %light, marker = %other, "Unknown aux marker, treating light as generic aux");
                    LightRole::AuxGeneric
                }
            },
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, LightRole::Main)
    }

    pub fn is_aux(&self) -> bool {
        !self.is_main()
    }

    /// The main light slot this role registers itself into
    pub fn aux_slot(&self) -> Option<AuxSlot> {
        match self {
            LightRole::AuxWarm => Some(AuxSlot::Warm),
            LightRole::AuxCold => Some(AuxSlot::Cold),
            _ => None,
        }
    }
}

impl fmt::Display for LightRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightRole::Main => "Main",
            LightRole::AuxWarm => "Aux (warm)",
            LightRole::AuxCold => "Aux (cold)",
            LightRole::AuxGeneric => "Aux",
        };
        f.write_str(name)
    }
}

/// Aux reference slot on a main light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxSlot {
    Cold,
    Warm,
}

impl AuxSlot {
    pub fn field(&self) -> &'static str {
        match self {
            AuxSlot::Cold => "cold_rgb",
            AuxSlot::Warm => "warm_rgb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> AuxMarker {
        AuxMarker::Named(s.to_string())
    }

    #[test]
    fn test_role_inference() {
        assert_eq!(LightRole::from_marker(None, "l"), LightRole::Main);
        assert_eq!(LightRole::from_marker(Some(&AuxMarker::Flag(false)), "l"), LightRole::Main);
        assert_eq!(LightRole::from_marker(Some(&named("main")), "l"), LightRole::Main);
        assert_eq!(LightRole::from_marker(Some(&named("Warm")), "l"), LightRole::AuxWarm);
        assert_eq!(LightRole::from_marker(Some(&named("COLD")), "l"), LightRole::AuxCold);
        assert_eq!(LightRole::from_marker(Some(&AuxMarker::Flag(true)), "l"), LightRole::AuxGeneric);
        assert_eq!(LightRole::from_marker(Some(&named("sideways")), "l"), LightRole::AuxGeneric);
    }

    #[test]
    fn test_aux_slots() {
        assert_eq!(LightRole::AuxWarm.aux_slot(), Some(AuxSlot::Warm));
        assert_eq!(LightRole::AuxCold.aux_slot(), Some(AuxSlot::Cold));
        assert_eq!(LightRole::AuxGeneric.aux_slot(), None);
        assert_eq!(LightRole::Main.aux_slot(), None);
        assert!(LightRole::AuxGeneric.is_aux());
    }
}
