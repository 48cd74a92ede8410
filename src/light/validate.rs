//! Per-light validation: role inference plus the field rules of each role

use crate::config::LightEntry;
use crate::error::{ConfigError, ConfigResult};

use super::{ChannelSet, ColorTemperature, LightConfig, LightRole, StoragePin};

/// Validate one raw entry into a role-tagged `LightConfig`
///
/// The first violated rule is reported; there is no partial result.
pub fn validate_light(entry: LightEntry) -> ConfigResult<LightConfig> {
    if let Some(field) = entry.unknown.keys().next() {
        return Err(ConfigError::UnknownField {
            light: entry.id.clone(),
            field: field.clone(),
        });
    }

    let role = LightRole::from_marker(entry.aux.as_ref(), &entry.id);

    let color_temperature = validate_color_temperature(&entry)?;

    let channels = match role {
        LightRole::Main => {
            if entry.main_light.is_some() {
                return Err(ConfigError::IllegalField {
                    light: entry.id.clone(),
                    field: "main_light",
                    role,
                });
            }
            Some(require_channels(&entry)?)
        }
        LightRole::AuxWarm | LightRole::AuxCold | LightRole::AuxGeneric => {
            reject_main_only_fields(&entry, role)?;
            if role.aux_slot().is_some() && entry.main_light.is_none() {
                return Err(ConfigError::MissingMainLight {
                    light: entry.id.clone(),
                    role,
                });
            }
            if role == LightRole::AuxGeneric && entry.main_light.is_some() {
                return Err(ConfigError::AmbiguousAuxRole { light: entry.id.clone() });
            }
            None
        }
    };

    Ok(LightConfig {
        role,
        channels,
        color_temperature,
        storage: StoragePin {
            forced_addr: entry.forced_addr,
            forced_hash: entry.forced_hash,
            global_addr: entry.global_addr,
        },
        main_light_ref: entry.main_light,
        cold_rgb_ref: entry.cold_rgb,
        warm_rgb_ref: entry.warm_rgb,
        entity: entry.entity,
        behavior: entry.behavior,
        id: entry.id,
    })
}

/// Both temperatures or neither; cold must be the lower mired value
fn validate_color_temperature(entry: &LightEntry) -> ConfigResult<Option<ColorTemperature>> {
    match (entry.cold_white_color_temperature, entry.warm_white_color_temperature) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::IncompleteColorTemperature {
            light: entry.id.clone(),
            missing: "warm_white_color_temperature",
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteColorTemperature {
            light: entry.id.clone(),
            missing: "cold_white_color_temperature",
        }),
        (Some(cold), Some(warm)) if cold >= warm => Err(ConfigError::InvalidColorTemperatureOrdering {
            light: entry.id.clone(),
            cold,
            warm,
        }),
        (Some(cold), Some(warm)) => Ok(Some(ColorTemperature { cold, warm })),
    }
}

fn require_channels(entry: &LightEntry) -> ConfigResult<ChannelSet> {
    let require = |value: &Option<String>, channel: &'static str| {
        value.clone().ok_or_else(|| ConfigError::MissingChannel {
            light: entry.id.clone(),
            channel,
        })
    };

    let red = require(&entry.red, "red")?;
    let green = require(&entry.green, "green")?;
    let blue = require(&entry.blue, "blue")?;
    let warm_white = require(&entry.warm_white, "warm_white")?;
    let cold_white = require(&entry.cold_white, "cold_white")?;

    Ok(ChannelSet {
        red,
        green,
        blue,
        cold_white,
        warm_white,
    })
}

fn reject_main_only_fields(entry: &LightEntry, role: LightRole) -> ConfigResult<()> {
    let present = [
        ("red", entry.red.is_some()),
        ("green", entry.green.is_some()),
        ("blue", entry.blue.is_some()),
        ("warm_white", entry.warm_white.is_some()),
        ("cold_white", entry.cold_white.is_some()),
        ("warm_rgb", entry.warm_rgb.is_some()),
        ("cold_rgb", entry.cold_rgb.is_some()),
        ("cold_white_color_temperature", entry.cold_white_color_temperature.is_some()),
        ("warm_white_color_temperature", entry.warm_white_color_temperature.is_some()),
    ];

    match present.into_iter().find(|(_, is_set)| *is_set) {
        Some((field, _)) => Err(ConfigError::IllegalField {
            light: entry.id.clone(),
            field,
            role,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuxMarker;

    fn main_entry(id: &str) -> LightEntry {
        LightEntry {
            id: id.to_string(),
            red: Some("out_r".to_string()),
            green: Some("out_g".to_string()),
            blue: Some("out_b".to_string()),
            cold_white: Some("out_cw".to_string()),
            warm_white: Some("out_ww".to_string()),
            ..LightEntry::default()
        }
    }

    fn aux_entry(id: &str, marker: AuxMarker, main_light: Option<&str>) -> LightEntry {
        LightEntry {
            id: id.to_string(),
            aux: Some(marker),
            main_light: main_light.map(str::to_string),
            ..LightEntry::default()
        }
    }

    fn named(s: &str) -> AuxMarker {
        AuxMarker::Named(s.to_string())
    }

    #[test]
    fn test_valid_main_light() {
        let light = validate_light(main_entry("bulb")).unwrap();
        assert_eq!(light.role(), LightRole::Main);
        let channels = light.channels.as_ref().unwrap();
        assert_eq!(channels.red, "out_r");
        assert_eq!(channels.warm_white, "out_ww");
        assert!(light.color_temperature.is_none());
    }

    #[test]
    fn test_main_marker_variants_all_need_channels() {
        for marker in [None, Some(AuxMarker::Flag(false)), Some(named("main"))] {
            let entry = LightEntry {
                aux: marker,
                ..main_entry("bulb")
            };
            assert!(validate_light(entry).is_ok());
        }
    }

    #[test]
    fn test_main_missing_each_channel() {
        let cases: [(&'static str, fn(&mut LightEntry)); 5] = [
            ("red", |e| e.red = None),
            ("green", |e| e.green = None),
            ("blue", |e| e.blue = None),
            ("cold_white", |e| e.cold_white = None),
            ("warm_white", |e| e.warm_white = None),
        ];
        for (channel, strip) in cases {
            let mut entry = main_entry("bulb");
            strip(&mut entry);
            assert_eq!(
                validate_light(entry).unwrap_err(),
                ConfigError::MissingChannel {
                    light: "bulb".to_string(),
                    channel
                }
            );
        }
    }

    #[test]
    fn test_main_rejects_main_light_ref() {
        let entry = LightEntry {
            main_light: Some("other".to_string()),
            ..main_entry("bulb")
        };
        assert!(matches!(
            validate_light(entry).unwrap_err(),
            ConfigError::IllegalField { field: "main_light", role: LightRole::Main, .. }
        ));
    }

    #[test]
    fn test_aux_with_any_channel_fails() {
        for marker in [AuxMarker::Flag(true), named("warm"), named("cold")] {
            let entry = LightEntry {
                blue: Some("out_b".to_string()),
                ..aux_entry("aux", marker, Some("bulb"))
            };
            let err = validate_light(entry).unwrap_err();
            assert!(matches!(err, ConfigError::IllegalField { field: "blue", .. }), "{err:?}");
        }
    }

    #[test]
    fn test_aux_rejects_cross_references_and_temperatures() {
        let entry = LightEntry {
            cold_rgb: Some("x".to_string()),
            ..aux_entry("aux", AuxMarker::Flag(true), None)
        };
        assert!(matches!(
            validate_light(entry).unwrap_err(),
            ConfigError::IllegalField { field: "cold_rgb", role: LightRole::AuxGeneric, .. }
        ));

        let entry = LightEntry {
            cold_white_color_temperature: Some(153.0),
            warm_white_color_temperature: Some(370.0),
            ..aux_entry("aux", named("warm"), Some("bulb"))
        };
        assert!(matches!(
            validate_light(entry).unwrap_err(),
            ConfigError::IllegalField { field: "cold_white_color_temperature", role: LightRole::AuxWarm, .. }
        ));
    }

    #[test]
    fn test_warm_cold_need_main_light() {
        for (marker, role) in [(named("warm"), LightRole::AuxWarm), (named("cold"), LightRole::AuxCold)] {
            let err = validate_light(aux_entry("aux", marker, None)).unwrap_err();
            assert_eq!(
                err,
                ConfigError::MissingMainLight {
                    light: "aux".to_string(),
                    role
                }
            );
        }
    }

    #[test]
    fn test_generic_aux_with_main_light_is_ambiguous() {
        let err = validate_light(aux_entry("aux", AuxMarker::Flag(true), Some("bulb"))).unwrap_err();
        assert_eq!(err, ConfigError::AmbiguousAuxRole { light: "aux".to_string() });
    }

    #[test]
    fn test_valid_aux_lights() {
        let light = validate_light(aux_entry("aux_w", named("warm"), Some("bulb"))).unwrap();
        assert_eq!(light.role(), LightRole::AuxWarm);
        assert_eq!(light.main_light_ref.as_deref(), Some("bulb"));
        assert!(light.channels.is_none());

        let light = validate_light(aux_entry("aux", AuxMarker::Flag(true), None)).unwrap();
        assert_eq!(light.role(), LightRole::AuxGeneric);
    }

    #[test]
    fn test_color_temperature_ordering() {
        let with_temps = |cold: f64, warm: f64| LightEntry {
            cold_white_color_temperature: Some(cold),
            warm_white_color_temperature: Some(warm),
            ..main_entry("bulb")
        };

        let light = validate_light(with_temps(153.0, 370.0)).unwrap();
        assert_eq!(light.color_temperature, Some(ColorTemperature { cold: 153.0, warm: 370.0 }));

        assert!(matches!(
            validate_light(with_temps(370.0, 153.0)).unwrap_err(),
            ConfigError::InvalidColorTemperatureOrdering { .. }
        ));
        // Equal is not colder
        assert!(matches!(
            validate_light(with_temps(250.0, 250.0)).unwrap_err(),
            ConfigError::InvalidColorTemperatureOrdering { .. }
        ));
    }

    #[test]
    fn test_single_color_temperature_fails() {
        let entry = LightEntry {
            cold_white_color_temperature: Some(153.0),
            ..main_entry("bulb")
        };
        assert_eq!(
            validate_light(entry).unwrap_err(),
            ConfigError::IncompleteColorTemperature {
                light: "bulb".to_string(),
                missing: "warm_white_color_temperature"
            }
        );

        let entry = LightEntry {
            warm_white_color_temperature: Some(370.0),
            ..main_entry("bulb")
        };
        assert!(matches!(
            validate_light(entry).unwrap_err(),
            ConfigError::IncompleteColorTemperature { missing: "cold_white_color_temperature", .. }
        ));
    }

    #[test]
    fn test_misspelled_option_is_rejected() {
        let json = r#"{ "id": "a", "aux": true, "forced_adr": 12 }"#;
        let entry: LightEntry = serde_json::from_str(json).unwrap();
        assert_eq!(
            validate_light(entry).unwrap_err(),
            ConfigError::UnknownField {
                light: "a".to_string(),
                field: "forced_adr".to_string()
            }
        );
    }

    #[test]
    fn test_flattened_options_are_not_unknown() {
        let json = r#"{ "id": "a", "aux": true, "name": "Aux", "restore_mode": "ALWAYS_ON",
                        "gamma_correct": 2.2, "default_transition_length": "2s" }"#;
        let entry: LightEntry = serde_json::from_str(json).unwrap();
        assert!(entry.unknown.is_empty());
        let light = validate_light(entry).unwrap();
        assert_eq!(light.entity.name.as_deref(), Some("Aux"));
        assert_eq!(light.behavior.default_transition_length, 2000);
    }

    #[test]
    fn test_storage_fields_carried() {
        let entry = LightEntry {
            forced_addr: Some(40),
            forced_hash: Some(0xBEEF),
            global_addr: Some("g_addr".to_string()),
            ..main_entry("bulb")
        };
        let light = validate_light(entry).unwrap();
        assert_eq!(light.storage.forced_addr, Some(40));
        assert_eq!(light.storage.forced_hash, Some(0xBEEF));
        assert_eq!(light.storage.global_addr.as_deref(), Some("g_addr"));
    }
}
