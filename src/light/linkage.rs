//! Main/aux light linkage
//!
//! Two shapes end in the same state:
//!
//! - a main light naming both `cold_rgb` and `warm_rgb` aux lights
//! - an aux light marked `warm` or `cold` naming its `main_light`
//!
//! A main light is wired (aux refs, PWM steps) before it is registered,
//! and every main light is registered before any aux light. An aux light
//! registers first and then attaches itself to its main light. Each main
//! slot takes exactly one aux light.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{EntityBase, LightBehavior, OutputEntry};
use crate::context::BuildContext;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::Registry;

use super::{AuxSlot, ChannelSet, ColorTemperature, LightConfig, LightHandle, LightRole, PwmSteps, StoragePin};

/// Observable composition steps, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistrationEvent {
    Wired { light: String },
    Registered { light: String },
    AuxAttached { aux: String, main: String, slot: AuxSlot },
}

/// A light after composition, with references as ids
#[derive(Debug, Clone, Serialize)]
pub struct LinkedLight {
    pub id: String,
    pub role: LightRole,
    #[serde(flatten)]
    pub entity: EntityBase,
    #[serde(flatten)]
    pub behavior: LightBehavior,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<ChannelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwm_steps: Option<PwmSteps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<ColorTemperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_light: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cold_rgb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warm_rgb: Option<String>,
    #[serde(flatten)]
    pub storage: StoragePin,
}

#[derive(Debug, Default, Clone, Copy)]
struct MainLinks {
    cold: Option<LightHandle>,
    warm: Option<LightHandle>,
}

impl MainLinks {
    fn slot_mut(&mut self, slot: AuxSlot) -> &mut Option<LightHandle> {
        match slot {
            AuxSlot::Cold => &mut self.cold,
            AuxSlot::Warm => &mut self.warm,
        }
    }
}

/// Result of composing every light
#[derive(Debug)]
pub struct ComposedLights {
    pub lights: Vec<LinkedLight>,
    pub events: Vec<RegistrationEvent>,
}

struct Composer<'a> {
    lights: &'a Registry<LightConfig>,
    links: HashMap<LightHandle, MainLinks>,
    attached_to: HashMap<LightHandle, LightHandle>,
    pwm: HashMap<LightHandle, PwmSteps>,
    events: Vec<RegistrationEvent>,
}

impl<'a> Composer<'a> {
    fn new(lights: &'a Registry<LightConfig>) -> Self {
        Self {
            lights,
            links: HashMap::new(),
            attached_to: HashMap::new(),
            pwm: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Wire a main light: declared aux refs, then PWM steps
    fn wire_main(
        &mut self,
        handle: LightHandle,
        outputs: &Registry<OutputEntry>,
        ctx: &mut BuildContext,
    ) -> ConfigResult<()> {
        let lights = self.lights;
        let light = lights.get(handle);

        match (&light.cold_rgb_ref, &light.warm_rgb_ref) {
            (Some(cold), Some(warm)) => {
                let cold = self.resolve_aux_target(light, AuxSlot::Cold, cold)?;
                let warm = self.resolve_aux_target(light, AuxSlot::Warm, warm)?;
                self.fill_slot(handle, AuxSlot::Cold, cold)?;
                self.fill_slot(handle, AuxSlot::Warm, warm)?;
                ctx.mark_has_aux();
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    light = %light.id,
                    "Main light declares only one of cold_rgb/warm_rgb, ignoring the pair"
                );
            }
            (None, None) => {}
        }

        if let Some(channels) = &light.channels {
            let steps = PwmSteps::derive(channels, outputs);
            steps.emit(ctx.params_mut())?;
            self.pwm.insert(handle, steps);
        }

        debug!(light = %light.id, "Main light wired");
        self.events.push(RegistrationEvent::Wired { light: light.id.clone() });
        Ok(())
    }

    /// Resolve a declared cold_rgb/warm_rgb target; it must be an aux light
    /// that does not claim the other slot
    fn resolve_aux_target(&self, main: &LightConfig, slot: AuxSlot, target: &str) -> ConfigResult<LightHandle> {
        let handle = self.lights.resolve(target, &main.id)?;
        let role = self.lights.get(handle).role();
        let compatible = match role.aux_slot() {
            Some(own) => own == slot,
            None => role.is_aux(),
        };
        if !compatible {
            return Err(ConfigError::InvalidLinkTarget {
                light: main.id.clone(),
                field: slot.field(),
                target: target.to_string(),
                actual: role,
                expected: match slot {
                    AuxSlot::Cold => "an aux (aux: true or aux: cold) light",
                    AuxSlot::Warm => "an aux (aux: true or aux: warm) light",
                },
            });
        }
        Ok(handle)
    }

    fn fill_slot(&mut self, main: LightHandle, slot: AuxSlot, aux: LightHandle) -> ConfigResult<()> {
        let links = self.links.entry(main).or_default();
        let current = links.slot_mut(slot);
        if let Some(existing) = *current {
            return Err(ConfigError::DuplicateLinkage {
                main: self.lights.get(main).id.clone(),
                slot: slot.field(),
                existing: self.lights.get(existing).id.clone(),
                duplicate: self.lights.get(aux).id.clone(),
            });
        }
        *current = Some(aux);
        self.attached_to.entry(aux).or_insert(main);
        Ok(())
    }

    /// Aux self-registration into its main light's slot
    fn attach_aux(&mut self, handle: LightHandle, slot: AuxSlot, ctx: &mut BuildContext) -> ConfigResult<()> {
        let lights = self.lights;
        let light = lights.get(handle);
        // Validation guarantees main_light for warm/cold roles
        let Some(main_id) = light.main_light_ref.as_deref() else {
            return Err(ConfigError::MissingMainLight {
                light: light.id.clone(),
                role: light.role(),
            });
        };

        let main = lights.resolve(main_id, &light.id)?;
        let main_role = lights.get(main).role();
        if !main_role.is_main() {
            return Err(ConfigError::InvalidLinkTarget {
                light: light.id.clone(),
                field: "main_light",
                target: main_id.to_string(),
                actual: main_role,
                expected: "a main light",
            });
        }

        self.fill_slot(main, slot, handle)?;
        ctx.mark_has_aux();

        info!(aux = %light.id, main = %main_id, slot = slot.field(), "Aux light attached");
        self.events.push(RegistrationEvent::AuxAttached {
            aux: light.id.clone(),
            main: main_id.to_string(),
            slot,
        });
        Ok(())
    }

    fn register(&mut self, handle: LightHandle) {
        self.events.push(RegistrationEvent::Registered {
            light: self.lights.get(handle).id.clone(),
        });
    }

    fn finish(self) -> ComposedLights {
        let lights = self
            .lights
            .iter()
            .map(|(handle, light)| {
                let links = self.links.get(&handle).copied().unwrap_or_default();
                let id_of = |h: Option<LightHandle>| h.map(|h| self.lights.get(h).id.clone());
                LinkedLight {
                    id: light.id.clone(),
                    role: light.role(),
                    entity: light.entity.clone(),
                    behavior: light.behavior.clone(),
                    channels: light.channels.clone(),
                    pwm_steps: self.pwm.get(&handle).copied(),
                    color_temperature: light.color_temperature,
                    main_light: id_of(self.attached_to.get(&handle).copied()),
                    cold_rgb: id_of(links.cold),
                    warm_rgb: id_of(links.warm),
                    storage: light.storage.clone(),
                }
            })
            .collect();

        ComposedLights {
            lights,
            events: self.events,
        }
    }
}

/// Link every validated light
///
/// Main lights are wired and registered first, in declaration order, so an
/// aux light only ever attaches to a fully registered main light.
pub fn compose_lights(
    lights: &Registry<LightConfig>,
    outputs: &Registry<OutputEntry>,
    ctx: &mut BuildContext,
) -> ConfigResult<ComposedLights> {
    let mut composer = Composer::new(lights);

    for (handle, light) in lights.iter().filter(|(_, l)| l.role().is_main()) {
        debug!(light = %light.id, "Composing main light");
        composer.wire_main(handle, outputs, ctx)?;
        composer.register(handle);
    }

    for (handle, light) in lights.iter().filter(|(_, l)| l.role().is_aux()) {
        composer.register(handle);
        if let Some(slot) = light.role().aux_slot() {
            composer.attach_aux(handle, slot, ctx)?;
        }
    }

    Ok(composer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuxMarker, LightEntry};
    use crate::constants;
    use crate::light::validate_light;
    use crate::params::ParamValue;
    use crate::platform::{Framework, PlatformFacts, PlatformFamily};

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

    fn aux_entry(id: &str, marker: &str, main_light: Option<&str>) -> LightEntry {
        LightEntry {
            id: id.to_string(),
            aux: Some(if marker == "true" {
                AuxMarker::Flag(true)
            } else {
                AuxMarker::Named(marker.to_string())
            }),
            main_light: main_light.map(str::to_string),
            ..LightEntry::default()
        }
    }

    fn outputs() -> Registry<OutputEntry> {
        let mut registry = Registry::new();
        for (id, frequency) in [
            ("out_r", Some(125.0)),
            ("out_g", Some(125.0)),
            ("out_b", Some(125.0)),
            ("out_cw", Some(250.0)),
            ("out_ww", None),
        ] {
            registry
                .insert(OutputEntry {
                    id: id.to_string(),
                    platform: None,
                    frequency,
                })
                .unwrap();
        }
        registry
    }

    fn context() -> BuildContext {
        BuildContext::new(PlatformFacts::new(PlatformFamily::Esp8266, Framework::Arduino), false)
    }

    fn compose(entries: Vec<LightEntry>) -> (ConfigResult<ComposedLights>, BuildContext) {
        let mut registry = Registry::new();
        for entry in entries {
            registry.insert(validate_light(entry).unwrap()).unwrap();
        }
        let mut ctx = context();
        let result = compose_lights(&registry, &outputs(), &mut ctx);
        (result, ctx)
    }

    fn find<'a>(composed: &'a ComposedLights, id: &str) -> &'a LinkedLight {
        composed.lights.iter().find(|l| l.id == id).unwrap()
    }

    #[test]
    fn test_self_registration_links_both_slots() {
        let (result, ctx) = compose(vec![
            main_entry("bulb"),
            aux_entry("bulb_warm", "warm", Some("bulb")),
            aux_entry("bulb_cold", "cold", Some("bulb")),
        ]);
        let composed = result.unwrap();

        let bulb = find(&composed, "bulb");
        assert_eq!(bulb.warm_rgb.as_deref(), Some("bulb_warm"));
        assert_eq!(bulb.cold_rgb.as_deref(), Some("bulb_cold"));
        assert_eq!(find(&composed, "bulb_warm").main_light.as_deref(), Some("bulb"));
        assert!(ctx.has_aux());
    }

    #[test]
    fn test_declarative_links_both_slots() {
        let main = LightEntry {
            cold_rgb: Some("aux_c".to_string()),
            warm_rgb: Some("aux_w".to_string()),
            ..main_entry("bulb")
        };
        let (result, ctx) = compose(vec![
            main,
            aux_entry("aux_c", "true", None),
            aux_entry("aux_w", "true", None),
        ]);
        let composed = result.unwrap();

        let bulb = find(&composed, "bulb");
        assert_eq!(bulb.cold_rgb.as_deref(), Some("aux_c"));
        assert_eq!(bulb.warm_rgb.as_deref(), Some("aux_w"));
        assert_eq!(find(&composed, "aux_w").main_light.as_deref(), Some("bulb"));
        assert!(ctx.has_aux());
    }

    #[test]
    fn test_half_declarative_pair_is_ignored() {
        let main = LightEntry {
            cold_rgb: Some("aux_c".to_string()),
            ..main_entry("bulb")
        };
        let (result, ctx) = compose(vec![main, aux_entry("aux_c", "true", None)]);
        let composed = result.unwrap();

        assert!(find(&composed, "bulb").cold_rgb.is_none());
        assert!(!ctx.has_aux());
    }

    #[test]
    fn test_no_aux_leaves_flag_clear() {
        let (result, ctx) = compose(vec![main_entry("bulb"), aux_entry("spare", "true", None)]);
        result.unwrap();
        assert!(!ctx.has_aux());
    }

    #[test]
    fn test_main_wired_before_registered_and_aux_registered_before_attach() {
        let (result, _) = compose(vec![main_entry("bulb"), aux_entry("bulb_warm", "warm", Some("bulb"))]);
        let events = result.unwrap().events;
        assert_eq!(
            events,
            vec![
                RegistrationEvent::Wired { light: "bulb".to_string() },
                RegistrationEvent::Registered { light: "bulb".to_string() },
                RegistrationEvent::Registered { light: "bulb_warm".to_string() },
                RegistrationEvent::AuxAttached {
                    aux: "bulb_warm".to_string(),
                    main: "bulb".to_string(),
                    slot: AuxSlot::Warm
                },
            ]
        );
    }

    #[test]
    fn test_aux_declared_before_its_main() {
        let (result, _) = compose(vec![aux_entry("bulb_cold", "cold", Some("bulb")), main_entry("bulb")]);
        let composed = result.unwrap();
        assert_eq!(find(&composed, "bulb").cold_rgb.as_deref(), Some("bulb_cold"));
        assert_eq!(
            composed.events,
            vec![
                RegistrationEvent::Wired { light: "bulb".to_string() },
                RegistrationEvent::Registered { light: "bulb".to_string() },
                RegistrationEvent::Registered { light: "bulb_cold".to_string() },
                RegistrationEvent::AuxAttached {
                    aux: "bulb_cold".to_string(),
                    main: "bulb".to_string(),
                    slot: AuxSlot::Cold
                },
            ]
        );
    }

    #[test]
    fn test_pwm_steps_emitted_for_main() {
        let (result, mut ctx) = compose(vec![main_entry("bulb")]);
        let composed = result.unwrap();

        let steps = find(&composed, "bulb").pwm_steps.unwrap();
        assert_eq!(steps.red, 8000);
        assert_eq!(steps.cold, 4000);
        assert_eq!(steps.warm, 1000);
        assert_eq!(
            ctx.params_mut().define(constants::pwm::DEFINE_BLUE),
            Some(&ParamValue::Int(8000))
        );
    }

    #[test]
    fn test_unknown_main_light_reference() {
        let (result, _) = compose(vec![aux_entry("aux", "warm", Some("nowhere"))]);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::UnknownReference { kind: "light", ref id, .. } if id == "nowhere"
        ));
    }

    #[test]
    fn test_main_light_must_be_main() {
        let (result, _) = compose(vec![
            aux_entry("spare", "true", None),
            aux_entry("aux", "warm", Some("spare")),
        ]);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidLinkTarget {
                field: "main_light",
                actual: LightRole::AuxGeneric,
                ..
            }
        ));
    }

    #[test]
    fn test_declared_target_must_be_aux() {
        let main = LightEntry {
            cold_rgb: Some("other".to_string()),
            warm_rgb: Some("aux_w".to_string()),
            ..main_entry("bulb")
        };
        let (result, _) = compose(vec![main, main_entry("other"), aux_entry("aux_w", "true", None)]);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidLinkTarget {
                field: "cold_rgb",
                actual: LightRole::Main,
                ..
            }
        ));
    }

    #[test]
    fn test_declared_target_with_opposite_slot() {
        let main = LightEntry {
            cold_rgb: Some("aux_w".to_string()),
            warm_rgb: Some("aux_c".to_string()),
            ..main_entry("bulb")
        };
        let (result, _) = compose(vec![
            main,
            aux_entry("aux_w", "warm", Some("bulb")),
            aux_entry("aux_c", "true", None),
        ]);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidLinkTarget {
                field: "cold_rgb",
                actual: LightRole::AuxWarm,
                ..
            }
        ));
    }

    #[test]
    fn test_two_warm_aux_lights_for_one_main() {
        let (result, _) = compose(vec![
            main_entry("bulb"),
            aux_entry("warm_a", "warm", Some("bulb")),
            aux_entry("warm_b", "warm", Some("bulb")),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateLinkage {
                main: "bulb".to_string(),
                slot: "warm_rgb",
                existing: "warm_a".to_string(),
                duplicate: "warm_b".to_string(),
            }
        );
    }

    #[test]
    fn test_declarative_and_registration_on_same_slot() {
        let main = LightEntry {
            cold_rgb: Some("aux_c".to_string()),
            warm_rgb: Some("aux_w".to_string()),
            ..main_entry("bulb")
        };
        let (result, _) = compose(vec![
            main,
            aux_entry("aux_c", "true", None),
            aux_entry("aux_w", "true", None),
            aux_entry("late_warm", "warm", Some("bulb")),
        ]);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::DuplicateLinkage { slot: "warm_rgb", ref duplicate, .. } if duplicate == "late_warm"
        ));
    }

    #[test]
    fn test_mains_with_different_steps_conflict() {
        let mut registry_outputs = outputs();
        registry_outputs
            .insert(OutputEntry {
                id: "out_r2".to_string(),
                platform: None,
                frequency: Some(500.0),
            })
            .unwrap();
        let second = LightEntry {
            red: Some("out_r2".to_string()),
            ..main_entry("bulb2")
        };

        let mut registry = Registry::new();
        registry.insert(validate_light(main_entry("bulb")).unwrap()).unwrap();
        registry.insert(validate_light(second).unwrap()).unwrap();

        let mut ctx = context();
        let err = compose_lights(&registry, &registry_outputs, &mut ctx).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingDefine { ref name, .. } if name == "KAUF_PWM_STEPS_RED"));
    }
}
