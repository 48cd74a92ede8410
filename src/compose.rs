//! Build composition pipeline
//!
//! Registration, validation, linkage and component requests run against
//! a [`BuildContext`]; the context is then finalized and the address,
//! network and socket selectors read the frozen request state.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{BuildDocument, ComponentRequest};
use crate::context::BuildContext;
use crate::error::{ConfigError, ConfigResult};
use crate::light::{self, LinkedLight, RegistrationEvent, ReservedSlot};
use crate::network::{self, NetworkDecision};
use crate::params::ParameterSink;
use crate::platform::PlatformFamily;
use crate::registry::{Identified, Registry};
use crate::socket::{self, SocketLedger, SocketSelection};

/// Everything emitted for one build
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub platform: PlatformFamily,
    pub lights: Vec<LinkedLight>,
    pub registration_order: Vec<RegistrationEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reserved_slots: Vec<ReservedSlot>,
    #[serde(flatten)]
    pub params: ParameterSink,
    pub sockets: SocketLedger,
    pub socket_total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<SocketSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDecision>,
}

/// Ids are unique across every entity kind of the document
#[derive(Default)]
struct IdScope {
    seen: HashSet<String>,
}

impl IdScope {
    fn register<T: Identified>(&mut self, registry: &mut Registry<T>, item: T) -> ConfigResult<()> {
        if !self.seen.insert(item.id().to_string()) {
            return Err(ConfigError::DuplicateId {
                kind: T::KIND,
                id: item.id().to_string(),
            });
        }
        registry.insert(item)?;
        Ok(())
    }
}

fn apply_request(request: &ComponentRequest, ctx: &mut BuildContext) {
    debug!(component = %request.component, "Applying component request");
    if request.high_performance_networking {
        ctx.require_high_performance_networking(&request.component);
    }
    if request.sockets > 0 {
        ctx.consume_sockets(request.sockets, &request.component);
    }
    if request.wake_loop_threadsafe {
        ctx.require_wake_loop_threadsafe();
    }
}

/// Run the whole build; the first violation aborts it
pub fn compose(document: BuildDocument) -> ConfigResult<BuildReport> {
    let has_networking = document.has_networking();
    let BuildDocument {
        platform,
        outputs: output_entries,
        globals: global_entries,
        lights: light_entries,
        network: network_section,
        socket: socket_section,
        requests,
    } = document;

    let mut ids = IdScope::default();
    let mut outputs = Registry::new();
    for entry in output_entries {
        ids.register(&mut outputs, entry)?;
    }
    let mut globals = Registry::new();
    for entry in global_entries {
        ids.register(&mut globals, entry)?;
    }
    let mut lights = Registry::new();
    for entry in light_entries {
        let light = light::validate_light(entry)?;
        ids.register(&mut lights, light)?;
    }

    let family = platform.family;
    let mut ctx = BuildContext::new(platform, has_networking);

    let composed = light::compose_lights(&lights, &outputs, &mut ctx)?;
    for request in &requests {
        apply_request(request, &mut ctx);
    }
    for (consumer, count) in ctx.sockets().iter() {
        debug!(consumer = %consumer, sockets = count, "Socket consumer");
    }
    debug!(
        has_aux = ctx.has_aux(),
        high_performance = ctx.has_high_performance_networking(),
        sockets = ctx.sockets().total(),
        "Composition finished"
    );

    let reserved_slots = light::check_forced_addresses(
        composed.lights.iter().map(|l| (l.id.as_str(), &l.storage)),
        ctx.platform(),
        &globals,
    )?;

    let mut finalized = ctx.finalize()?;
    let network = network::finalize(network_section.as_ref(), &mut finalized)?;
    let socket = socket::finalize(socket_section.as_ref(), &mut finalized)?;
    let (sockets, params) = finalized.into_parts();

    info!(
        platform = %family,
        lights = lights.len(),
        defines = params.defines.len(),
        sdkconfig = params.sdkconfig.len(),
        "Build composed"
    );

    Ok(BuildReport {
        platform: family,
        lights: composed.lights,
        registration_order: composed.events,
        reserved_slots,
        socket_total: sockets.total(),
        sockets,
        params,
        socket,
        network,
    })
}
