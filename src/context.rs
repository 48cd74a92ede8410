//! Build context shared by every component's configuration step
//!
//! Composition runs against a [`BuildContext`]: components register
//! aggregated requests (high-performance networking, socket usage, wake
//! loop support) in any order, and each request is either additive or a
//! one-way flag flip. [`BuildContext::finalize`] consumes the context, so
//! nothing can register a request after the selectors have read them.

use tracing::{debug, info};

use crate::constants;
use crate::error::ConfigResult;
use crate::params::ParameterSink;
use crate::platform::PlatformFacts;
use crate::socket::SocketLedger;

/// Mutable state of the composition phase
#[derive(Debug)]
pub struct BuildContext {
    platform: PlatformFacts,
    has_networking: bool,
    high_performance_requested: bool,
    wake_loop_threadsafe_required: bool,
    has_aux: bool,
    sockets: SocketLedger,
    params: ParameterSink,
}

impl BuildContext {
    pub fn new(platform: PlatformFacts, has_networking: bool) -> Self {
        Self {
            platform,
            has_networking,
            high_performance_requested: false,
            wake_loop_threadsafe_required: false,
            has_aux: false,
            sockets: SocketLedger::default(),
            params: ParameterSink::new(),
        }
    }

    pub fn platform(&self) -> &PlatformFacts {
        &self.platform
    }

    /// Request the high-performance network profile; repeated requests are no-ops
    pub fn require_high_performance_networking(&mut self, component: &str) {
        if !self.high_performance_requested {
            info!(component = %component, "High performance networking requested");
            self.high_performance_requested = true;
        } else {
            debug!(component = %component, "High performance networking already requested");
        }
    }

    pub fn has_high_performance_networking(&self) -> bool {
        self.high_performance_requested
    }

    /// Add to a consumer's socket count
    pub fn consume_sockets(&mut self, count: u32, consumer: &str) {
        self.sockets.consume(count, consumer);
    }

    /// Request the shared loopback wake socket; ignored without networking
    pub fn require_wake_loop_threadsafe(&mut self) {
        if self.has_networking && !self.wake_loop_threadsafe_required {
            self.wake_loop_threadsafe_required = true;
            self.sockets.consume(1, constants::socket::WAKE_LOOP_CONSUMER);
        }
    }

    /// Enable aux-light runtime paths
    pub fn mark_has_aux(&mut self) {
        self.has_aux = true;
    }

    pub fn has_aux(&self) -> bool {
        self.has_aux
    }

    pub fn sockets(&self) -> &SocketLedger {
        &self.sockets
    }

    pub fn params_mut(&mut self) -> &mut ParameterSink {
        &mut self.params
    }

    /// End composition. Flags gathered so far are emitted and frozen.
    pub fn finalize(mut self) -> ConfigResult<FinalizedContext> {
        if self.has_aux {
            self.params.add_flag(constants::light::DEFINE_HAS_AUX)?;
        }
        if self.wake_loop_threadsafe_required {
            self.params.add_flag(constants::socket::DEFINE_WAKE_LOOP_THREADSAFE)?;
        }
        Ok(FinalizedContext {
            platform: self.platform,
            has_networking: self.has_networking,
            high_performance_requested: self.high_performance_requested,
            sockets: self.sockets,
            params: self.params,
        })
    }
}

/// Read-only request state plus the parameter sink, for the selectors
#[derive(Debug)]
pub struct FinalizedContext {
    platform: PlatformFacts,
    has_networking: bool,
    high_performance_requested: bool,
    sockets: SocketLedger,
    params: ParameterSink,
}

impl FinalizedContext {
    pub fn platform(&self) -> &PlatformFacts {
        &self.platform
    }

    pub fn has_networking(&self) -> bool {
        self.has_networking
    }

    pub fn high_performance_requested(&self) -> bool {
        self.high_performance_requested
    }

    pub fn sockets(&self) -> &SocketLedger {
        &self.sockets
    }

    pub fn params_mut(&mut self) -> &mut ParameterSink {
        &mut self.params
    }

    pub fn into_parts(self) -> (SocketLedger, ParameterSink) {
        (self.sockets, self.params)
    }
}
