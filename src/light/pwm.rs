//! PWM step derivation from output frequency
//!
//! steps = 1,000,000 / frequency, truncated (125 Hz -> 8000, 1000 Hz -> 1000).

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::OutputEntry;
use crate::constants::pwm as consts;
use crate::error::ConfigResult;
use crate::params::ParameterSink;
use crate::registry::Registry;

use super::ChannelSet;

/// Steps for a known frequency in Hz
///
/// Zero or negative frequencies are not rejected; the float to integer
/// cast saturates (0 Hz gives u32::MAX, negative gives 0).
pub fn steps_for_frequency(frequency: f64) -> u32 {
    (consts::STEPS_NUMERATOR / frequency) as u32
}

/// Look up an output's frequency and derive its steps
///
/// Unknown outputs fall back to 1000 steps instead of failing.
pub fn pwm_steps_for_output(outputs: &Registry<OutputEntry>, output_id: &str) -> u32 {
    match outputs.lookup(output_id) {
        Some(handle) => {
            let frequency = outputs
                .get(handle)
                .frequency
                .unwrap_or(consts::DEFAULT_FREQUENCY_HZ);
            let steps = steps_for_frequency(frequency);
            debug!(output = %output_id, frequency = frequency, steps = steps, "Derived PWM steps");
            steps
        }
        None => {
            warn!(
                output = %output_id,
                steps = consts::FALLBACK_STEPS,
                "Output not declared, using fallback PWM steps"
            );
            consts::FALLBACK_STEPS
        }
    }
}

/// Per-channel PWM steps of a main light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PwmSteps {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub cold: u32,
    pub warm: u32,
}

impl PwmSteps {
    pub fn derive(channels: &ChannelSet, outputs: &Registry<OutputEntry>) -> Self {
        Self {
            red: pwm_steps_for_output(outputs, &channels.red),
            green: pwm_steps_for_output(outputs, &channels.green),
            blue: pwm_steps_for_output(outputs, &channels.blue),
            cold: pwm_steps_for_output(outputs, &channels.cold_white),
            warm: pwm_steps_for_output(outputs, &channels.warm_white),
        }
    }

    /// Emit the five step constants consumed by the runtime PWM driver
    pub fn emit(&self, params: &mut ParameterSink) -> ConfigResult<()> {
        params.add_define(consts::DEFINE_RED, self.red)?;
        params.add_define(consts::DEFINE_GREEN, self.green)?;
        params.add_define(consts::DEFINE_BLUE, self.blue)?;
        params.add_define(consts::DEFINE_COLD, self.cold)?;
        params.add_define(consts::DEFINE_WARM, self.warm)?;
        Ok(())
    }
}
