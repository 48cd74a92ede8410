//! The build document: every configuration entry of one firmware build

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::entries::{ComponentRequest, GlobalEntry, LightEntry, NetworkSection, OutputEntry, SocketSection};
use crate::platform::PlatformFacts;

/// Top-level build document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDocument {
    pub platform: PlatformFacts,
    #[serde(default)]
    pub outputs: Vec<OutputEntry>,
    #[serde(default)]
    pub globals: Vec<GlobalEntry>,
    #[serde(default)]
    pub lights: Vec<LightEntry>,
    /// Absent means networking is not part of this build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<SocketSection>,
    /// Requirements registered by components outside this crate's scope
    #[serde(default)]
    pub requests: Vec<ComponentRequest>,
}

impl BuildDocument {
    /// Default location: `<config dir>/bulb-composer/build.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load and parse a build document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build document from {:?}", path))?;

        let document = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse build document {:?}", path))?;

        info!(
            path = %path.display(),
            platform = %document.platform.family,
            lights = document.lights.len(),
            outputs = document.outputs.len(),
            "Loaded build document"
        );
        Ok(document)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Invalid build document JSON")
    }

    /// Networking is part of the build when a network section exists
    pub fn has_networking(&self) -> bool {
        self.network.is_some()
    }
}
