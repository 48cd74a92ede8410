//! Build document parsing
//!
//! - **document**: the top-level document and its loader
//! - **entries**: raw per-entity entries and component sections
//! - **values**: unit-aware value parsers

pub mod document;
pub mod entries;
pub mod values;

pub use document::BuildDocument;
pub use entries::{
    AuxMarker, ComponentRequest, EntityBase, GlobalEntry, LightBehavior, LightEntry, NetworkSection,
    OutputEntry, SocketSection,
};
