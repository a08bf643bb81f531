//! # cachet-types
//!
//! Core types for the Cachet exporter. This crate defines the status page
//! topology as seen through the Cachet API (component groups, components,
//! incidents) and the metric sample type produced on every scrape.
//!
//! ## Features
//!
//! - `serde`: (de)serialization of all types via serde. Status enums are
//!   encoded as their numeric Cachet code.
//!
//! ## Example
//!
//! ```rust
//! use cachet_types::{Component, ComponentGroup, ComponentStatus, Incident, IncidentStatus};
//!
//! let group = ComponentGroup::new(1, "Platform")
//!     .with_component(Component::new(7, "API", ComponentStatus::PartialOutage));
//!
//! let incident = Incident::new(42, 7, IncidentStatus::Investigating);
//!
//! assert_eq!(group.components.len(), 1);
//! assert!(incident.affects(&group.components[0]));
//! ```

mod sample;
mod status;
mod topology;

pub use sample::*;
pub use status::*;
pub use topology::*;
