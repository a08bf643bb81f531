//! # cachet-client
//!
//! Read-only access to a Cachet status page.
//!
//! The [`StatusSource`] trait is the narrow capability the exporter core
//! depends on. [`CachetClient`] implements it over the Cachet REST API
//! (`http` feature, enabled by default); tests substitute in-memory sources.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachet_client::{CachetClient, StatusSource};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CachetClient::builder()
//!         .endpoint("https://status.example.com/api/v1")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let groups = client.fetch_component_groups().await?;
//!     println!("Fetched {} component groups", groups.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "http")]
pub mod cachet;

use async_trait::async_trait;

pub use error::ClientError;

#[cfg(feature = "http")]
pub use cachet::{CachetClient, CachetClientBuilder};

// Re-export types for convenience
pub use cachet_types::{Component, ComponentGroup, ComponentStatus, Incident, IncidentStatus};

/// Source of status page state.
///
/// Every call is a single attempt; callers decide how to react to failures.
#[async_trait]
pub trait StatusSource: Send + Sync + std::fmt::Debug {
    /// All component groups with their enabled components and current status.
    async fn fetch_component_groups(&self) -> Result<Vec<ComponentGroup>, ClientError>;

    /// All incidents currently at `status`.
    async fn fetch_incidents_by_status(
        &self,
        status: IncidentStatus,
    ) -> Result<Vec<Incident>, ClientError>;

    /// Whether the upstream service answers its health check.
    async fn ping_health(&self) -> Result<bool, ClientError>;
}
