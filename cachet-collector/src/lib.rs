//! # cachet-collector
//!
//! Translates the state of a Cachet status page into Prometheus gauges.
//!
//! On every scrape, [`CachetCollector`] asks a [`StatusSource`] for the
//! component-group tree and the incidents at each status, counts them densely
//! (every status appears, zero or not) and streams [`MetricSample`]s into a
//! channel as they are produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cachet_client::CachetClient;
//! use cachet_collector::{CachetCollector, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CachetClient::builder()
//!         .endpoint("https://status.example.com/api/v1")
//!         .build()?;
//!
//!     let registry = Registry::new();
//!     registry.register(Arc::new(CachetCollector::new(Arc::new(client))))?;
//!
//!     println!("{}", registry.render().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Metrics
//!
//! | name | labels |
//! |---|---|
//! | `cachet_up` | none |
//! | `cachet_scrape_duration_seconds` | none |
//! | `cachet_incidents` | `status`, `group_name`, `component_name` |
//! | `cachet_components` | `status`, `group_name` |

mod collector;
mod desc;
mod encode;
mod error;
mod registry;

#[cfg(feature = "server")]
pub mod prometheus;

pub use collector::{collect_to_vec, CachetCollector, Collector, Descriptors};
pub use desc::{build_fq_name, Desc};
pub use encode::{encode_text, TEXT_CONTENT_TYPE};
pub use error::RegistryError;
pub use registry::Registry;

#[cfg(feature = "server")]
pub use error::ServerError;

// Re-export types for convenience
pub use cachet_client::StatusSource;
pub use cachet_types::MetricSample;
