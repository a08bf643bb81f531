//! Registry of collectors served from one endpoint.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use cachet_types::MetricSample;

use crate::collector::{collect_to_vec, Collector};
use crate::{encode_text, Desc, RegistryError};

#[derive(Default)]
struct Inner {
    collectors: Vec<Arc<dyn Collector>>,
    descs: Vec<Desc>,
}

/// A set of collectors whose output is gathered together on each scrape.
///
/// Descriptors are taken once, at registration. Gathering runs each
/// collector in registration order.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector.
    ///
    /// Fails if any metric it describes clashes with one already registered
    /// (or with another of its own).
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<(), RegistryError> {
        let descs = collector.describe();

        let mut inner = self.inner.write();
        for (i, desc) in descs.iter().enumerate() {
            let clashes = inner.descs.iter().chain(&descs[..i]).any(|d| d.fq_name() == desc.fq_name());
            if clashes {
                return Err(RegistryError::Duplicate(desc.fq_name().to_string()));
            }
        }

        debug!(metrics = descs.len(), "registered collector");
        inner.descs.extend(descs);
        inner.collectors.push(collector);
        Ok(())
    }

    /// Descriptors of every registered metric.
    pub fn descriptors(&self) -> Vec<Desc> {
        self.inner.read().descs.clone()
    }

    /// Run every collector and return all samples.
    pub async fn gather(&self) -> Vec<MetricSample> {
        // Never hold the lock across a scrape.
        let collectors = self.inner.read().collectors.clone();

        let mut samples = Vec::new();
        for collector in collectors {
            samples.extend(collect_to_vec(collector.as_ref()).await);
        }
        samples
    }

    /// Gather and render in the Prometheus text format.
    pub async fn render(&self) -> String {
        let samples = self.gather().await;
        encode_text(&self.descriptors(), &samples)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Registry")
            .field("collectors", &inner.collectors.len())
            .field("descs", &inner.descs)
            .finish()
    }
}
