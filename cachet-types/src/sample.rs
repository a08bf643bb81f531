//! Metric samples - the output unit of a scrape.

use std::collections::BTreeMap;

/// A single gauge observation: metric name, label set and value.
///
/// Samples are produced fresh on every scrape and never retained. Labels are
/// kept in a `BTreeMap`, so keys are unique and iteration is sorted by name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSample {
    /// Fully-qualified metric name (e.g. `cachet_up`).
    pub name: String,

    /// Label names to label values.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub labels: BTreeMap<String, String>,

    /// Observed value.
    pub value: f64,
}

impl MetricSample {
    /// Create an unlabeled sample.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            value,
        }
    }

    /// Attach a label, replacing any previous value for the same name.
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Look up a label value.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}
