//! Metric descriptors - the static name, help text and label schema of a
//! metric family.

use cachet_types::MetricSample;

/// Join non-empty name parts with `_`, the way Prometheus client libraries
/// build fully-qualified metric names.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Describes one gauge family: its name, help text and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    fq_name: String,
    help: String,
    label_names: Vec<String>,
}

impl Desc {
    /// Create a descriptor.
    pub fn new(fq_name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        Self {
            fq_name: fq_name.into(),
            help: help.into(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Fully-qualified metric name.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    /// Help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Label names, in declaration order.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Build a sample for this family.
    ///
    /// `label_values` pair up positionally with the descriptor's label names.
    pub fn sample(&self, value: f64, label_values: &[&str]) -> MetricSample {
        debug_assert_eq!(
            label_values.len(),
            self.label_names.len(),
            "label cardinality mismatch for {}",
            self.fq_name
        );

        self.label_names
            .iter()
            .zip(label_values)
            .fold(MetricSample::new(self.fq_name.clone(), value), |sample, (name, value)| {
                sample.with_label(name.clone(), *value)
            })
    }
}
