//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use cachet_types::MetricSample;

use crate::Desc;

/// Content type for the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples in the Prometheus text format.
///
/// Samples are grouped into families by name, in the order each name is
/// first seen. Families with a matching descriptor get `# HELP` and
/// `# TYPE ... gauge` headers; anything else is declared `untyped`.
pub fn encode_text(descs: &[Desc], samples: &[MetricSample]) -> String {
    let mut families: Vec<(&str, Vec<&MetricSample>)> = Vec::new();
    for sample in samples {
        match families.iter_mut().find(|(name, _)| *name == sample.name) {
            Some((_, members)) => members.push(sample),
            None => families.push((sample.name.as_str(), vec![sample])),
        }
    }

    let mut output = String::new();
    for (name, members) in families {
        match descs.iter().find(|d| d.fq_name() == name) {
            Some(desc) => {
                let _ = writeln!(output, "# HELP {} {}", name, escape_help(desc.help()));
                let _ = writeln!(output, "# TYPE {} gauge", name);
            }
            None => {
                let _ = writeln!(output, "# TYPE {} untyped", name);
            }
        }

        for sample in members {
            output.push_str(name);
            if !sample.labels.is_empty() {
                let labels = sample
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                let _ = write!(output, "{{{}}}", labels);
            }
            let _ = writeln!(output, " {}", format_value(sample.value));
        }
    }

    output
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Help text only escapes backslash and newline.
fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descs() -> Vec<Desc> {
        vec![
            Desc::new("cachet_up", "Cachet API is up and accepting requests", &[]),
            Desc::new(
                "cachet_components",
                "Number of components by status",
                &["status", "group_name"],
            ),
        ]
    }

    #[test]
    fn test_encode_basic() {
        let samples = vec![
            MetricSample::new("cachet_components", 2.0)
                .with_label("status", "1")
                .with_label("group_name", "Core"),
            MetricSample::new("cachet_up", 1.0),
        ];

        let output = encode_text(&descs(), &samples);

        assert_eq!(
            output,
            "# HELP cachet_components Number of components by status\n\
             # TYPE cachet_components gauge\n\
             cachet_components{group_name=\"Core\",status=\"1\"} 2\n\
             # HELP cachet_up Cachet API is up and accepting requests\n\
             # TYPE cachet_up gauge\n\
             cachet_up 1\n"
        );
    }

    #[test]
    fn test_family_grouping_keeps_first_seen_order() {
        let samples = vec![
            MetricSample::new("cachet_up", 0.0),
            MetricSample::new("cachet_components", 1.0).with_label("status", "0"),
            MetricSample::new("cachet_up", 1.0),
        ];

        let output = encode_text(&descs(), &samples);
        assert_eq!(output.matches("# TYPE cachet_up gauge").count(), 1);
        assert!(output.find("cachet_up 1").unwrap() < output.find("# HELP cachet_components").unwrap());
    }

    #[test]
    fn test_undescribed_family_is_untyped() {
        let samples = vec![MetricSample::new("something_else", 0.25)];
        let output = encode_text(&descs(), &samples);

        assert!(output.contains("# TYPE something_else untyped\n"));
        assert!(!output.contains("# HELP something_else"));
        assert!(output.contains("something_else 0.25\n"));
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("simple"), "simple");
        assert_eq!(escape_label_value("with\"quote"), "with\\\"quote");
        assert_eq!(escape_label_value("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_label_value("with\nnewline"), "with\\nnewline");
    }

    #[test]
    fn test_escaped_group_name_in_output() {
        let samples = vec![MetricSample::new("cachet_components", 1.0)
            .with_label("group_name", "Edge \"EU\"")
            .with_label("status", "1")];

        let output = encode_text(&descs(), &samples);
        assert!(output.contains("cachet_components{group_name=\"Edge \\\"EU\\\"\",status=\"1\"} 1\n"));
    }

    #[test]
    fn test_format_special_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(0.125), "0.125");
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(encode_text(&descs(), &[]), "");
    }
}
