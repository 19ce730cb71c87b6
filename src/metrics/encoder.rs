//! Prometheus text exposition (format version 0.0.4).

use std::fmt::Write;

use super::snapshot::{HistogramSample, MetricFamily, SampleValue, Snapshot};

/// Content type served alongside [`TextEncoder`] output.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders snapshots in the Prometheus text format.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextEncoder;

impl TextEncoder {
    pub fn new() -> Self {
        TextEncoder
    }

    pub fn encode(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        for family in &snapshot.families {
            encode_family(family, &mut out);
        }
        out
    }
}

fn encode_family(family: &MetricFamily, out: &mut String) {
    let name = &family.name;
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
    let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());

    for sample in &family.samples {
        let labels: Vec<(&str, &str)> = family
            .label_names
            .iter()
            .map(String::as_str)
            .zip(sample.label_values.iter().map(String::as_str))
            .collect();

        match &sample.value {
            SampleValue::Counter(value) => {
                let labels = render_labels(&labels, None);
                let _ = writeln!(out, "{}{} {}", name, labels, fmt_float(*value));
            }
            SampleValue::Histogram(histogram) => encode_histogram(name, &labels, histogram, out),
        }
    }
}

fn encode_histogram(
    name: &str,
    labels: &[(&str, &str)],
    sample: &HistogramSample,
    out: &mut String,
) {
    for (bound, count) in &sample.buckets {
        let bucket_labels = render_labels(labels, Some(fmt_float(*bound).as_str()));
        let _ = writeln!(out, "{}_bucket{} {}", name, bucket_labels, count);
    }
    let inf_labels = render_labels(labels, Some("+Inf"));
    let _ = writeln!(out, "{}_bucket{} {}", name, inf_labels, sample.count);

    let series_labels = render_labels(labels, None);
    let _ = writeln!(out, "{}_sum{} {}", name, series_labels, fmt_float(sample.sum));
    let _ = writeln!(out, "{}_count{} {}", name, series_labels, sample.count);
}

fn render_labels(labels: &[(&str, &str)], le: Option<&str>) -> String {
    let mut pairs: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some(le) = le {
        pairs.push(format!("le=\"{}\"", le));
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

fn fmt_float(v: f64) -> String {
    if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if v.is_nan() {
        "NaN".to_string()
    } else {
        v.to_string()
    }
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricRegistry, Opts};

    #[test]
    fn renders_counters_and_histograms() {
        let registry = MetricRegistry::new();
        let requests = registry
            .counter_vec(
                Opts::new("http_requests_total", "Total number of HTTP requests"),
                &["method", "path", "status"],
            )
            .unwrap();
        let durations = registry
            .histogram_vec(
                Opts::new("http_request_duration_seconds", "HTTP request durations"),
                &["method", "path"],
                &[0.1, 0.5],
            )
            .unwrap();
        requests.inc(&["GET", "/hello", "200"]).unwrap();
        durations.observe(&["GET", "/hello"], 0.25).unwrap();

        let text = TextEncoder::new().encode(&registry.snapshot());
        let expected = "\
# HELP http_request_duration_seconds HTTP request durations
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{method=\"GET\",path=\"/hello\",le=\"0.1\"} 0
http_request_duration_seconds_bucket{method=\"GET\",path=\"/hello\",le=\"0.5\"} 1
http_request_duration_seconds_bucket{method=\"GET\",path=\"/hello\",le=\"+Inf\"} 1
http_request_duration_seconds_sum{method=\"GET\",path=\"/hello\"} 0.25
http_request_duration_seconds_count{method=\"GET\",path=\"/hello\"} 1
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
http_requests_total{method=\"GET\",path=\"/hello\",status=\"200\"} 1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn unlabeled_series_and_escaping() {
        let registry = MetricRegistry::new();
        let calls = registry
            .counter_vec(Opts::new("calls_total", "Line one\nline two"), &[])
            .unwrap();
        let odd = registry.counter_vec(Opts::new("odd_total", "odd"), &["v"]).unwrap();
        calls.inc(&[]).unwrap();
        odd.inc(&["quote\" slash\\ newline\n"]).unwrap();

        let text = TextEncoder::new().encode(&registry.snapshot());
        assert!(text.contains("# HELP calls_total Line one\\nline two\n"));
        assert!(text.contains("\ncalls_total 1\n"));
        assert!(text.contains("odd_total{v=\"quote\\\" slash\\\\ newline\\n\"} 1\n"));
    }
}
