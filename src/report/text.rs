use crate::report::{FailureKind, Report};
use std::fmt::Write;

/// Renders the report in its standard textual form: one block per erroring
/// URL with the failure kind, the sorted missing fragments when present,
/// and the referring pages.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    for (url, failure) in report {
        match failure.kind {
            FailureKind::MissingFragment => {
                let fragments: Vec<&str> =
                    failure.missing_fragments.iter().map(String::as_str).collect();
                let _ = writeln!(out, "{}: missing fragments: {}", url, fragments.join(", "));
            }
            _ => {
                let _ = writeln!(out, "{}: {}", url, failure.kind);
            }
        }
        if !failure.refs.is_empty() {
            let _ = writeln!(out, "    referenced by:");
            for referrer in &failure.refs {
                let _ = writeln!(out, "        {}", referrer);
            }
        }
    }
    out
}
