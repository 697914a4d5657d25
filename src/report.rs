//! End-of-run summary text.

use std::path::Path;

use crate::pipeline::RunReport;

/// Lines describing identifiers that did not resolve, or `None` if all did.
pub fn invalid_summary(report: &RunReport) -> Option<String> {
    if !report.has_invalid() {
        return None;
    }
    let ids: Vec<String> = report.invalid_ids.iter().map(u64::to_string).collect();
    Some(format!(
        "The following IDs could not be found or accessed:\n[{}]",
        ids.join(", ")
    ))
}

/// Full summary: unresolved identifiers (if any), label count and where the
/// sheet was saved.
pub fn summary(report: &RunReport, output: &Path) -> String {
    let mut lines = Vec::new();
    if let Some(invalid) = invalid_summary(report) {
        lines.push(invalid);
    }
    let noun = if report.pages_written == 1 {
        "label"
    } else {
        "labels"
    };
    lines.push(format!(
        "{} {} saved to: {}",
        report.pages_written,
        noun,
        output.display()
    ));
    lines.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_all_resolved() {
        let report = RunReport {
            pages_written: 3,
            invalid_ids: vec![],
        };
        assert_eq!(invalid_summary(&report), None);
        assert_eq!(
            summary(&report, Path::new("out/labels.pdf")),
            "3 labels saved to: out/labels.pdf"
        );
    }

    #[test]
    fn test_summary_with_invalid() {
        let report = RunReport {
            pages_written: 1,
            invalid_ids: vec![999, 1000],
        };
        assert_eq!(
            summary(&report, Path::new("labels.pdf")),
            "The following IDs could not be found or accessed:\n[999, 1000]\n\n1 label saved to: labels.pdf"
        );
    }
}
