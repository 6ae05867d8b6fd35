// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `report.rs`

#[cfg(test)]
mod tests {
    use crate::report::*;

    fn report_with(statuses: &[AnnotationStatus]) -> IngressReport {
        let mut report = IngressReport::new("default", "web");
        for (i, status) in statuses.iter().enumerate() {
            report.record(AnnotationReportEntry::new(
                format!("key-{i}"),
                *status,
                None,
            ));
        }
        report
    }

    #[test]
    fn test_result_label_precedence() {
        let clean = report_with(&[AnnotationStatus::Converted, AnnotationStatus::Ignored]);
        assert_eq!(clean.summary().result_label(), ResultLabel::CleanMigration);

        let review = report_with(&[AnnotationStatus::Converted, AnnotationStatus::Warned]);
        assert_eq!(
            review.summary().result_label(),
            ResultLabel::ReviewRecommended
        );

        let manual = report_with(&[AnnotationStatus::Warned, AnnotationStatus::Skipped]);
        assert_eq!(
            manual.summary().result_label(),
            ResultLabel::ManualActionRequired,
            "Skipped must win over warnings"
        );
    }

    #[test]
    fn test_entries_keep_recording_order() {
        let mut report = IngressReport::new("default", "web");
        report.record(AnnotationReportEntry::converted("b"));
        report.record(AnnotationReportEntry::warned("a", "check this"));

        let names: Vec<&str> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(report.has_entry("a"));
        assert!(!report.has_entry("c"));
        assert_eq!(report.entries_for("a").count(), 1);
    }

    #[test]
    fn test_global_summary_sums_ingresses() {
        let mut global = GlobalReport::default();
        global.push(report_with(&[
            AnnotationStatus::Converted,
            AnnotationStatus::Converted,
        ]));
        global.push(report_with(&[
            AnnotationStatus::Skipped,
            AnnotationStatus::Ignored,
            AnnotationStatus::Warned,
        ]));

        let counts = global.summary();
        assert_eq!(
            counts,
            SummaryCounts {
                converted: 2,
                warnings: 1,
                skipped: 1,
                ignored: 1,
            }
        );
    }

    #[test]
    fn test_status_serializes_like_report_yaml() {
        let entry = AnnotationReportEntry::warned("nginx.ingress.kubernetes.io/use-regex", "x");
        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(yaml.contains("status: warning"), "got: {yaml}");

        let converted = AnnotationReportEntry::converted("k");
        let yaml = serde_yaml::to_string(&converted).unwrap();
        assert!(!yaml.contains("message"), "None message is omitted: {yaml}");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(AnnotationStatus::Warned.label(), "Warning");
        assert_eq!(AnnotationStatus::Warned.to_string(), "warning");
        assert_eq!(
            ResultLabel::ManualActionRequired.to_string(),
            "Manual action required"
        );
    }
}
