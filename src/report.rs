// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Structured conversion report.
//!
//! Every annotation the converter recognises on an Ingress ends up with exactly
//! one [`AnnotationReportEntry`]. Entries are append-only: [`IngressReport`]
//! exposes no way to edit or remove an entry once recorded.
//!
//! # Example
//!
//! ```rust
//! use nginx2traefik::report::{AnnotationReportEntry, IngressReport, ResultLabel};
//!
//! let mut report = IngressReport::new("shop", "web");
//! report.record(AnnotationReportEntry::converted("nginx.ingress.kubernetes.io/limit-rps"));
//! report.record(AnnotationReportEntry::skipped(
//!     "nginx.ingress.kubernetes.io/server-snippet",
//!     "server-snippet has no Traefik equivalent",
//! ));
//!
//! let counts = report.summary();
//! assert_eq!(counts.converted, 1);
//! assert_eq!(counts.result_label(), ResultLabel::ManualActionRequired);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStatus {
    /// Translated into equivalent Traefik configuration
    Converted,
    /// Translated, but behaviour may differ and needs review
    #[serde(rename = "warning")]
    Warned,
    /// Not translated; manual migration required
    Skipped,
    /// Not applicable or no effect in Traefik
    Ignored,
}

impl AnnotationStatus {
    /// Label used by the human renderers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            AnnotationStatus::Converted => "Converted",
            AnnotationStatus::Warned => "Warning",
            AnnotationStatus::Skipped => "Skipped",
            AnnotationStatus::Ignored => "Ignored",
        }
    }
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnnotationStatus::Converted => "converted",
            AnnotationStatus::Warned => "warning",
            AnnotationStatus::Skipped => "skipped",
            AnnotationStatus::Ignored => "ignored",
        };
        f.write_str(s)
    }
}

/// Outcome for one annotation key (or report pseudo-key).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReportEntry {
    /// Full annotation key, e.g. `nginx.ingress.kubernetes.io/rewrite-target`
    pub name: String,

    pub status: AnnotationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnnotationReportEntry {
    pub fn new(name: impl Into<String>, status: AnnotationStatus, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message,
        }
    }

    pub fn converted(name: impl Into<String>) -> Self {
        Self::new(name, AnnotationStatus::Converted, None)
    }

    pub fn warned(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, AnnotationStatus::Warned, Some(message.into()))
    }

    pub fn skipped(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, AnnotationStatus::Skipped, Some(message.into()))
    }

    pub fn ignored(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, AnnotationStatus::Ignored, Some(message.into()))
    }
}

/// Report for a single Ingress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressReport {
    pub namespace: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entries: Vec<AnnotationReportEntry>,
}

impl IngressReport {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, entry: AnnotationReportEntry) {
        self.entries.push(entry);
    }

    /// Entries in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[AnnotationReportEntry] {
        &self.entries
    }

    /// Whether any entry exists for `name`.
    #[must_use]
    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Entries recorded for `name`.
    pub fn entries_for<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationReportEntry> + 'a {
        self.entries.iter().filter(move |e| e.name == name)
    }

    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        let mut counts = SummaryCounts::default();
        for entry in &self.entries {
            counts.add(entry.status);
        }
        counts
    }
}

/// Reports for every Ingress processed in a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalReport {
    #[serde(default)]
    pub ingresses: Vec<IngressReport>,
}

impl GlobalReport {
    pub fn push(&mut self, report: IngressReport) {
        self.ingresses.push(report);
    }

    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        self.ingresses
            .iter()
            .map(IngressReport::summary)
            .fold(SummaryCounts::default(), |acc, c| acc.merge(c))
    }
}

/// Count of outcomes per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub converted: usize,
    pub warnings: usize,
    pub skipped: usize,
    pub ignored: usize,
}

impl SummaryCounts {
    pub fn add(&mut self, status: AnnotationStatus) {
        match status {
            AnnotationStatus::Converted => self.converted += 1,
            AnnotationStatus::Warned => self.warnings += 1,
            AnnotationStatus::Skipped => self.skipped += 1,
            AnnotationStatus::Ignored => self.ignored += 1,
        }
    }

    #[must_use]
    pub fn merge(self, other: SummaryCounts) -> SummaryCounts {
        SummaryCounts {
            converted: self.converted + other.converted,
            warnings: self.warnings + other.warnings,
            skipped: self.skipped + other.skipped,
            ignored: self.ignored + other.ignored,
        }
    }

    /// Overall verdict. Skipped entries dominate warnings.
    #[must_use]
    pub fn result_label(&self) -> ResultLabel {
        if self.skipped > 0 {
            ResultLabel::ManualActionRequired
        } else if self.warnings > 0 {
            ResultLabel::ReviewRecommended
        } else {
            ResultLabel::CleanMigration
        }
    }
}

/// Verdict shown at the bottom of a summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultLabel {
    ManualActionRequired,
    ReviewRecommended,
    CleanMigration,
}

impl fmt::Display for ResultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultLabel::ManualActionRequired => "Manual action required",
            ResultLabel::ReviewRecommended => "Review recommended",
            ResultLabel::CleanMigration => "Clean migration",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
