// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Human-readable report rendering.
//!
//! Two layouts: a comfy-table per Ingress plus a summary table, or plain
//! indented text for logs and CI output. Both end with the overall result
//! label from [`SummaryCounts::result_label`].

use crate::report::{AnnotationStatus, GlobalReport, IngressReport, SummaryCounts};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::fmt::Write;

const TABLE_WIDTH: u16 = 120;

/// Output layout for the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Text,
    /// Print nothing
    None,
}

/// Render the whole run in the chosen layout.
#[must_use]
pub fn render(report: &GlobalReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Table => {
            let mut out = String::new();
            for ingress in &report.ingresses {
                let _ = writeln!(out, "Ingress {}/{}", ingress.namespace, ingress.name);
                let _ = writeln!(out, "{}", ingress_table(ingress));
            }
            let _ = write!(out, "{}", summary_table(&report.summary()));
            out
        }
        ReportFormat::Text => {
            let mut out = String::new();
            for ingress in &report.ingresses {
                out.push_str(&ingress_text(ingress));
            }
            out.push_str(&summary_text(&report.summary()));
            out
        }
        ReportFormat::None => String::new(),
    }
}

fn status_color(status: AnnotationStatus) -> Color {
    match status {
        AnnotationStatus::Converted => Color::Green,
        AnnotationStatus::Warned => Color::Yellow,
        AnnotationStatus::Skipped => Color::Red,
        AnnotationStatus::Ignored => Color::DarkGrey,
    }
}

/// One row per report entry, in recording order.
#[must_use]
pub fn ingress_table(report: &IngressReport) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH)
        .set_header(vec!["Annotation", "Status", "Message"]);

    for entry in report.entries() {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(entry.status.label()).fg(status_color(entry.status)),
            Cell::new(entry.message.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

#[must_use]
pub fn summary_table(summary: &SummaryCounts) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Converted", "Warnings", "Skipped", "Ignored", "Result"]);
    table.add_row(vec![
        Cell::new(summary.converted),
        Cell::new(summary.warnings),
        Cell::new(summary.skipped),
        Cell::new(summary.ignored),
        Cell::new(summary.result_label()),
    ]);
    table
}

#[must_use]
pub fn ingress_text(report: &IngressReport) -> String {
    let mut out = format!("Ingress {}/{}\n", report.namespace, report.name);
    for entry in report.entries() {
        let status = format!("[{}]", entry.status);
        let _ = match &entry.message {
            Some(msg) => writeln!(out, "  {status:<12}{} - {msg}", entry.name),
            None => writeln!(out, "  {status:<12}{}", entry.name),
        };
    }
    out
}

#[must_use]
pub fn summary_text(summary: &SummaryCounts) -> String {
    format!(
        "Summary: converted={} warnings={} skipped={} ignored={}\nResult: {}\n",
        summary.converted,
        summary.warnings,
        summary.skipped,
        summary.ignored,
        summary.result_label()
    )
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
