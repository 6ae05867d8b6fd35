// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Batch aggregation and file emission.
//!
//! # Files
//!
//! | File | Content | Written when |
//! |---|---|---|
//! | `middlewares.yaml` | Traefik Middlewares | non-empty |
//! | `ingressroutes.yaml` | Traefik IngressRoutes | non-empty |
//! | `tlsoptions.yaml` | Traefik TLSOptions | non-empty |
//! | `certificates.yaml` | cert-manager Certificates | non-empty |
//! | `warnings.txt` | one `- ` line per warning | non-empty |
//! | `report.yaml` | global summary plus per-Ingress entries | always |
//!
//! A file that is not written by a run is removed from the directory, so a
//! reused output directory never mixes results from two runs.
//!
//! Resource files are multi-document YAML. The digest returned by
//! [`BatchOutput::write_to`] covers the resource files only, so two runs over
//! the same input can be compared without diffing.

use crate::context::ConversionResult;
use crate::crd::{IngressRoute, Middleware, TLSOption};
use crate::errors::ConvertError;
use crate::report::{GlobalReport, IngressReport, SummaryCounts};
use kube::api::DynamicObject;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MIDDLEWARES_FILE: &str = "middlewares.yaml";
pub const INGRESS_ROUTES_FILE: &str = "ingressroutes.yaml";
pub const TLS_OPTIONS_FILE: &str = "tlsoptions.yaml";
pub const CERTIFICATES_FILE: &str = "certificates.yaml";
pub const WARNINGS_FILE: &str = "warnings.txt";
pub const REPORT_FILE: &str = "report.yaml";

/// Files that are only written when non-empty.
const OPTIONAL_FILES: [&str; 5] = [
    MIDDLEWARES_FILE,
    INGRESS_ROUTES_FILE,
    TLS_OPTIONS_FILE,
    CERTIFICATES_FILE,
    WARNINGS_FILE,
];

/// Everything produced by one run.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub middlewares: Vec<Middleware>,
    pub ingress_routes: Vec<IngressRoute>,
    pub tls_options: Vec<TLSOption>,
    pub certificates: Vec<DynamicObject>,
    /// Prefixed with `<namespace>/<ingress>: `
    pub warnings: Vec<String>,
    pub report: GlobalReport,
    certificate_keys: HashSet<(String, String)>,
}

/// `report.yaml` layout.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    summary: SummaryCounts,
    result: String,
    ingresses: &'a [IngressReport],
}

/// What [`BatchOutput::write_to`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenOutput {
    pub files: Vec<PathBuf>,
    /// SHA-256 over the resource files, lowercase hex
    pub digest: String,
}

impl BatchOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one Ingress's result into the batch.
    ///
    /// Certificates are kept once per namespace/name across the batch.
    pub fn push(&mut self, result: ConversionResult) {
        let prefix = format!("{}/{}", result.report.namespace, result.report.name);

        self.middlewares.extend(result.middlewares);
        self.ingress_routes.extend(result.ingress_routes);
        self.tls_options.extend(result.tls_options);
        for cert in result.certificates {
            let key = (
                cert.metadata.namespace.clone().unwrap_or_default(),
                cert.metadata.name.clone().unwrap_or_default(),
            );
            if self.certificate_keys.insert(key) {
                self.certificates.push(cert);
            } else {
                debug!(
                    certificate = %cert.metadata.name.as_deref().unwrap_or_default(),
                    "Certificate already emitted by another Ingress"
                );
            }
        }
        self.warnings
            .extend(result.warnings.into_iter().map(|w| format!("{prefix}: {w}")));
        self.report.push(result.report);
    }

    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        self.report.summary()
    }

    /// Resource files in emission order; empty categories are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Yaml`] if a resource fails to serialize.
    pub fn resource_files(&self) -> Result<Vec<(&'static str, String)>, ConvertError> {
        let mut files = Vec::new();
        push_documents(&mut files, MIDDLEWARES_FILE, &self.middlewares)?;
        push_documents(&mut files, INGRESS_ROUTES_FILE, &self.ingress_routes)?;
        push_documents(&mut files, TLS_OPTIONS_FILE, &self.tls_options)?;
        push_documents(&mut files, CERTIFICATES_FILE, &self.certificates)?;
        Ok(files)
    }

    /// `report.yaml` content.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Yaml`] if serialization fails.
    pub fn report_yaml(&self) -> Result<String, ConvertError> {
        let summary = self.summary();
        let document = ReportDocument {
            summary,
            result: summary.result_label().to_string(),
            ingresses: &self.report.ingresses,
        };
        Ok(serde_yaml::to_string(&document)?)
    }

    /// Write every file into `dir`, creating it if needed.
    ///
    /// Optional files left over from an earlier run and not rewritten here
    /// are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] or [`ConvertError::Yaml`].
    pub fn write_to(&self, dir: &Path) -> Result<WrittenOutput, ConvertError> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let resource_files = self.resource_files()?;
        let digest = digest(&resource_files);

        for (name, content) in &resource_files {
            written.push(write_file(dir, name, content)?);
        }
        if !self.warnings.is_empty() {
            let content: String = self.warnings.iter().map(|w| format!("- {w}\n")).collect();
            written.push(write_file(dir, WARNINGS_FILE, &content)?);
        }
        written.push(write_file(dir, REPORT_FILE, &self.report_yaml()?)?);

        for name in OPTIONAL_FILES {
            let path = dir.join(name);
            if !written.contains(&path) {
                remove_stale(&path)?;
            }
        }

        info!(
            dir = %dir.display(),
            files = written.len(),
            digest = %digest,
            "Wrote conversion output"
        );
        Ok(WrittenOutput {
            files: written,
            digest,
        })
    }
}

fn push_documents<T: Serialize>(
    files: &mut Vec<(&'static str, String)>,
    name: &'static str,
    items: &[T],
) -> Result<(), ConvertError> {
    if items.is_empty() {
        return Ok(());
    }
    let documents = items
        .iter()
        .map(serde_yaml::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    files.push((name, documents.join("---\n")));
    Ok(())
}

/// SHA-256 over `name\0content\0` for each file, in order.
#[must_use]
pub fn digest(files: &[(&str, String)]) -> String {
    let mut hasher = Sha256::new();
    for (name, content) in files {
        hasher.update(name.as_bytes());
        hasher.update([0]);
        hasher.update(content.as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf, ConvertError> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(path)
}

fn remove_stale(path: &Path) -> Result<(), ConvertError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod output_tests;
