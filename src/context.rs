// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-ingress conversion context and the accumulator that collects results.
//!
//! A [`ConversionContext`] is an immutable view of one Ingress plus the run-wide
//! [`ConvertOptions`]. Every conversion step reads the context and returns a
//! [`Delta`]; the driver folds deltas into a [`ConversionResult`] with
//! [`ConversionResult::apply`]. Steps never see each other's output, which keeps
//! each converter a pure function of its inputs.
//!
//! # Example
//!
//! ```rust
//! use k8s_openapi::api::networking::v1::Ingress;
//! use nginx2traefik::context::{ConversionContext, ConversionResult, ConvertOptions, Delta};
//!
//! let mut ingress = Ingress::default();
//! ingress.metadata.name = Some("web".to_string());
//!
//! let options = ConvertOptions::default();
//! let ctx = ConversionContext::new(&ingress, &options);
//! assert_eq!(ctx.namespace, "default");
//! assert_eq!(ctx.middleware_name("cors"), "web-cors");
//!
//! let mut result = ConversionResult::new(&ctx);
//! let mut delta = Delta::default();
//! delta.warn("something to review");
//! result.apply(delta);
//! assert_eq!(result.warnings.len(), 1);
//! ```

use crate::annotations::Annotation;
use crate::constants::{DEFAULT_BURST_MULTIPLIER, DEFAULT_NAMESPACE, ENTRY_POINT_WEB, ENTRY_POINT_WEBSECURE};
use crate::crd::{IngressRoute, Middleware, MiddlewareSpec, TLSOption};
use crate::report::{AnnotationReportEntry, IngressReport};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Options
// ============================================================================

/// How IngressRoute entry points are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPointPolicy {
    /// `websecure` when the Ingress declares `spec.tls`, otherwise `web`
    #[default]
    Tls,
    /// Derived from the resolved backend scheme (`https` backends go to `websecure`)
    BackendScheme,
}

impl fmt::Display for EntryPointPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPointPolicy::Tls => f.write_str("tls"),
            EntryPointPolicy::BackendScheme => f.write_str("backend-scheme"),
        }
    }
}

impl FromStr for EntryPointPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" => Ok(EntryPointPolicy::Tls),
            "backend-scheme" => Ok(EntryPointPolicy::BackendScheme),
            other => Err(format!(
                "unknown entry point policy '{other}' (expected 'tls' or 'backend-scheme')"
            )),
        }
    }
}

/// Run-wide conversion settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Burst multiplier used when `limit-burst-multiplier` is absent
    pub burst_multiplier: u32,

    pub entry_point_policy: EntryPointPolicy,

    pub web_entry_point: String,

    pub secure_entry_point: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            burst_multiplier: DEFAULT_BURST_MULTIPLIER,
            entry_point_policy: EntryPointPolicy::default(),
            web_entry_point: ENTRY_POINT_WEB.to_string(),
            secure_entry_point: ENTRY_POINT_WEBSECURE.to_string(),
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Immutable inputs for converting one Ingress.
#[derive(Clone, Debug)]
pub struct ConversionContext<'a> {
    pub ingress: &'a Ingress,

    /// `metadata.namespace`, or `default` when the manifest omits it
    pub namespace: String,

    pub name: String,

    pub annotations: BTreeMap<String, String>,

    pub options: &'a ConvertOptions,
}

impl<'a> ConversionContext<'a> {
    pub fn new(ingress: &'a Ingress, options: &'a ConvertOptions) -> Self {
        Self {
            ingress,
            namespace: ingress
                .metadata
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            name: ingress.metadata.name.clone().unwrap_or_default(),
            annotations: ingress.metadata.annotations.clone().unwrap_or_default(),
            options,
        }
    }

    /// Raw value of a vocabulary annotation.
    #[must_use]
    pub fn annotation(&self, ann: Annotation) -> Option<&str> {
        self.annotations.get(ann.as_str()).map(String::as_str)
    }

    /// Value of an annotation, treating blank values as absent.
    #[must_use]
    pub fn non_empty(&self, ann: Annotation) -> Option<&str> {
        self.annotation(ann)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn has(&self, ann: Annotation) -> bool {
        self.annotations.contains_key(ann.as_str())
    }

    /// Whether the annotation is set to `true` (case-insensitive).
    #[must_use]
    pub fn is_true(&self, ann: Annotation) -> bool {
        self.annotation(ann)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Whether the Ingress terminates TLS (`spec.tls` is non-empty).
    #[must_use]
    pub fn has_tls(&self) -> bool {
        self.ingress
            .spec
            .as_ref()
            .and_then(|s| s.tls.as_ref())
            .is_some_and(|tls| !tls.is_empty())
    }

    /// `<ingress>-<suffix>`
    #[must_use]
    pub fn middleware_name(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.name)
    }

    /// Build a namespaced Middleware named `<ingress>-<suffix>`.
    #[must_use]
    pub fn middleware(&self, suffix: &str, spec: MiddlewareSpec) -> Middleware {
        let mut mw = Middleware::new(&self.middleware_name(suffix), spec);
        mw.metadata.namespace = Some(self.namespace.clone());
        mw
    }
}

// ============================================================================
// Delta
// ============================================================================

/// Output of one conversion step.
#[derive(Clone, Debug, Default)]
pub struct Delta {
    pub middlewares: Vec<Middleware>,
    pub ingress_routes: Vec<IngressRoute>,
    pub tls_options: Vec<TLSOption>,
    /// Name of the TLSOption the IngressRoute should reference
    pub tls_option_ref: Option<String>,
    pub certificates: Vec<DynamicObject>,
    pub warnings: Vec<String>,
    pub entries: Vec<AnnotationReportEntry>,
}

impl Delta {
    pub fn middleware(&mut self, mw: Middleware) {
        self.middlewares.push(mw);
    }

    /// Free-text warning for the operator.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn converted(&mut self, key: impl Into<String>) {
        self.entries.push(AnnotationReportEntry::converted(key));
    }

    pub fn warned(&mut self, key: impl Into<String>, msg: impl Into<String>) {
        self.entries.push(AnnotationReportEntry::warned(key, msg));
    }

    pub fn skipped(&mut self, key: impl Into<String>, msg: impl Into<String>) {
        self.entries.push(AnnotationReportEntry::skipped(key, msg));
    }

    pub fn ignored(&mut self, key: impl Into<String>, msg: impl Into<String>) {
        self.entries.push(AnnotationReportEntry::ignored(key, msg));
    }

    /// Record a warning and a `skipped` entry carrying the same message.
    pub fn skip_with_warning(&mut self, key: impl Into<String>, msg: impl Into<String>) {
        let msg = msg.into();
        self.warnings.push(msg.clone());
        self.skipped(key, msg);
    }

    /// Record a warning and a `warning` entry carrying the same message.
    pub fn warn_entry(&mut self, key: impl Into<String>, msg: impl Into<String>) {
        let msg = msg.into();
        self.warnings.push(msg.clone());
        self.warned(key, msg);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
            && self.ingress_routes.is_empty()
            && self.tls_options.is_empty()
            && self.tls_option_ref.is_none()
            && self.certificates.is_empty()
            && self.warnings.is_empty()
            && self.entries.is_empty()
    }
}

// ============================================================================
// Result
// ============================================================================

/// Accumulated output for one Ingress.
#[derive(Clone, Debug, Default)]
pub struct ConversionResult {
    pub middlewares: Vec<Middleware>,
    pub ingress_routes: Vec<IngressRoute>,
    pub tls_options: Vec<TLSOption>,
    /// Ingress name to TLSOption name
    pub tls_option_refs: BTreeMap<String, String>,
    pub certificates: Vec<DynamicObject>,
    pub warnings: Vec<String>,
    pub report: IngressReport,
}

impl ConversionResult {
    #[must_use]
    pub fn new(ctx: &ConversionContext<'_>) -> Self {
        Self {
            report: IngressReport::new(&ctx.namespace, &ctx.name),
            ..Default::default()
        }
    }

    /// Fold a step's output into the accumulator, preserving order.
    pub fn apply_for(&mut self, ingress_name: &str, delta: Delta) {
        self.middlewares.extend(delta.middlewares);
        self.ingress_routes.extend(delta.ingress_routes);
        self.tls_options.extend(delta.tls_options);
        if let Some(option) = delta.tls_option_ref {
            self.tls_option_refs.insert(ingress_name.to_string(), option);
        }
        self.certificates.extend(delta.certificates);
        self.warnings.extend(delta.warnings);
        for entry in delta.entries {
            self.report.record(entry);
        }
    }

    /// Fold a step's output for the Ingress this result was created for.
    pub fn apply(&mut self, delta: Delta) {
        let name = self.report.name.clone();
        self.apply_for(&name, delta);
    }

    /// TLSOption referenced by the current Ingress, if any.
    #[must_use]
    pub fn tls_option_for(&self, ingress_name: &str) -> Option<&str> {
        self.tls_option_refs.get(ingress_name).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
