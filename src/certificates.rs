// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager `Certificate` resolution for TLS-terminating Ingresses.
//!
//! For each distinct `spec.tls[].secretName` the resolver:
//!
//! 1. asks the [`CertificateLookup`] collaborator for a live `Certificate`
//!    whose `spec.secretName` matches, and emits it sanitized for GitOps;
//! 2. otherwise generates a `Certificate` from the `cert-manager.io/*`
//!    annotations (a cluster-issuer or issuer annotation is required);
//! 3. otherwise reports the secret as skipped.
//!
//! Lookup errors are warnings, never hard errors: generation is still tried.
//!
//! # Caching
//!
//! [`CertificateCache`] wraps a [`CertificateSource`] and lists each namespace
//! at most once for its lifetime. Failed listings are cached as well. The cache
//! is `Sync` and can be shared by workers converting Ingresses in parallel.

use crate::annotations::Annotation;
use crate::constants::{
    CERT_MANAGER_API_GROUP, CERT_MANAGER_API_VERSION, CLUSTER_ISSUER_KIND, DEFAULT_ISSUER_GROUP,
    DEFAULT_ISSUER_KIND, KIND_CERTIFICATE, REPORT_KEY_CERTIFICATE,
};
use crate::context::{ConversionContext, Delta};
use crate::errors::ConvertError;
use crate::metrics;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Annotation added by `kubectl apply`, noise in GitOps output.
const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Labels that describe the previous lifecycle manager. Entries ending in `/`
/// are prefixes.
const STALE_LABELS: &[&str] = &[
    "helm.sh/",
    "app.kubernetes.io/managed-by",
    "app.kubernetes.io/version",
];

// ============================================================================
// Collaborators
// ============================================================================

/// Finds the live Certificate that populates a TLS secret.
pub trait CertificateLookup {
    /// First Certificate in `namespace` whose `spec.secretName` is `secret_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::CertificateLookup`] when the cluster query fails.
    /// An absent cert-manager CRD is `Ok(None)`, not an error.
    fn find_by_secret(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<DynamicObject>, ConvertError>;
}

/// Lists Certificates in a namespace.
pub trait CertificateSource {
    /// All Certificates in `namespace`; `None` when the CRD is not installed.
    ///
    /// # Errors
    ///
    /// Any failure other than a missing CRD.
    fn list(&self, namespace: &str) -> Result<Option<Vec<DynamicObject>>, ConvertError>;
}

type CachedListing = Result<Option<Vec<DynamicObject>>, String>;

/// Namespace-keyed cache over a [`CertificateSource`]. Entries never expire.
pub struct CertificateCache<S> {
    source: S,
    listings: Mutex<HashMap<String, CachedListing>>,
}

impl<S: CertificateSource> CertificateCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            listings: Mutex::new(HashMap::new()),
        }
    }

    /// Namespaces listed so far.
    #[must_use]
    pub fn cached_namespaces(&self) -> usize {
        self.listings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<S: CertificateSource> CertificateLookup for CertificateCache<S> {
    fn find_by_secret(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<DynamicObject>, ConvertError> {
        let mut listings = self.listings.lock().unwrap_or_else(PoisonError::into_inner);

        if listings.contains_key(namespace) {
            metrics::record_certificate_lookup(metrics::LOOKUP_CACHED);
        } else {
            let fetched = self.source.list(namespace).map_err(|e| e.to_string());
            match &fetched {
                Ok(None) => {
                    warn!(
                        namespace,
                        "cert-manager Certificate CRD not found in cluster; skipping extraction"
                    );
                    metrics::record_certificate_lookup(metrics::LOOKUP_CRD_ABSENT);
                }
                Err(reason) => {
                    warn!(namespace, %reason, "Failed to list cert-manager Certificates");
                    metrics::record_certificate_lookup(metrics::LOOKUP_ERROR);
                }
                Ok(Some(items)) => {
                    debug!(namespace, count = items.len(), "Listed cert-manager Certificates");
                }
            }
            listings.insert(namespace.to_string(), fetched);
        }

        let items = match &listings[namespace] {
            Ok(Some(items)) => items,
            Ok(None) => return Ok(None),
            Err(reason) => {
                return Err(ConvertError::CertificateLookup {
                    namespace: namespace.to_string(),
                    reason: reason.clone(),
                })
            }
        };

        let found = items
            .iter()
            .find(|cert| spec_secret_name(cert) == Some(secret_name))
            .cloned();
        metrics::record_certificate_lookup(if found.is_some() {
            metrics::LOOKUP_FOUND
        } else {
            metrics::LOOKUP_NOT_FOUND
        });
        Ok(found)
    }
}

/// `spec.secretName` of a Certificate.
#[must_use]
pub fn spec_secret_name(cert: &DynamicObject) -> Option<&str> {
    cert.data
        .get("spec")
        .and_then(|spec| spec.get("secretName"))
        .and_then(Value::as_str)
}

#[must_use]
pub fn certificate_api_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind {
        group: CERT_MANAGER_API_GROUP.to_string(),
        version: CERT_MANAGER_API_VERSION.to_string(),
        kind: KIND_CERTIFICATE.to_string(),
    })
}

// ============================================================================
// Sanitization
// ============================================================================

/// Strip cluster-assigned and lifecycle state from an extracted Certificate.
///
/// Owner references must go: the extracted Certificate would otherwise be
/// garbage-collected together with the Ingress it came from.
pub fn sanitize(cert: &mut DynamicObject) {
    let meta = &mut cert.metadata;
    meta.resource_version = None;
    meta.uid = None;
    meta.creation_timestamp = None;
    meta.deletion_timestamp = None;
    meta.generation = None;
    meta.managed_fields = None;
    meta.self_link = None;
    meta.owner_references = None;

    if let Some(annotations) = meta.annotations.as_mut() {
        annotations.remove(LAST_APPLIED_ANNOTATION);
    }
    if let Some(labels) = meta.labels.as_mut() {
        labels.retain(|key, _| !is_stale_label(key));
    }
    drop_if_empty(&mut meta.annotations);
    drop_if_empty(&mut meta.labels);

    if let Some(data) = cert.data.as_object_mut() {
        data.remove("status");
    }
}

fn is_stale_label(key: &str) -> bool {
    STALE_LABELS.iter().any(|pattern| {
        if pattern.ends_with('/') {
            key.starts_with(pattern)
        } else {
            key == *pattern
        }
    })
}

fn drop_if_empty(map: &mut Option<BTreeMap<String, String>>) {
    if map.as_ref().is_some_and(BTreeMap::is_empty) {
        *map = None;
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Issuer reference resolved from annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerRef {
    pub name: String,
    pub kind: String,
    pub group: String,
}

/// Cluster-issuer wins over issuer; kind defaults to `Issuer`, group to
/// `cert-manager.io`.
#[must_use]
pub fn resolve_issuer(ctx: &ConversionContext<'_>) -> Option<IssuerRef> {
    let group = ctx
        .non_empty(Annotation::CertManagerIssuerGroup)
        .unwrap_or(DEFAULT_ISSUER_GROUP)
        .to_string();

    if let Some(name) = ctx.non_empty(Annotation::CertManagerClusterIssuer) {
        return Some(IssuerRef {
            name: name.to_string(),
            kind: CLUSTER_ISSUER_KIND.to_string(),
            group,
        });
    }

    ctx.non_empty(Annotation::CertManagerIssuer)
        .map(|name| IssuerRef {
            name: name.to_string(),
            kind: ctx
                .non_empty(Annotation::CertManagerIssuerKind)
                .unwrap_or(DEFAULT_ISSUER_KIND)
                .to_string(),
            group,
        })
}

/// Build a Certificate named after its secret.
#[must_use]
pub fn generate_certificate(
    ctx: &ConversionContext<'_>,
    secret_name: &str,
    hosts: &[String],
    issuer: &IssuerRef,
) -> DynamicObject {
    let mut spec = json!({
        "secretName": secret_name,
        "dnsNames": hosts,
        "issuerRef": {
            "name": issuer.name,
            "kind": issuer.kind,
            "group": issuer.group,
        },
    });
    for (ann, field) in [
        (Annotation::CertManagerCommonName, "commonName"),
        (Annotation::CertManagerDuration, "duration"),
        (Annotation::CertManagerRenewBefore, "renewBefore"),
    ] {
        if let Some(value) = ctx.non_empty(ann) {
            spec[field] = json!(value);
        }
    }

    DynamicObject::new(secret_name, &certificate_api_resource())
        .within(&ctx.namespace)
        .data(json!({ "spec": spec }))
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolve one Certificate per distinct TLS secret of the Ingress.
///
/// `lookup` is `None` in offline mode; extraction is then never attempted.
pub fn resolve_certificates(
    ctx: &ConversionContext<'_>,
    lookup: Option<&dyn CertificateLookup>,
) -> Delta {
    let mut delta = Delta::default();
    let tls_entries = ctx
        .ingress
        .spec
        .as_ref()
        .and_then(|s| s.tls.as_ref())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut generated_any = false;
    let mut extracted_any = false;

    for entry in tls_entries {
        let hosts = entry.hosts.clone().unwrap_or_default();
        let Some(secret_name) = entry.secret_name.as_deref().filter(|s| !s.is_empty()) else {
            delta.warn(format!(
                "TLS entry with hosts {hosts:?} has no secretName; skipping Certificate extraction"
            ));
            continue;
        };
        if !seen.insert(secret_name) {
            continue;
        }

        if let Some(cert) = try_extract(ctx, lookup, secret_name, &mut delta) {
            info!(
                namespace = %ctx.namespace,
                secret = secret_name,
                certificate = cert.metadata.name.as_deref().unwrap_or_default(),
                "Extracted Certificate from cluster"
            );
            delta.certificates.push(cert);
            delta.converted(REPORT_KEY_CERTIFICATE);
            extracted_any = true;
            continue;
        }

        if let Some(issuer) = resolve_issuer(ctx) {
            info!(
                namespace = %ctx.namespace,
                secret = secret_name,
                issuer = %issuer.name,
                kind = %issuer.kind,
                "Generated Certificate from annotations"
            );
            delta
                .certificates
                .push(generate_certificate(ctx, secret_name, &hosts, &issuer));
            delta.converted(REPORT_KEY_CERTIFICATE);
            generated_any = true;
            continue;
        }

        delta.skip_with_warning(
            REPORT_KEY_CERTIFICATE,
            format!(
                "no Certificate found in cluster for secret \"{secret_name}\" and no cert-manager issuer annotation present; manual Certificate creation required"
            ),
        );
    }

    report_annotations(ctx, !tls_entries.is_empty(), generated_any, extracted_any, &mut delta);
    delta
}

fn try_extract(
    ctx: &ConversionContext<'_>,
    lookup: Option<&dyn CertificateLookup>,
    secret_name: &str,
    delta: &mut Delta,
) -> Option<DynamicObject> {
    let lookup = lookup?;
    match lookup.find_by_secret(&ctx.namespace, secret_name) {
        Ok(Some(mut cert)) => {
            sanitize(&mut cert);
            Some(cert)
        }
        Ok(None) => None,
        Err(e) => {
            delta.warn_entry(
                REPORT_KEY_CERTIFICATE,
                format!("failed to look up Certificate for secret \"{secret_name}\": {e}"),
            );
            None
        }
    }
}

/// One entry per present cert-manager annotation.
fn report_annotations(
    ctx: &ConversionContext<'_>,
    has_tls: bool,
    generated: bool,
    extracted: bool,
    delta: &mut Delta,
) {
    let cluster_issuer = ctx.non_empty(Annotation::CertManagerClusterIssuer).is_some();

    for ann in Annotation::CERT_MANAGER {
        if !ctx.has(*ann) {
            continue;
        }
        let key = ann.as_str();
        let unused = if !has_tls {
            Some("Ingress has no spec.tls entries; no Certificate was generated")
        } else if !generated {
            if extracted {
                Some("Certificate was extracted from the cluster; annotation not used")
            } else {
                Some("no Certificate was generated from annotations")
            }
        } else if ctx.non_empty(*ann).is_none() {
            Some("annotation value is empty")
        } else if cluster_issuer
            && matches!(ann, Annotation::CertManagerIssuer | Annotation::CertManagerIssuerKind)
        {
            Some("cert-manager.io/cluster-issuer takes precedence")
        } else {
            None
        };

        match unused {
            Some(reason) => delta.ignored(key, reason),
            None => delta.converted(key),
        }
    }
}

#[cfg(test)]
#[path = "certificates_tests.rs"]
mod certificates_tests;
