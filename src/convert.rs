// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conversion driver for a single Ingress.
//!
//! # Pipeline
//!
//! 1. Directive converters, in the fixed order of [`CONVERTERS`]
//! 2. Middleware sequencing ([`sort_middlewares`])
//! 3. Route compilation ([`compile_routes`])
//! 4. Certificate resolution ([`resolve_certificates`])
//! 5. Unknown-annotation sweep
//! 6. Coverage pass: every recognized annotation still unreported is `ignored`
//!
//! # Error tiers
//!
//! Each converter carries an [`ErrorPolicy`]. A [`ErrorPolicy::SkipStep`]
//! failure becomes a warning plus a `skipped` entry and the pipeline continues.
//! An [`ErrorPolicy::AbortIngress`] failure stops at step 1; steps 5 and 6
//! still run so the report explains every annotation, and the error is
//! returned alongside the partial result. Route-compiler errors are always
//! downgraded to warnings.
//!
//! # Example
//!
//! ```rust
//! use k8s_openapi::api::networking::v1::Ingress;
//! use nginx2traefik::context::ConvertOptions;
//! use nginx2traefik::convert::convert_ingress;
//!
//! let mut ingress = Ingress::default();
//! ingress.metadata.name = Some("web".to_string());
//! ingress.metadata.annotations = Some(
//!     [("nginx.ingress.kubernetes.io/limit-rps".to_string(), "10".to_string())].into(),
//! );
//!
//! let conversion = convert_ingress(&ingress, &ConvertOptions::default(), None);
//! assert!(conversion.error.is_none());
//! assert_eq!(conversion.result.middlewares.len(), 1);
//! ```

use crate::annotations::{is_ecosystem_annotation, Annotation, CERT_MANAGER_PREFIX, NGINX_PREFIX};
use crate::certificates::{resolve_certificates, CertificateLookup};
use crate::constants::{
    KIND_CERTIFICATE, KIND_INGRESS_ROUTE, KIND_MIDDLEWARE, KIND_TLS_OPTION,
    REPORT_KEY_INGRESS_SPEC,
};
use crate::context::{ConversionContext, ConversionResult, ConvertOptions, Delta};
use crate::converters::{
    access, auth, buffering, cors, headers, passthrough, rate_limit, redirect, rewrite, snippet,
    tls,
};
use crate::errors::ConvertError;
use crate::metrics;
use crate::routes::compile_routes;
use crate::sequencer::sort_middlewares;
use k8s_openapi::api::networking::v1::Ingress;
use std::time::Instant;
use tracing::{debug, info, warn};

// ============================================================================
// Converter table
// ============================================================================

/// What a converter failure does to the rest of the Ingress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Record the failure and continue with the next converter
    SkipStep,
    /// Stop converting this Ingress
    AbortIngress,
}

pub type ConvertFn = fn(&ConversionContext<'_>) -> Result<Delta, ConvertError>;

/// One entry of the converter table.
pub struct Converter {
    pub name: &'static str,
    /// Annotations the converter consumes; it only runs when one is present
    pub keys: &'static [Annotation],
    pub run: ConvertFn,
    pub on_error: ErrorPolicy,
}

/// Directive converters in execution order.
pub const CONVERTERS: &[Converter] = &[
    Converter {
        name: "rewrite-target",
        keys: &[Annotation::RewriteTarget],
        run: rewrite::rewrite_target,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "ssl-redirect",
        keys: &[Annotation::SslRedirect, Annotation::ForceSslRedirect],
        run: redirect::ssl_redirect,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "basic-auth",
        keys: &[
            Annotation::AuthType,
            Annotation::AuthSecret,
            Annotation::AuthRealm,
        ],
        run: auth::basic_auth,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "forward-auth",
        keys: &[Annotation::AuthUrl],
        run: auth::forward_auth,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "cors",
        keys: &[
            Annotation::EnableCors,
            Annotation::CorsAllowOrigin,
            Annotation::CorsAllowMethods,
            Annotation::CorsAllowHeaders,
            Annotation::CorsAllowCredentials,
            Annotation::CorsMaxAge,
            Annotation::CorsExposeHeaders,
        ],
        run: cors::cors,
        on_error: ErrorPolicy::AbortIngress,
    },
    Converter {
        name: "rate-limit",
        keys: &[
            Annotation::LimitRps,
            Annotation::LimitRpm,
            Annotation::LimitBurstMultiplier,
        ],
        run: rate_limit::rate_limit,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "limit-connections",
        keys: &[Annotation::LimitConnections],
        run: rate_limit::limit_connections,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "body-size",
        keys: &[Annotation::ProxyBodySize],
        run: buffering::body_size,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "proxy-buffering",
        keys: &[Annotation::ProxyBuffering],
        run: buffering::proxy_buffering,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "whitelist-source-range",
        keys: &[Annotation::WhitelistSourceRange],
        run: access::whitelist_source_range,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "upstream-vhost",
        keys: &[Annotation::UpstreamVhost],
        run: headers::upstream_vhost,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "auth-tls",
        keys: &[Annotation::AuthTlsVerifyClient, Annotation::AuthTlsSecret],
        run: tls::auth_tls,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "configuration-snippet",
        keys: &[Annotation::ConfigurationSnippet],
        run: snippet::configuration_snippet,
        on_error: ErrorPolicy::SkipStep,
    },
    Converter {
        name: "non-translatable",
        keys: passthrough::KEYS,
        run: passthrough::non_translatable,
        on_error: ErrorPolicy::SkipStep,
    },
];

// ============================================================================
// Driver
// ============================================================================

/// Result of converting one Ingress.
#[derive(Debug)]
pub struct Conversion {
    /// Partial when `error` is set
    pub result: ConversionResult,
    /// The hard error that aborted the Ingress, if any
    pub error: Option<ConvertError>,
}

/// Run the full pipeline for `ctx`, folding every step into `result`.
///
/// `lookup` is `None` in offline mode.
///
/// # Errors
///
/// Returns the error of an [`ErrorPolicy::AbortIngress`] converter. `result`
/// still holds everything produced before the failure, and its report covers
/// every recognized annotation.
pub fn run(
    ctx: &ConversionContext<'_>,
    lookup: Option<&dyn CertificateLookup>,
    result: &mut ConversionResult,
) -> Result<(), ConvertError> {
    let outcome = run_converters(ctx, result);

    if outcome.is_ok() {
        sort_middlewares(&mut result.middlewares);
        build_routes(ctx, result);
        result.apply(resolve_certificates(ctx, lookup));
    }

    sweep_unknown(ctx, result);
    cover_recognized(ctx, result, outcome.is_err());

    outcome
}

fn run_converters(
    ctx: &ConversionContext<'_>,
    result: &mut ConversionResult,
) -> Result<(), ConvertError> {
    for converter in CONVERTERS {
        if !converter.keys.iter().any(|k| ctx.has(*k)) {
            continue;
        }
        debug!(ingress = %ctx.name, converter = converter.name, "Running converter");

        match (converter.run)(ctx) {
            Ok(delta) => result.apply(delta),
            Err(e) => {
                let mut delta = Delta::default();
                let key = failure_key(converter, &e);
                match converter.on_error {
                    ErrorPolicy::SkipStep => {
                        delta.skip_with_warning(
                            key,
                            format!("{} was not converted: {e}", converter.name),
                        );
                        result.apply(delta);
                    }
                    ErrorPolicy::AbortIngress => {
                        delta.skip_with_warning(
                            key,
                            format!(
                                "{} failed and conversion of this Ingress was aborted: {e}",
                                converter.name
                            ),
                        );
                        result.apply(delta);
                        return Err(e);
                    }
                }
            }
        }
    }
    Ok(())
}

fn failure_key(converter: &Converter, err: &ConvertError) -> String {
    err.annotation()
        .map(str::to_string)
        .or_else(|| converter.keys.first().map(|k| k.as_str().to_string()))
        .unwrap_or_else(|| REPORT_KEY_INGRESS_SPEC.to_string())
}

fn build_routes(ctx: &ConversionContext<'_>, result: &mut ConversionResult) {
    let tls_option = result.tls_option_for(&ctx.name).map(str::to_string);

    match compile_routes(ctx, &result.middlewares, tls_option.as_deref()) {
        Ok(delta) => result.apply(delta),
        Err(e) => {
            let key = e
                .annotation()
                .unwrap_or(REPORT_KEY_INGRESS_SPEC)
                .to_string();
            let mut delta = Delta::default();
            delta.skip_with_warning(key, format!("IngressRoute was not generated: {e}"));
            result.apply(delta);
        }
    }
}

/// Report annotations outside the vocabulary, in key order.
fn sweep_unknown(ctx: &ConversionContext<'_>, result: &mut ConversionResult) {
    let mut delta = Delta::default();
    for key in ctx.annotations.keys() {
        if Annotation::from_key(key).is_some() || result.report.has_entry(key) {
            continue;
        }
        if is_ecosystem_annotation(key) {
            // kubectl/Helm/Argo/Flux bookkeeping: no entry, no warning.
            debug!(ingress = %ctx.name, annotation = %key, "Ignoring tooling annotation");
        } else if key.starts_with(NGINX_PREFIX) {
            delta.skip_with_warning(
                key.as_str(),
                format!("annotation {key} has no converter; migrate it manually"),
            );
        } else if key.starts_with(CERT_MANAGER_PREFIX) {
            delta.ignored(
                key.as_str(),
                format!("annotation {key} is not carried into generated Certificates"),
            );
        }
    }
    result.apply(delta);
}

/// Give every present recognized annotation at least one entry.
fn cover_recognized(ctx: &ConversionContext<'_>, result: &mut ConversionResult, aborted: bool) {
    let reason = if aborted {
        "not processed because conversion of this Ingress was aborted"
    } else {
        "annotation had no effect on the generated resources"
    };
    let mut delta = Delta::default();
    for ann in Annotation::all() {
        if ctx.has(ann) && !result.report.has_entry(ann.as_str()) {
            delta.ignored(ann.as_str(), reason);
        }
    }
    result.apply(delta);
}

/// Convert one Ingress, recording metrics and logs.
///
/// Never fails: a hard error is returned in [`Conversion::error`] next to the
/// partial result.
#[must_use]
pub fn convert_ingress(
    ingress: &Ingress,
    options: &ConvertOptions,
    lookup: Option<&dyn CertificateLookup>,
) -> Conversion {
    let started = Instant::now();
    let ctx = ConversionContext::new(ingress, options);
    let mut result = ConversionResult::new(&ctx);

    let error = run(&ctx, lookup, &mut result).err();

    let outcome = if let Some(e) = &error {
        warn!(
            namespace = %ctx.namespace,
            ingress = %ctx.name,
            error = %e,
            "Ingress conversion aborted; partial output kept"
        );
        metrics::OUTCOME_ABORTED
    } else {
        info!(
            namespace = %ctx.namespace,
            ingress = %ctx.name,
            middlewares = result.middlewares.len(),
            ingress_routes = result.ingress_routes.len(),
            certificates = result.certificates.len(),
            warnings = result.warnings.len(),
            "Converted Ingress"
        );
        metrics::OUTCOME_CONVERTED
    };

    metrics::record_ingress(outcome, started.elapsed());
    for entry in result.report.entries() {
        metrics::record_annotation_outcome(entry.status);
    }
    metrics::record_resources_generated(KIND_MIDDLEWARE, result.middlewares.len());
    metrics::record_resources_generated(KIND_INGRESS_ROUTE, result.ingress_routes.len());
    metrics::record_resources_generated(KIND_TLS_OPTION, result.tls_options.len());
    metrics::record_resources_generated(KIND_CERTIFICATE, result.certificates.len());

    Conversion { result, error }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod convert_tests;
