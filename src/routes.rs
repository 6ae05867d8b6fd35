// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route compiler: Ingress rules to a single `IngressRoute`.
//!
//! Runs once per Ingress after the middleware chain is sequenced:
//!
//! 1. Resolve the backend scheme for the whole Ingress (`backend-protocol`,
//!    `grpc-backend`).
//! 2. Build a match expression per path: `Host(...)` plus one of `Path`,
//!    `PathPrefix` or `PathRegexp`.
//! 3. Drop paths whose [`RouteKey`] was already seen.
//! 4. Choose entry points per [`EntryPointPolicy`].
//!
//! # Regex handling
//!
//! With `use-regex: "true"` every path is anchored with `^` and compiled; a
//! path that fails to compile falls back to `PathPrefix` with a warning.
//! Without the annotation, a conservative metacharacter heuristic
//! ([`looks_like_regex`]) promotes likely-regex paths to `PathRegexp` with a
//! warning, and flags paths that look like regex but do not compile. The
//! heuristic errs toward manual review: a literal path containing `{2}` is
//! promoted and reported.

use crate::annotations::Annotation;
use crate::constants::{
    REPORT_KEY_INGRESS_SPEC, REPORT_KEY_PATH_REGEX_HEURISTIC, ROOT_PATH, ROUTE_KIND_RULE,
    SCHEME_H2C, SCHEME_HTTP, SCHEME_HTTPS,
};
use crate::context::{ConversionContext, Delta, EntryPointPolicy};
use crate::crd::{
    IngressRoute, IngressRouteSpec, IngressRouteTls, Middleware, MiddlewareRef, Route,
    RouteService, TlsOptionRef,
};
use crate::errors::ConvertError;
use k8s_openapi::api::networking::v1::{IngressBackend, ServiceBackendPort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Metacharacter sequences that never appear in an ordinary URL path.
///
/// `.*`, `.+`, `(?:`, character classes, escaped classes (`\d`, `\.`),
/// counted quantifiers (`{2}`, `{1,3}`) and alternation not adjacent to `/`.
static REGEX_METACHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\*|\.\+|\(\?[:]|\[[^\]]+\]|\\[dDwWsS.]|\{\d+,?\d*\}|[^/]\|[^/]").unwrap()
});

/// Whether a path contains regex metacharacters.
#[must_use]
pub fn looks_like_regex(path: &str) -> bool {
    REGEX_METACHARS.is_match(path)
}

// ============================================================================
// Backend scheme
// ============================================================================

/// Resolve the Ingress-wide backend scheme.
///
/// | `backend-protocol` | `grpc-backend: true` | scheme |
/// |---|---|---|
/// | unset | no | `http` |
/// | unset | yes | `h2c` |
/// | `HTTP` | any | `http` (explicit value wins) |
/// | `HTTPS` / `GRPCS` | any | `https` |
/// | `GRPC` | any | `h2c` |
///
/// Report entries for both annotations are added to `delta`.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedBackendProtocol`] for any other protocol
/// (`AJP`, `FCGI`, ...).
pub fn resolve_scheme(
    ctx: &ConversionContext<'_>,
    delta: &mut Delta,
) -> Result<&'static str, ConvertError> {
    let protocol = ctx
        .annotation(Annotation::BackendProtocol)
        .map(|p| p.trim().to_ascii_uppercase());
    let grpc = ctx.is_true(Annotation::GrpcBackend);

    let scheme = match protocol.as_deref() {
        None | Some("") => {
            if grpc {
                SCHEME_H2C
            } else {
                SCHEME_HTTP
            }
        }
        Some("HTTP") => SCHEME_HTTP,
        Some("HTTPS" | "GRPCS") => SCHEME_HTTPS,
        Some("GRPC") => SCHEME_H2C,
        Some(other) => {
            return Err(ConvertError::UnsupportedBackendProtocol {
                value: other.to_string(),
            })
        }
    };

    if ctx.has(Annotation::BackendProtocol) {
        delta.converted(Annotation::BackendProtocol.as_str());
    }
    if ctx.has(Annotation::GrpcBackend) {
        let key = Annotation::GrpcBackend.as_str();
        if !grpc {
            delta.ignored(key, "grpc-backend is not set to true");
        } else if protocol.as_deref() == Some("HTTP") {
            delta.warn_entry(
                key,
                "grpc-backend=true conflicts with backend-protocol=HTTP; the explicit backend-protocol wins and the backend is reached over HTTP/1.1",
            );
        } else {
            delta.converted(key);
        }
    }

    Ok(scheme)
}

// ============================================================================
// Match construction
// ============================================================================

/// How a path's match expression was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathShape {
    /// From the declared `pathType`
    Declared,
    /// `use-regex` is set and the path compiled
    Regex,
    /// `use-regex` is set but the path did not compile
    RegexFallback,
    /// Promoted to `PathRegexp` by the heuristic
    Promoted,
    /// Looks like a regex but did not compile; kept as `PathPrefix`
    RegexLike,
}

/// Match expression for a single path.
#[must_use]
pub fn build_path_match(path: &str, path_type: &str, use_regex: bool) -> (String, PathShape) {
    let path = if path.is_empty() { ROOT_PATH } else { path };

    if use_regex {
        return match anchored_regex(path) {
            Some(expr) => (expr, PathShape::Regex),
            None => (prefix(path), PathShape::RegexFallback),
        };
    }

    if looks_like_regex(path) {
        return match anchored_regex(path) {
            Some(expr) => (expr, PathShape::Promoted),
            None => (prefix(path), PathShape::RegexLike),
        };
    }

    let expr = match path_type {
        "Exact" => format!("Path(`{path}`)"),
        _ => prefix(path),
    };
    (expr, PathShape::Declared)
}

fn prefix(path: &str) -> String {
    format!("PathPrefix(`{path}`)")
}

fn anchored_regex(path: &str) -> Option<String> {
    let anchored = if path.starts_with('^') {
        path.to_string()
    } else {
        format!("^{path}")
    };
    Regex::new(&anchored)
        .ok()
        .map(|_| format!("PathRegexp(`{anchored}`)"))
}

/// Host match. Wildcard hosts (`*.example.com`) become `HostRegexp`.
#[must_use]
pub fn build_host_match(host: &str) -> String {
    if host.is_empty() {
        return String::new();
    }
    match host.strip_prefix("*.") {
        Some(rest) => format!("HostRegexp(`^[^.]+\\.{}$`)", regex::escape(rest)),
        None => format!("Host(`{host}`)"),
    }
}

/// Join host and path matches; an empty result matches everything.
#[must_use]
pub fn combine_match(host_match: &str, path_match: &str) -> String {
    match (host_match.is_empty(), path_match.is_empty()) {
        (false, false) => format!("{host_match} && {path_match}"),
        (false, true) => host_match.to_string(),
        (true, false) => path_match.to_string(),
        (true, true) => prefix(ROOT_PATH),
    }
}

// ============================================================================
// Route identity
// ============================================================================

/// Identity of a compiled route. Paths with equal keys collapse to one route.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub host: String,
    pub path: String,
    pub path_type: String,
    pub use_regex: bool,
    pub service: String,
    pub port: String,
    pub scheme: String,
}

/// Service port: the number when non-zero, otherwise the port name.
#[must_use]
pub fn service_port(port: Option<&ServiceBackendPort>) -> IntOrString {
    match port {
        Some(ServiceBackendPort {
            number: Some(n), ..
        }) if *n != 0 => IntOrString::Int(*n),
        Some(ServiceBackendPort { name: Some(n), .. }) if !n.is_empty() => {
            IntOrString::String(n.clone())
        }
        _ => IntOrString::Int(0),
    }
}

fn port_string(port: &IntOrString) -> String {
    match port {
        IntOrString::Int(n) => n.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// IngressRoute name under the given policy.
#[must_use]
pub fn ingress_route_name(base: &str, scheme: &str, policy: EntryPointPolicy) -> String {
    match (policy, scheme) {
        (EntryPointPolicy::BackendScheme, SCHEME_H2C) => format!("{base}-grpc"),
        (EntryPointPolicy::BackendScheme, SCHEME_HTTPS) => format!("{base}-https"),
        _ => base.to_string(),
    }
}

fn entry_points(ctx: &ConversionContext<'_>, scheme: &str) -> Vec<String> {
    let secure = match ctx.options.entry_point_policy {
        EntryPointPolicy::Tls => ctx.has_tls(),
        EntryPointPolicy::BackendScheme => scheme == SCHEME_HTTPS,
    };
    if secure {
        vec![ctx.options.secure_entry_point.clone()]
    } else {
        vec![ctx.options.web_entry_point.clone()]
    }
}

/// Compile the Ingress into one IngressRoute referencing `middlewares` in order.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedBackendProtocol`] when the backend scheme
/// cannot be resolved. No route is produced in that case.
pub fn compile_routes(
    ctx: &ConversionContext<'_>,
    middlewares: &[Middleware],
    tls_option: Option<&str>,
) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let scheme = resolve_scheme(ctx, &mut delta)?;
    let use_regex = ctx.is_true(Annotation::UseRegex);

    let refs: Vec<MiddlewareRef> = middlewares
        .iter()
        .filter_map(|m| m.metadata.name.clone())
        .map(|name| MiddlewareRef {
            name,
            namespace: None,
        })
        .collect();

    let mut compiler = RouteCompiler {
        ctx,
        scheme,
        use_regex,
        refs,
        seen: HashSet::new(),
        routes: Vec::new(),
        regex_failures: Vec::new(),
    };

    let spec = ctx.ingress.spec.as_ref();
    for rule in spec.and_then(|s| s.rules.as_ref()).into_iter().flatten() {
        let host = rule.host.as_deref().unwrap_or_default();
        let Some(http) = rule.http.as_ref() else {
            continue;
        };
        for path in &http.paths {
            compiler.add_path(
                &mut delta,
                host,
                path.path.as_deref().unwrap_or_default(),
                &path.path_type,
                &path.backend,
            );
        }
    }
    if let Some(backend) = spec.and_then(|s| s.default_backend.as_ref()) {
        compiler.add_path(&mut delta, "", ROOT_PATH, "Prefix", backend);
    }

    let RouteCompiler {
        routes,
        regex_failures,
        ..
    } = compiler;

    report_use_regex(ctx, &regex_failures, &mut delta);

    if routes.is_empty() {
        delta.warn(format!(
            "Ingress {}/{} has no service-backed paths; no IngressRoute was generated",
            ctx.namespace, ctx.name
        ));
        return Ok(delta);
    }

    let name = ingress_route_name(&ctx.name, scheme, ctx.options.entry_point_policy);
    debug!(
        ingress = %ctx.name,
        ingress_route = %name,
        routes = routes.len(),
        scheme,
        "Compiled IngressRoute"
    );

    let mut ingress_route = IngressRoute::new(
        &name,
        IngressRouteSpec {
            entry_points: entry_points(ctx, scheme),
            routes,
            tls: route_tls(ctx, tls_option, &mut delta),
        },
    );
    ingress_route.metadata.namespace = Some(ctx.namespace.clone());
    delta.ingress_routes.push(ingress_route);

    Ok(delta)
}

struct RouteCompiler<'c, 'a> {
    ctx: &'c ConversionContext<'a>,
    scheme: &'static str,
    use_regex: bool,
    refs: Vec<MiddlewareRef>,
    seen: HashSet<RouteKey>,
    routes: Vec<Route>,
    regex_failures: Vec<String>,
}

impl RouteCompiler<'_, '_> {
    fn add_path(
        &mut self,
        delta: &mut Delta,
        host: &str,
        raw_path: &str,
        path_type: &str,
        backend: &IngressBackend,
    ) {
        let Some(service) = backend.service.as_ref() else {
            delta.skip_with_warning(
                REPORT_KEY_INGRESS_SPEC,
                format!(
                    "path '{raw_path}' of Ingress {}/{} uses a resource backend; IngressRoutes only route to Services",
                    self.ctx.namespace, self.ctx.name
                ),
            );
            return;
        };

        let port = service_port(service.port.as_ref());
        let key = RouteKey {
            host: host.to_string(),
            path: raw_path.to_string(),
            path_type: if path_type.is_empty() {
                "Prefix".to_string()
            } else {
                path_type.to_string()
            },
            use_regex: self.use_regex,
            service: service.name.clone(),
            port: port_string(&port),
            scheme: self.scheme.to_string(),
        };
        if !self.seen.insert(key) {
            return;
        }

        let (path_match, shape) = build_path_match(raw_path, path_type, self.use_regex);
        match shape {
            PathShape::RegexFallback => {
                let msg = format!(
                    "use-regex is set but path '{raw_path}' is not a valid regex for Traefik; fell back to PathPrefix"
                );
                delta.warn(msg);
                self.regex_failures.push(raw_path.to_string());
            }
            PathShape::Promoted => delta.warn_entry(
                REPORT_KEY_PATH_REGEX_HEURISTIC,
                format!(
                    "path '{raw_path}' contains regex patterns without use-regex annotation; auto-promoted to PathRegexp, verify behavior"
                ),
            ),
            PathShape::RegexLike => delta.skip_with_warning(
                REPORT_KEY_PATH_REGEX_HEURISTIC,
                format!(
                    "path '{raw_path}' contains regex-like characters but is not a valid regex; fell back to PathPrefix, manual conversion required"
                ),
            ),
            PathShape::Declared | PathShape::Regex => {}
        }

        self.routes.push(Route {
            kind: ROUTE_KIND_RULE.to_string(),
            r#match: combine_match(&build_host_match(host), &path_match),
            services: vec![RouteService {
                name: service.name.clone(),
                port,
                scheme: Some(self.scheme.to_string()),
            }],
            middlewares: self.refs.clone(),
        });
    }
}

/// Exactly one report entry for `use-regex` when it is present.
fn report_use_regex(ctx: &ConversionContext<'_>, failures: &[String], delta: &mut Delta) {
    if !ctx.has(Annotation::UseRegex) {
        return;
    }
    let key = Annotation::UseRegex.as_str();
    if !ctx.is_true(Annotation::UseRegex) {
        delta.ignored(key, "use-regex is not set to true");
    } else if failures.is_empty() {
        delta.converted(key);
    } else {
        delta.warned(
            key,
            format!(
                "paths fell back to PathPrefix because they are not valid regexes: {}",
                failures.join(", ")
            ),
        );
    }
}

/// TLS block: first non-empty secret plus the TLSOption reference.
fn route_tls(
    ctx: &ConversionContext<'_>,
    tls_option: Option<&str>,
    delta: &mut Delta,
) -> Option<IngressRouteTls> {
    let mut secrets: Vec<&str> = Vec::new();
    let entries = ctx
        .ingress
        .spec
        .as_ref()
        .and_then(|s| s.tls.as_ref())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for entry in entries {
        if let Some(secret) = entry.secret_name.as_deref().filter(|s| !s.is_empty()) {
            if !secrets.contains(&secret) {
                secrets.push(secret);
            }
        }
    }

    if secrets.len() > 1 {
        delta.warn_entry(
            REPORT_KEY_INGRESS_SPEC,
            format!(
                "Ingress {}/{} declares {} TLS secrets; the IngressRoute uses '{}', Traefik selects other certificates by SNI from TLSStore or other routes",
                ctx.namespace,
                ctx.name,
                secrets.len(),
                secrets[0]
            ),
        );
    }

    if entries.is_empty() && tls_option.is_none() {
        return None;
    }

    Some(IngressRouteTls {
        secret_name: secrets.first().map(|s| (*s).to_string()),
        options: tls_option.map(|name| TlsOptionRef {
            name: name.to_string(),
            namespace: None,
        }),
    })
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod routes_tests;
