// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Traefik Custom Resource Definitions produced by the converter.
//!
//! Only the subset of the `traefik.io/v1alpha1` schema that the converter can
//! emit is modelled here. Every optional field is skipped when unset so that the
//! rendered YAML stays minimal and reviewable.
//!
//! # Resource Types
//!
//! - [`Middleware`] - Named request/response transformation unit
//! - [`IngressRoute`] - Compiled routing rules with ordered middleware references
//! - [`TLSOption`] - Named TLS policy (client-certificate verification)
//!
//! # Example: Building a Middleware
//!
//! ```rust
//! use nginx2traefik::crd::{Middleware, MiddlewareSpec, RedirectScheme};
//!
//! let spec = MiddlewareSpec {
//!     redirect_scheme: Some(RedirectScheme {
//!         scheme: "https".to_string(),
//!         permanent: Some(true),
//!     }),
//!     ..Default::default()
//! };
//!
//! let mw = Middleware::new("web-https-redirect", spec);
//! assert_eq!(mw.metadata.name.as_deref(), Some("web-https-redirect"));
//! ```

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Middleware
// ============================================================================

/// Traefik `Middleware` specification.
///
/// Exactly one block is expected to be set per middleware.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "traefik.io",
    version = "v1alpha1",
    kind = "Middleware",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_auth: Option<ForwardAuth>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_path_regex: Option<ReplacePathRegex>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_scheme: Option<RedirectScheme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight_req: Option<InFlightReq>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffering: Option<Buffering>,

    #[serde(rename = "ipAllowList", skip_serializing_if = "Option::is_none")]
    pub ip_allow_list: Option<IpAllowList>,
}

/// Header injection and CORS policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Headers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_request_headers: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_response_headers: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_allow_origin_list: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_allow_methods: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_allow_headers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_allow_credentials: Option<bool>,

    /// Preflight cache duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_max_age: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control_expose_headers: Option<Vec<String>>,
}

/// HTTP basic authentication backed by a Kubernetes secret.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    pub secret: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
}

/// Delegated authentication against an external service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwardAuth {
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePathRegex {
    pub regex: String,
    pub replacement: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedirectScheme {
    pub scheme: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,
}

/// Token-bucket rate limiting.
///
/// `average` requests per `period` (Traefik defaults the period to one second),
/// with `burst` extra requests allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub average: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<IntOrString>,

    pub burst: i64,
}

/// Concurrent request limiting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InFlightReq {
    pub amount: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_criterion: Option<SourceCriterion>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceCriterion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_strategy: Option<IpStrategy>,
}

/// Client IP extraction strategy. Empty means "use the remote address".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IpStrategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
}

/// Request/response buffering. An empty block enables buffering with defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Buffering {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_request_body_bytes: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IpAllowList {
    pub source_range: Vec<String>,
}

// ============================================================================
// IngressRoute
// ============================================================================

/// Traefik `IngressRoute` specification.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "traefik.io",
    version = "v1alpha1",
    kind = "IngressRoute",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct IngressRouteSpec {
    pub entry_points: Vec<String>,

    pub routes: Vec<Route>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<IngressRouteTls>,
}

/// A single routing rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Always `Rule`
    pub kind: String,

    /// Traefik rule expression, e.g. ``Host(`a.example.com`) && PathPrefix(`/api`)``
    #[serde(rename = "match")]
    pub r#match: String,

    pub services: Vec<RouteService>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<MiddlewareRef>,
}

/// Kubernetes Service backend of a route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteService {
    pub name: String,

    pub port: IntOrString,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareRef {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRouteTls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TlsOptionRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TlsOptionRef {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// ============================================================================
// TLSOption
// ============================================================================

/// Traefik `TLSOption` specification.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "traefik.io",
    version = "v1alpha1",
    kind = "TLSOption",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct TLSOptionSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_auth: Option<ClientAuth>,
}

/// Client certificate verification policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientAuth {
    /// Secrets holding the CA bundle used to verify client certificates
    pub secret_names: Vec<String>,

    /// One of `NoClientCert`, `RequestClientCert`, `RequireAnyClientCert`,
    /// `VerifyClientCertIfGiven`, `RequireAndVerifyClientCert`
    pub client_auth_type: String,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
