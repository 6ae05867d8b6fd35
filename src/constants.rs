// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the nginx2traefik converter.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Traefik API Constants
// ============================================================================

/// API group for all Traefik CRDs
pub const TRAEFIK_API_GROUP: &str = "traefik.io";

/// API version for all Traefik CRDs
pub const TRAEFIK_API_VERSION: &str = "v1alpha1";

/// Kind name for Traefik `Middleware` resource
pub const KIND_MIDDLEWARE: &str = "Middleware";

/// Kind name for Traefik `IngressRoute` resource
pub const KIND_INGRESS_ROUTE: &str = "IngressRoute";

/// Kind name for Traefik `TLSOption` resource
pub const KIND_TLS_OPTION: &str = "TLSOption";

/// Route kind used for every generated IngressRoute rule
pub const ROUTE_KIND_RULE: &str = "Rule";

// ============================================================================
// cert-manager API Constants
// ============================================================================

/// API group for cert-manager resources
pub const CERT_MANAGER_API_GROUP: &str = "cert-manager.io";

/// API version for cert-manager resources
pub const CERT_MANAGER_API_VERSION: &str = "v1";

/// Kind name for cert-manager `Certificate` resource
pub const KIND_CERTIFICATE: &str = "Certificate";

/// Plural resource name for cert-manager `Certificate`
pub const CERTIFICATE_PLURAL: &str = "certificates";

/// Issuer group used when `cert-manager.io/issuer-group` is not set
pub const DEFAULT_ISSUER_GROUP: &str = "cert-manager.io";

/// Issuer kind used for namespaced issuers when `cert-manager.io/issuer-kind` is not set
pub const DEFAULT_ISSUER_KIND: &str = "Issuer";

/// Issuer kind used for `cert-manager.io/cluster-issuer`
pub const CLUSTER_ISSUER_KIND: &str = "ClusterIssuer";

// ============================================================================
// Entry Point Constants
// ============================================================================

/// Plaintext HTTP entry point
pub const ENTRY_POINT_WEB: &str = "web";

/// TLS entry point
pub const ENTRY_POINT_WEBSECURE: &str = "websecure";

// ============================================================================
// Backend Scheme Constants
// ============================================================================

/// Cleartext HTTP/1.1 backend
pub const SCHEME_HTTP: &str = "http";

/// TLS backend
pub const SCHEME_HTTPS: &str = "https";

/// Cleartext HTTP/2 backend (gRPC without TLS)
pub const SCHEME_H2C: &str = "h2c";

// ============================================================================
// Conversion Defaults
// ============================================================================

/// ingress-nginx burst multiplier applied when `limit-burst-multiplier` is not set
pub const DEFAULT_BURST_MULTIPLIER: u32 = 5;

/// Rate-limit period for `limit-rpm`
pub const RATE_LIMIT_MINUTE_PERIOD: &str = "1m";

/// Regex used by the rewrite-target middleware
pub const REWRITE_CAPTURE_ALL_REGEX: &str = "^(.*)";

/// Path used when an ingress path is empty and for default-backend routes
pub const ROOT_PATH: &str = "/";

// ============================================================================
// Middleware Name Suffixes
// ============================================================================

pub const MW_SUFFIX_REWRITE: &str = "rewrite";
pub const MW_SUFFIX_HTTPS_REDIRECT: &str = "https-redirect";
pub const MW_SUFFIX_BASIC_AUTH: &str = "basicauth";
pub const MW_SUFFIX_FORWARD_AUTH: &str = "forwardauth";
pub const MW_SUFFIX_CORS: &str = "cors";
pub const MW_SUFFIX_RATE_LIMIT: &str = "ratelimit";
pub const MW_SUFFIX_RATE_LIMIT_RPM: &str = "ratelimit-rpm";
pub const MW_SUFFIX_IN_FLIGHT_REQ: &str = "inflightreq";
pub const MW_SUFFIX_BODY_SIZE: &str = "bodysize";
pub const MW_SUFFIX_BUFFERING: &str = "buffering";
pub const MW_SUFFIX_IP_ALLOW_LIST: &str = "ipallowlist";
pub const MW_SUFFIX_UPSTREAM_VHOST: &str = "upstream-vhost";
pub const MW_SUFFIX_SNIPPET_HEADERS: &str = "snippet-headers";

/// Suffix of the TLSOption generated for client-certificate verification
pub const TLS_OPTION_SUFFIX_MTLS: &str = "mtls";

// ============================================================================
// Report Pseudo-Keys
// ============================================================================

/// Report key for Certificate extraction/generation outcomes
pub const REPORT_KEY_CERTIFICATE: &str = "cert-manager/certificate";

/// Report key for the regex-promotion heuristic on paths
pub const REPORT_KEY_PATH_REGEX_HEURISTIC: &str = "path-regex-heuristic";

/// Report key for ingress spec-level observations (default backend, TLS entries)
pub const REPORT_KEY_INGRESS_SPEC: &str = "ingress/spec";

// ============================================================================
// Kubernetes Client Constants
// ============================================================================

/// Page size for paginated list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

/// Namespace assumed for manifests that do not declare one
pub const DEFAULT_NAMESPACE: &str = "default";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Default output directory for generated manifests
pub const DEFAULT_OUTPUT_DIR: &str = "./out";
