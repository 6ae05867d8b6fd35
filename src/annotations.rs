// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation vocabulary recognised by the converter.
//!
//! The vocabulary is closed: every key the converter understands is a variant of
//! [`Annotation`]. Two families are recognised:
//!
//! - **ingress-nginx** annotations (`nginx.ingress.kubernetes.io/*`)
//! - **cert-manager** ingress-shim annotations (`cert-manager.io/*`)
//!
//! Anything else found on an Ingress is handled by the unknown-annotation sweep
//! in [`crate::convert`].
//!
//! # Example
//!
//! ```rust
//! use nginx2traefik::annotations::Annotation;
//!
//! let ann = Annotation::from_key("nginx.ingress.kubernetes.io/limit-rps");
//! assert_eq!(ann, Some(Annotation::LimitRps));
//! assert!(Annotation::LimitRps.is_nginx());
//! ```

use std::fmt;

// ============================================================================
// Annotation Prefixes
// ============================================================================

/// Prefix shared by every ingress-nginx annotation
pub const NGINX_PREFIX: &str = "nginx.ingress.kubernetes.io/";

/// Prefix shared by every cert-manager annotation
pub const CERT_MANAGER_PREFIX: &str = "cert-manager.io/";

/// Prefixes owned by unrelated tooling (kubectl, Helm, Argo CD, Flux, ...).
///
/// Annotations under these prefixes carry no routing behaviour and are ignored
/// without a report entry.
pub const IGNORED_ECOSYSTEM_PREFIXES: &[&str] = &[
    "kubectl.kubernetes.io/",
    "meta.helm.sh/",
    "helm.sh/",
    "argocd.argoproj.io/",
    "app.kubernetes.io/",
    "kubernetes.io/",
    "fluxcd.io/",
    "kustomize.toolkit.fluxcd.io/",
];

/// Every annotation key understood by the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Annotation {
    // Authentication
    AuthType,
    AuthSecret,
    AuthRealm,
    AuthUrl,
    AuthTlsVerifyClient,
    AuthTlsSecret,

    // Request shaping
    RewriteTarget,
    SslRedirect,
    ForceSslRedirect,
    UpstreamVhost,
    ProxyBodySize,
    ProxyBuffering,
    WhitelistSourceRange,

    // CORS
    EnableCors,
    CorsAllowOrigin,
    CorsAllowMethods,
    CorsAllowHeaders,
    CorsAllowCredentials,
    CorsMaxAge,
    CorsExposeHeaders,

    // Rate limiting
    LimitConnections,
    LimitRps,
    LimitRpm,
    LimitBurstMultiplier,

    // Snippets
    ConfigurationSnippet,
    ServerSnippet,

    // Backend and routing
    BackendProtocol,
    GrpcBackend,
    UseRegex,
    ServiceUpstream,

    // Proxy tuning without a per-route Traefik equivalent
    ProxyReadTimeout,
    ProxySendTimeout,
    ProxyBufferSize,
    ProxyRedirectFrom,
    ProxyRedirectTo,
    ProxyCookiePath,
    ClientHeaderBufferSize,
    LargeClientHeaderBuffers,
    UnderscoresInHeaders,

    // Observability
    EnableOpentracing,
    EnableOpentelemetry,

    // cert-manager
    CertManagerClusterIssuer,
    CertManagerIssuer,
    CertManagerIssuerKind,
    CertManagerIssuerGroup,
    CertManagerCommonName,
    CertManagerDuration,
    CertManagerRenewBefore,
}

impl Annotation {
    /// All ingress-nginx annotations, in vocabulary order.
    pub const NGINX: &'static [Annotation] = &[
        Annotation::AuthType,
        Annotation::AuthSecret,
        Annotation::AuthRealm,
        Annotation::AuthUrl,
        Annotation::AuthTlsVerifyClient,
        Annotation::AuthTlsSecret,
        Annotation::RewriteTarget,
        Annotation::SslRedirect,
        Annotation::ForceSslRedirect,
        Annotation::UpstreamVhost,
        Annotation::ProxyBodySize,
        Annotation::ProxyBuffering,
        Annotation::WhitelistSourceRange,
        Annotation::EnableCors,
        Annotation::CorsAllowOrigin,
        Annotation::CorsAllowMethods,
        Annotation::CorsAllowHeaders,
        Annotation::CorsAllowCredentials,
        Annotation::CorsMaxAge,
        Annotation::CorsExposeHeaders,
        Annotation::LimitConnections,
        Annotation::LimitRps,
        Annotation::LimitRpm,
        Annotation::LimitBurstMultiplier,
        Annotation::ConfigurationSnippet,
        Annotation::ServerSnippet,
        Annotation::BackendProtocol,
        Annotation::GrpcBackend,
        Annotation::UseRegex,
        Annotation::ServiceUpstream,
        Annotation::ProxyReadTimeout,
        Annotation::ProxySendTimeout,
        Annotation::ProxyBufferSize,
        Annotation::ProxyRedirectFrom,
        Annotation::ProxyRedirectTo,
        Annotation::ProxyCookiePath,
        Annotation::ClientHeaderBufferSize,
        Annotation::LargeClientHeaderBuffers,
        Annotation::UnderscoresInHeaders,
        Annotation::EnableOpentracing,
        Annotation::EnableOpentelemetry,
    ];

    /// All cert-manager annotations used to extract or generate Certificates.
    pub const CERT_MANAGER: &'static [Annotation] = &[
        Annotation::CertManagerClusterIssuer,
        Annotation::CertManagerIssuer,
        Annotation::CertManagerIssuerKind,
        Annotation::CertManagerIssuerGroup,
        Annotation::CertManagerCommonName,
        Annotation::CertManagerDuration,
        Annotation::CertManagerRenewBefore,
    ];

    /// Full annotation key as it appears in `metadata.annotations`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Annotation::AuthType => "nginx.ingress.kubernetes.io/auth-type",
            Annotation::AuthSecret => "nginx.ingress.kubernetes.io/auth-secret",
            Annotation::AuthRealm => "nginx.ingress.kubernetes.io/auth-realm",
            Annotation::AuthUrl => "nginx.ingress.kubernetes.io/auth-url",
            Annotation::AuthTlsVerifyClient => "nginx.ingress.kubernetes.io/auth-tls-verify-client",
            Annotation::AuthTlsSecret => "nginx.ingress.kubernetes.io/auth-tls-secret",
            Annotation::RewriteTarget => "nginx.ingress.kubernetes.io/rewrite-target",
            Annotation::SslRedirect => "nginx.ingress.kubernetes.io/ssl-redirect",
            Annotation::ForceSslRedirect => "nginx.ingress.kubernetes.io/force-ssl-redirect",
            Annotation::UpstreamVhost => "nginx.ingress.kubernetes.io/upstream-vhost",
            Annotation::ProxyBodySize => "nginx.ingress.kubernetes.io/proxy-body-size",
            Annotation::ProxyBuffering => "nginx.ingress.kubernetes.io/proxy-buffering",
            Annotation::WhitelistSourceRange => {
                "nginx.ingress.kubernetes.io/whitelist-source-range"
            }
            Annotation::EnableCors => "nginx.ingress.kubernetes.io/enable-cors",
            Annotation::CorsAllowOrigin => "nginx.ingress.kubernetes.io/cors-allow-origin",
            Annotation::CorsAllowMethods => "nginx.ingress.kubernetes.io/cors-allow-methods",
            Annotation::CorsAllowHeaders => "nginx.ingress.kubernetes.io/cors-allow-headers",
            Annotation::CorsAllowCredentials => {
                "nginx.ingress.kubernetes.io/cors-allow-credentials"
            }
            Annotation::CorsMaxAge => "nginx.ingress.kubernetes.io/cors-max-age",
            Annotation::CorsExposeHeaders => "nginx.ingress.kubernetes.io/cors-expose-headers",
            Annotation::LimitConnections => "nginx.ingress.kubernetes.io/limit-connections",
            Annotation::LimitRps => "nginx.ingress.kubernetes.io/limit-rps",
            Annotation::LimitRpm => "nginx.ingress.kubernetes.io/limit-rpm",
            Annotation::LimitBurstMultiplier => {
                "nginx.ingress.kubernetes.io/limit-burst-multiplier"
            }
            Annotation::ConfigurationSnippet => "nginx.ingress.kubernetes.io/configuration-snippet",
            Annotation::ServerSnippet => "nginx.ingress.kubernetes.io/server-snippet",
            Annotation::BackendProtocol => "nginx.ingress.kubernetes.io/backend-protocol",
            Annotation::GrpcBackend => "nginx.ingress.kubernetes.io/grpc-backend",
            Annotation::UseRegex => "nginx.ingress.kubernetes.io/use-regex",
            Annotation::ServiceUpstream => "nginx.ingress.kubernetes.io/service-upstream",
            Annotation::ProxyReadTimeout => "nginx.ingress.kubernetes.io/proxy-read-timeout",
            Annotation::ProxySendTimeout => "nginx.ingress.kubernetes.io/proxy-send-timeout",
            Annotation::ProxyBufferSize => "nginx.ingress.kubernetes.io/proxy-buffer-size",
            Annotation::ProxyRedirectFrom => "nginx.ingress.kubernetes.io/proxy-redirect-from",
            Annotation::ProxyRedirectTo => "nginx.ingress.kubernetes.io/proxy-redirect-to",
            Annotation::ProxyCookiePath => "nginx.ingress.kubernetes.io/proxy-cookie-path",
            Annotation::ClientHeaderBufferSize => {
                "nginx.ingress.kubernetes.io/client-header-buffer-size"
            }
            Annotation::LargeClientHeaderBuffers => {
                "nginx.ingress.kubernetes.io/large-client-header-buffers"
            }
            Annotation::UnderscoresInHeaders => {
                "nginx.ingress.kubernetes.io/enable-underscores-in-headers"
            }
            Annotation::EnableOpentracing => "nginx.ingress.kubernetes.io/enable-opentracing",
            Annotation::EnableOpentelemetry => "nginx.ingress.kubernetes.io/enable-opentelemetry",
            Annotation::CertManagerClusterIssuer => "cert-manager.io/cluster-issuer",
            Annotation::CertManagerIssuer => "cert-manager.io/issuer",
            Annotation::CertManagerIssuerKind => "cert-manager.io/issuer-kind",
            Annotation::CertManagerIssuerGroup => "cert-manager.io/issuer-group",
            Annotation::CertManagerCommonName => "cert-manager.io/common-name",
            Annotation::CertManagerDuration => "cert-manager.io/duration",
            Annotation::CertManagerRenewBefore => "cert-manager.io/renew-before",
        }
    }

    /// Iterate over the whole vocabulary (ingress-nginx first, then cert-manager).
    pub fn all() -> impl Iterator<Item = Annotation> {
        Self::NGINX
            .iter()
            .chain(Self::CERT_MANAGER.iter())
            .copied()
    }

    /// Resolve a raw annotation key to a vocabulary entry.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Annotation> {
        Self::all().find(|a| a.as_str() == key)
    }

    /// Whether this annotation belongs to the ingress-nginx family.
    #[must_use]
    pub fn is_nginx(self) -> bool {
        self.as_str().starts_with(NGINX_PREFIX)
    }

    /// Whether this annotation belongs to the cert-manager family.
    #[must_use]
    pub fn is_cert_manager(self) -> bool {
        self.as_str().starts_with(CERT_MANAGER_PREFIX)
    }

    /// Key without its family prefix, e.g. `limit-rps`.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        let key = self.as_str();
        key.split_once('/').map_or(key, |(_, name)| name)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a key falls under one of the [`IGNORED_ECOSYSTEM_PREFIXES`].
#[must_use]
pub fn is_ecosystem_annotation(key: &str) -> bool {
    IGNORED_ECOSYSTEM_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

#[cfg(test)]
#[path = "annotations_tests.rs"]
mod annotations_tests;
