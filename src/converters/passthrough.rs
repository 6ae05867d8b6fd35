// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotations without a per-route Traefik equivalent.
//!
//! Nothing is generated; each present annotation is reported with guidance on
//! where the setting lives in Traefik.

use crate::annotations::Annotation;
use crate::context::{ConversionContext, Delta};
use crate::errors::ConvertError;

/// Annotations this converter reports on.
pub const KEYS: &[Annotation] = &[
    Annotation::ProxyReadTimeout,
    Annotation::ProxySendTimeout,
    Annotation::ProxyBufferSize,
    Annotation::ClientHeaderBufferSize,
    Annotation::LargeClientHeaderBuffers,
    Annotation::EnableOpentracing,
    Annotation::EnableOpentelemetry,
    Annotation::ProxyRedirectFrom,
    Annotation::ProxyRedirectTo,
    Annotation::ProxyCookiePath,
    Annotation::ServerSnippet,
    Annotation::ServiceUpstream,
    Annotation::UnderscoresInHeaders,
];

/// Report outcome for an annotation that is never translated.
enum Guidance {
    /// Needs manual work; reported skipped with a warning
    Manual(&'static str),
    /// No effect in Traefik; reported ignored
    NoEffect(&'static str),
}

fn guidance(ann: Annotation, value: &str) -> Option<Guidance> {
    let g = match ann {
        Annotation::ProxyReadTimeout => Guidance::Manual(
            "proxy-read-timeout cannot be set per-route in Traefik; configure via ServersTransport forwardingTimeouts.responseHeaderTimeout in dynamic config",
        ),
        Annotation::ProxySendTimeout => Guidance::Manual(
            "proxy-send-timeout cannot be set per-route in Traefik; configure via ServersTransport forwardingTimeouts in dynamic config",
        ),
        Annotation::ProxyBufferSize => Guidance::Manual(
            "proxy-buffer-size has no per-route equivalent; Traefik buffer sizes are part of the static configuration",
        ),
        Annotation::ClientHeaderBufferSize | Annotation::LargeClientHeaderBuffers => {
            Guidance::Manual(
                "client header buffer sizes are set on the entry point (entryPoints.<name>.transport) in Traefik static configuration",
            )
        }
        Annotation::EnableOpentracing | Annotation::EnableOpentelemetry => Guidance::Manual(
            "tracing is configured globally in Traefik static configuration (tracing.otlp)",
        ),
        Annotation::ProxyRedirectFrom | Annotation::ProxyRedirectTo => Guidance::Manual(
            "Location header rewriting has no Traefik middleware; rewrite redirects in the backend or with a plugin",
        ),
        Annotation::ProxyCookiePath => Guidance::Manual(
            "cookie path rewriting has no Traefik middleware; adjust the backend's Set-Cookie path",
        ),
        Annotation::ServerSnippet => Guidance::Manual(
            "server-snippet injects raw nginx server configuration and cannot be converted",
        ),
        Annotation::ServiceUpstream => {
            if value.trim().eq_ignore_ascii_case("true") {
                Guidance::NoEffect(
                    "service-upstream has no direct equivalent; set nativeLB: true on the IngressRoute service to route through the ClusterIP",
                )
            } else {
                Guidance::NoEffect("service-upstream=false matches Traefik's default endpoint routing")
            }
        }
        Annotation::UnderscoresInHeaders => Guidance::NoEffect(
            "Traefik forwards headers containing underscores without extra configuration",
        ),
        _ => return None,
    };
    Some(g)
}

/// Report every present annotation that has no per-route translation.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn non_translatable(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();

    for ann in KEYS {
        let Some(value) = ctx.annotation(*ann) else {
            continue;
        };
        match guidance(*ann, value) {
            Some(Guidance::Manual(msg)) => delta.skip_with_warning(ann.as_str(), msg),
            Some(Guidance::NoEffect(msg)) => delta.ignored(ann.as_str(), msg),
            None => {}
        }
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "passthrough_tests.rs"]
mod passthrough_tests;
