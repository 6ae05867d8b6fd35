// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ssl-redirect` / `force-ssl-redirect` to a `RedirectScheme` middleware.

use crate::annotations::Annotation;
use crate::constants::{MW_SUFFIX_HTTPS_REDIRECT, SCHEME_HTTPS};
use crate::context::{ConversionContext, Delta};
use crate::crd::{MiddlewareSpec, RedirectScheme};
use crate::errors::ConvertError;
use tracing::debug;

const KEYS: [Annotation; 2] = [Annotation::SslRedirect, Annotation::ForceSslRedirect];

/// Emit a permanent HTTP to HTTPS redirect.
///
/// When the Ingress terminates TLS the IngressRoute is bound to the secure
/// entry point only, so a redirect middleware would never see plaintext
/// traffic. The redirect then belongs on the entry point and a warning says so.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn ssl_redirect(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let present: Vec<Annotation> = KEYS.into_iter().filter(|a| ctx.has(*a)).collect();
    if present.is_empty() {
        return Ok(delta);
    }

    if !KEYS.iter().any(|a| ctx.is_true(*a)) {
        for ann in present {
            delta.skipped(ann.as_str(), format!("{ann} is not set to true"));
        }
        return Ok(delta);
    }

    if ctx.has_tls() {
        let msg = format!(
            "IngressRoute already uses entryPoints=[{secure}] due to spec.tls; configure the HTTP to HTTPS redirect at the entry point level (entryPoints.{web}.http.redirections.entryPoint.to={secure}) or create a separate IngressRoute on the {web} entry point with a redirectScheme middleware",
            secure = ctx.options.secure_entry_point,
            web = ctx.options.web_entry_point,
        );
        delta.warn(msg.clone());
        for ann in present {
            delta.skipped(ann.as_str(), msg.clone());
        }
        return Ok(delta);
    }

    debug!(ingress = %ctx.name, "Converting ssl-redirect");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_HTTPS_REDIRECT,
        MiddlewareSpec {
            redirect_scheme: Some(RedirectScheme {
                scheme: SCHEME_HTTPS.to_string(),
                permanent: Some(true),
            }),
            ..Default::default()
        },
    ));
    for ann in present {
        delta.converted(ann.as_str());
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "redirect_tests.rs"]
mod redirect_tests;
