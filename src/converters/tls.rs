// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Client certificate verification (`auth-tls-*`) to a `TLSOption`.
//!
//! The TLSOption is named `<ingress>-mtls` and recorded as the Ingress's TLS
//! option so the route compiler can reference it from `tls.options`.

use crate::annotations::Annotation;
use crate::constants::TLS_OPTION_SUFFIX_MTLS;
use crate::context::{ConversionContext, Delta};
use crate::crd::{ClientAuth, TLSOption, TLSOptionSpec};
use crate::errors::ConvertError;
use tracing::debug;

/// Map an `auth-tls-verify-client` value to a Traefik `clientAuthType`.
#[must_use]
pub fn client_auth_type(verify: &str) -> Option<&'static str> {
    match verify.trim().to_ascii_lowercase().as_str() {
        "on" | "true" => Some("RequireAndVerifyClientCert"),
        "optional" => Some("VerifyClientCertIfGiven"),
        "optional_no_ca" => Some("RequireAnyClientCert"),
        _ => None,
    }
}

/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn auth_tls(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(verify) = ctx.annotation(Annotation::AuthTlsVerifyClient) else {
        return Ok(delta);
    };
    let verify_key = Annotation::AuthTlsVerifyClient.as_str();

    let Some(auth_type) = client_auth_type(verify) else {
        delta.ignored(
            verify_key,
            format!("auth-tls-verify-client '{verify}' does not request client certificates"),
        );
        return Ok(delta);
    };

    let Some(secret) = ctx.non_empty(Annotation::AuthTlsSecret) else {
        delta.skip_with_warning(
            verify_key,
            "auth-tls-verify-client is enabled but auth-tls-secret is missing",
        );
        return Ok(delta);
    };

    // ingress-nginx references the CA secret as `namespace/name`.
    let (secret_ns, secret_name) = secret
        .split_once('/')
        .unwrap_or((ctx.namespace.as_str(), secret));

    let name = ctx.middleware_name(TLS_OPTION_SUFFIX_MTLS);
    debug!(ingress = %ctx.name, tls_option = %name, auth_type, "Converting auth-tls");

    let mut option = TLSOption::new(
        &name,
        TLSOptionSpec {
            client_auth: Some(ClientAuth {
                secret_names: vec![secret_name.to_string()],
                client_auth_type: auth_type.to_string(),
            }),
        },
    );
    option.metadata.namespace = Some(ctx.namespace.clone());
    delta.tls_options.push(option);
    delta.tls_option_ref = Some(name);

    delta.converted(verify_key);
    if secret_ns == ctx.namespace {
        delta.converted(Annotation::AuthTlsSecret.as_str());
    } else {
        delta.warn_entry(
            Annotation::AuthTlsSecret.as_str(),
            format!(
                "CA secret {secret} lives in namespace {secret_ns}; Traefik resolves TLSOption secrets in {}, copy the secret there",
                ctx.namespace
            ),
        );
    }
    if !ctx.has_tls() {
        delta.warn(format!(
            "Ingress {}/{} requests client certificates but has no spec.tls; the TLSOption only applies to TLS routes",
            ctx.namespace, ctx.name
        ));
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tls_tests;
