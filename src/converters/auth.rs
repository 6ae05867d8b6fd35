// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Basic auth and forward auth middlewares.

use crate::annotations::Annotation;
use crate::constants::{MW_SUFFIX_BASIC_AUTH, MW_SUFFIX_FORWARD_AUTH};
use crate::context::{ConversionContext, Delta};
use crate::crd::{BasicAuth, ForwardAuth, MiddlewareSpec};
use crate::errors::ConvertError;
use tracing::debug;

const BASIC_AUTH_KEYS: [Annotation; 3] = [
    Annotation::AuthType,
    Annotation::AuthSecret,
    Annotation::AuthRealm,
];

/// `auth-type: basic` with `auth-secret` and optional `auth-realm`.
///
/// The secret is passed through by name and is not validated. ingress-nginx
/// reads htpasswd data from the `auth` key while Traefik reads `users`, so the
/// converted entry for the secret carries a reminder.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn basic_auth(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(auth_type) = ctx.annotation(Annotation::AuthType) else {
        return Ok(delta);
    };
    let auth_type = auth_type.trim().to_ascii_lowercase();

    if auth_type != "basic" {
        let msg = format!(
            "auth-type '{auth_type}' is not converted; create the matching Traefik middleware (for digest, a DigestAuth middleware) manually"
        );
        delta.warn(msg.clone());
        for ann in BASIC_AUTH_KEYS.into_iter().filter(|a| ctx.has(*a)) {
            delta.skipped(ann.as_str(), msg.clone());
        }
        return Ok(delta);
    }

    let Some(secret) = ctx.non_empty(Annotation::AuthSecret) else {
        delta.skip_with_warning(
            Annotation::AuthType.as_str(),
            "auth-type is basic but auth-secret is missing; BasicAuth middleware was not created",
        );
        return Ok(delta);
    };

    debug!(ingress = %ctx.name, secret, "Converting basic auth");

    let realm = ctx.non_empty(Annotation::AuthRealm).map(str::to_string);
    delta.middleware(ctx.middleware(
        MW_SUFFIX_BASIC_AUTH,
        MiddlewareSpec {
            basic_auth: Some(BasicAuth {
                secret: secret.to_string(),
                realm: realm.clone(),
            }),
            ..Default::default()
        },
    ));

    delta.converted(Annotation::AuthType.as_str());
    delta.warned(
        Annotation::AuthSecret.as_str(),
        format!("Traefik reads htpasswd entries from the 'users' key of secret '{secret}'; ingress-nginx uses 'auth'"),
    );
    if realm.is_some() {
        delta.converted(Annotation::AuthRealm.as_str());
    }

    Ok(delta)
}

/// `auth-url` to a `ForwardAuth` middleware.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn forward_auth(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(address) = ctx.non_empty(Annotation::AuthUrl) else {
        return Ok(delta);
    };

    debug!(ingress = %ctx.name, address, "Converting forward auth");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_FORWARD_AUTH,
        MiddlewareSpec {
            forward_auth: Some(ForwardAuth {
                address: address.to_string(),
            }),
            ..Default::default()
        },
    ));
    delta.converted(Annotation::AuthUrl.as_str());

    Ok(delta)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;
