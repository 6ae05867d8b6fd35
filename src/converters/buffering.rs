// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `proxy-body-size` and `proxy-buffering` to `Buffering` middlewares.

use crate::annotations::Annotation;
use crate::constants::{MW_SUFFIX_BODY_SIZE, MW_SUFFIX_BUFFERING};
use crate::context::{ConversionContext, Delta};
use crate::crd::{Buffering, MiddlewareSpec};
use crate::errors::ConvertError;
use tracing::debug;

/// Parse an nginx size value (`512`, `8k`, `10m`, `1g`) into bytes.
///
/// Suffixes are case-insensitive binary multiples.
///
/// # Errors
///
/// Returns a message when the numeric part is not a non-negative integer.
pub fn parse_size_bytes(value: &str) -> Result<i64, String> {
    let v = value.trim().to_ascii_lowercase();
    let (digits, multiplier) = match v.chars().last() {
        Some('k') => (&v[..v.len() - 1], 1024),
        Some('m') => (&v[..v.len() - 1], 1024 * 1024),
        Some('g') => (&v[..v.len() - 1], 1024 * 1024 * 1024),
        _ => (v.as_str(), 1),
    };

    let n: i64 = digits
        .parse()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| format!("invalid size value: {value}"))?;
    n.checked_mul(multiplier)
        .ok_or_else(|| format!("size value out of range: {value}"))
}

/// `proxy-body-size` to `Buffering.maxRequestBodyBytes`.
///
/// `0` disables the limit in nginx and is reported as ignored.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidAnnotationValue`] for unparseable sizes.
pub fn body_size(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(value) = ctx.annotation(Annotation::ProxyBodySize) else {
        return Ok(delta);
    };

    let bytes = parse_size_bytes(value)
        .map_err(|e| ConvertError::invalid_value(Annotation::ProxyBodySize.as_str(), value, e))?;

    if bytes == 0 {
        delta.ignored(
            Annotation::ProxyBodySize.as_str(),
            "proxy-body-size 0 disables the limit; Traefik applies no body size limit by default",
        );
        return Ok(delta);
    }

    debug!(ingress = %ctx.name, bytes, "Converting proxy-body-size");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_BODY_SIZE,
        MiddlewareSpec {
            buffering: Some(Buffering {
                max_request_body_bytes: Some(bytes),
            }),
            ..Default::default()
        },
    ));
    delta.converted(Annotation::ProxyBodySize.as_str());

    Ok(delta)
}

/// `proxy-buffering: on` to an empty `Buffering` middleware.
///
/// # Errors
///
/// Never fails; unknown values are reported as ignored with a warning.
pub fn proxy_buffering(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(value) = ctx.annotation(Annotation::ProxyBuffering) else {
        return Ok(delta);
    };
    let key = Annotation::ProxyBuffering.as_str();

    match value.trim().to_ascii_lowercase().as_str() {
        "on" => {
            delta.middleware(ctx.middleware(
                MW_SUFFIX_BUFFERING,
                MiddlewareSpec {
                    buffering: Some(Buffering::default()),
                    ..Default::default()
                },
            ));
            delta.converted(key);
        }
        "off" => delta.ignored(key, "proxy-buffering=off is default behavior in Traefik"),
        _ => {
            let msg = format!("proxy-buffering has unknown value {value:?} and was ignored");
            delta.warn(msg.clone());
            delta.ignored(key, msg);
        }
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "buffering_tests.rs"]
mod buffering_tests;
