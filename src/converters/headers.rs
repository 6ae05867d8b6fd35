// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `upstream-vhost` to a `Host` request header override.

use crate::annotations::Annotation;
use crate::constants::MW_SUFFIX_UPSTREAM_VHOST;
use crate::context::{ConversionContext, Delta};
use crate::crd::{Headers, MiddlewareSpec};
use crate::errors::ConvertError;
use std::collections::BTreeMap;

/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn upstream_vhost(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(host) = ctx.non_empty(Annotation::UpstreamVhost) else {
        return Ok(delta);
    };

    let mut request = BTreeMap::new();
    request.insert("Host".to_string(), host.to_string());

    delta.middleware(ctx.middleware(
        MW_SUFFIX_UPSTREAM_VHOST,
        MiddlewareSpec {
            headers: Some(Headers {
                custom_request_headers: Some(request),
                ..Default::default()
            }),
            ..Default::default()
        },
    ));
    delta.converted(Annotation::UpstreamVhost.as_str());

    Ok(delta)
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod headers_tests;
