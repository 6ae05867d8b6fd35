// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `whitelist-source-range` to an `IPAllowList` middleware.

use super::split_list;
use crate::annotations::Annotation;
use crate::constants::MW_SUFFIX_IP_ALLOW_LIST;
use crate::context::{ConversionContext, Delta};
use crate::crd::{IpAllowList, MiddlewareSpec};
use crate::errors::ConvertError;
use tracing::debug;

/// The value is a comma-separated list of CIDRs or single addresses.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn whitelist_source_range(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(value) = ctx.annotation(Annotation::WhitelistSourceRange) else {
        return Ok(delta);
    };

    let ranges = split_list(value);
    if ranges.is_empty() {
        delta.ignored(
            Annotation::WhitelistSourceRange.as_str(),
            "whitelist-source-range lists no addresses",
        );
        return Ok(delta);
    }

    debug!(ingress = %ctx.name, ranges = ranges.len(), "Converting whitelist-source-range");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_IP_ALLOW_LIST,
        MiddlewareSpec {
            ip_allow_list: Some(IpAllowList {
                source_range: ranges,
            }),
            ..Default::default()
        },
    ));
    delta.converted(Annotation::WhitelistSourceRange.as_str());

    Ok(delta)
}
