// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `rewrite-target` to a `ReplacePathRegex` middleware.

use crate::annotations::Annotation;
use crate::constants::{MW_SUFFIX_REWRITE, REWRITE_CAPTURE_ALL_REGEX};
use crate::context::{ConversionContext, Delta};
use crate::crd::{MiddlewareSpec, ReplacePathRegex};
use crate::errors::ConvertError;
use tracing::debug;

/// Replace the whole request path with the annotation value.
///
/// The value is used as a literal replacement, so capture-group references such
/// as `/$2` resolve against the single `^(.*)` group.
///
/// # Errors
///
/// Never fails; the signature matches the converter table.
pub fn rewrite_target(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(target) = ctx.non_empty(Annotation::RewriteTarget) else {
        return Ok(delta);
    };

    debug!(ingress = %ctx.name, replacement = target, "Converting rewrite-target");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_REWRITE,
        MiddlewareSpec {
            replace_path_regex: Some(ReplacePathRegex {
                regex: REWRITE_CAPTURE_ALL_REGEX.to_string(),
                replacement: target.to_string(),
            }),
            ..Default::default()
        },
    ));

    if target.contains('$') {
        delta.warned(
            Annotation::RewriteTarget.as_str(),
            format!(
                "rewrite-target '{target}' references capture groups; Traefik only captures the whole path with {REWRITE_CAPTURE_ALL_REGEX}, verify the replacement"
            ),
        );
    } else {
        delta.converted(Annotation::RewriteTarget.as_str());
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod rewrite_tests;
