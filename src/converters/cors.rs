// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CORS annotations to a `Headers` middleware.

use super::split_list;
use crate::annotations::Annotation;
use crate::constants::MW_SUFFIX_CORS;
use crate::context::{ConversionContext, Delta};
use crate::crd::{Headers, MiddlewareSpec};
use crate::errors::ConvertError;
use tracing::debug;

const SUB_FIELDS: [Annotation; 6] = [
    Annotation::CorsAllowOrigin,
    Annotation::CorsAllowMethods,
    Annotation::CorsAllowHeaders,
    Annotation::CorsAllowCredentials,
    Annotation::CorsMaxAge,
    Annotation::CorsExposeHeaders,
];

/// Build the CORS headers middleware when `enable-cors` is `true`.
///
/// Sub-fields are only read when CORS is enabled; otherwise they are left for
/// the coverage pass, which reports them as having no effect.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidAnnotationValue`] when `cors-max-age` is not an
/// integer. The converter table treats this as fatal for the whole Ingress.
pub fn cors(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    if !ctx.has(Annotation::EnableCors) {
        return Ok(delta);
    }
    if !ctx.is_true(Annotation::EnableCors) {
        delta.ignored(
            Annotation::EnableCors.as_str(),
            "enable-cors is not set to true",
        );
        return Ok(delta);
    }

    debug!(ingress = %ctx.name, "Converting CORS");

    let mut headers = Headers::default();
    let mut converted = Vec::new();

    if let Some(v) = ctx.non_empty(Annotation::CorsMaxAge) {
        let secs = v
            .parse::<i64>()
            .map_err(|e| ConvertError::invalid_value(Annotation::CorsMaxAge.as_str(), v, e))?;
        headers.access_control_max_age = Some(secs);
        converted.push(Annotation::CorsMaxAge);
    }
    if let Some(v) = ctx.non_empty(Annotation::CorsAllowOrigin) {
        headers.access_control_allow_origin_list = Some(split_list(v));
        converted.push(Annotation::CorsAllowOrigin);
    }
    if let Some(v) = ctx.non_empty(Annotation::CorsAllowMethods) {
        headers.access_control_allow_methods = Some(split_list(v));
        converted.push(Annotation::CorsAllowMethods);
    }
    if let Some(v) = ctx.non_empty(Annotation::CorsAllowHeaders) {
        headers.access_control_allow_headers = Some(split_list(v));
        converted.push(Annotation::CorsAllowHeaders);
    }
    if let Some(v) = ctx.non_empty(Annotation::CorsExposeHeaders) {
        headers.access_control_expose_headers = Some(split_list(v));
        converted.push(Annotation::CorsExposeHeaders);
    }
    if let Some(v) = ctx.non_empty(Annotation::CorsAllowCredentials) {
        match v.to_ascii_lowercase().as_str() {
            "true" => {
                headers.access_control_allow_credentials = Some(true);
                converted.push(Annotation::CorsAllowCredentials);
            }
            "false" => {
                headers.access_control_allow_credentials = Some(false);
                converted.push(Annotation::CorsAllowCredentials);
            }
            _ => delta.warn_entry(
                Annotation::CorsAllowCredentials.as_str(),
                format!("cors-allow-credentials has non-boolean value '{v}' and was not applied"),
            ),
        }
    }

    delta.middleware(ctx.middleware(
        MW_SUFFIX_CORS,
        MiddlewareSpec {
            headers: Some(headers),
            ..Default::default()
        },
    ));

    delta.converted(Annotation::EnableCors.as_str());
    for ann in SUB_FIELDS.into_iter().filter(|a| converted.contains(a)) {
        delta.converted(ann.as_str());
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "cors_tests.rs"]
mod cors_tests;
