// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rate and connection limiting.
//!
//! ingress-nginx applies `limit-rps` and `limit-rpm` simultaneously, so each
//! produces its own `RateLimit` middleware. Burst follows ingress-nginx:
//! `rate * limit-burst-multiplier`, with the multiplier defaulting to
//! [`ConvertOptions::burst_multiplier`](crate::context::ConvertOptions).

use crate::annotations::Annotation;
use crate::constants::{
    MW_SUFFIX_IN_FLIGHT_REQ, MW_SUFFIX_RATE_LIMIT, MW_SUFFIX_RATE_LIMIT_RPM,
    RATE_LIMIT_MINUTE_PERIOD,
};
use crate::context::{ConversionContext, Delta};
use crate::crd::{InFlightReq, IpStrategy, MiddlewareSpec, RateLimit, SourceCriterion};
use crate::errors::ConvertError;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::debug;

/// `limit-rps`, `limit-rpm` and `limit-burst-multiplier`.
///
/// The two rates are independent: a malformed one is skipped with a warning
/// and does not affect the other.
///
/// # Errors
///
/// Never fails; invalid rates are reported, not raised.
pub fn rate_limit(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let rps = ctx.annotation(Annotation::LimitRps);
    let rpm = ctx.annotation(Annotation::LimitRpm);
    if rps.is_none() && rpm.is_none() {
        return Ok(delta);
    }

    let multiplier = burst_multiplier(ctx, &mut delta);

    // The rpm middleware takes the plain name unless an rps one was emitted.
    let mut rps_emitted = false;
    if let Some(value) = rps {
        if let Some(average) = parse_rate(Annotation::LimitRps, value, &mut delta) {
            debug!(ingress = %ctx.name, average, multiplier, "Converting limit-rps");
            delta.middleware(ctx.middleware(
                MW_SUFFIX_RATE_LIMIT,
                MiddlewareSpec {
                    rate_limit: Some(RateLimit {
                        average,
                        period: None,
                        burst: average * multiplier,
                    }),
                    ..Default::default()
                },
            ));
            delta.converted(Annotation::LimitRps.as_str());
            rps_emitted = true;
        }
    }

    if let Some(value) = rpm {
        if let Some(average) = parse_rate(Annotation::LimitRpm, value, &mut delta) {
            debug!(ingress = %ctx.name, average, multiplier, "Converting limit-rpm");
            let suffix = if rps_emitted {
                MW_SUFFIX_RATE_LIMIT_RPM
            } else {
                MW_SUFFIX_RATE_LIMIT
            };
            delta.middleware(ctx.middleware(
                suffix,
                MiddlewareSpec {
                    rate_limit: Some(RateLimit {
                        average,
                        period: Some(IntOrString::String(RATE_LIMIT_MINUTE_PERIOD.to_string())),
                        burst: average * multiplier,
                    }),
                    ..Default::default()
                },
            ));
            delta.converted(Annotation::LimitRpm.as_str());
        }
    }

    Ok(delta)
}

/// Resolve the burst multiplier, reporting `limit-burst-multiplier` when present.
fn burst_multiplier(ctx: &ConversionContext<'_>, delta: &mut Delta) -> i64 {
    let default = i64::from(ctx.options.burst_multiplier);
    let Some(raw) = ctx.annotation(Annotation::LimitBurstMultiplier) else {
        return default;
    };

    match raw.trim().parse::<u32>() {
        Ok(m) if m > 0 => {
            delta.converted(Annotation::LimitBurstMultiplier.as_str());
            i64::from(m)
        }
        _ => {
            delta.warn_entry(
                Annotation::LimitBurstMultiplier.as_str(),
                format!("limit-burst-multiplier '{raw}' is not a positive integer; using default {default}"),
            );
            default
        }
    }
}

fn parse_rate(ann: Annotation, value: &str, delta: &mut Delta) -> Option<i64> {
    match value.trim().parse::<u32>() {
        Ok(rate) => Some(i64::from(rate)),
        Err(e) => {
            let err = ConvertError::invalid_value(ann.as_str(), value, e);
            delta.skip_with_warning(
                ann.as_str(),
                format!("{} was not converted: {err}", ann.short_name()),
            );
            None
        }
    }
}

/// `limit-connections` to an `InFlightReq` middleware keyed by client IP.
///
/// # Errors
///
/// Never fails; an invalid value is reported as a warning.
pub fn limit_connections(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(value) = ctx.annotation(Annotation::LimitConnections) else {
        return Ok(delta);
    };

    let amount = match value.trim().parse::<u32>() {
        Ok(amount) if amount > 0 => i64::from(amount),
        _ => {
            delta.warn_entry(
                Annotation::LimitConnections.as_str(),
                format!("invalid limit-connections value: {value}"),
            );
            return Ok(delta);
        }
    };

    debug!(ingress = %ctx.name, amount, "Converting limit-connections");

    delta.middleware(ctx.middleware(
        MW_SUFFIX_IN_FLIGHT_REQ,
        MiddlewareSpec {
            in_flight_req: Some(InFlightReq {
                amount,
                source_criterion: Some(SourceCriterion {
                    ip_strategy: Some(IpStrategy::default()),
                }),
            }),
            ..Default::default()
        },
    ));
    delta.converted(Annotation::LimitConnections.as_str());

    Ok(delta)
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod rate_limit_tests;
