// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Directive converters.
//!
//! Each converter is a total function of a [`ConversionContext`](crate::context::ConversionContext):
//! when none of its annotations are present it returns an empty
//! [`Delta`](crate::context::Delta). A converter records exactly one report entry for
//! each annotation it consumes and may add free-text warnings on top.
//!
//! The order in which converters run is fixed by the table in [`crate::convert`].
//!
//! ## Modules
//!
//! - [`rewrite`] - `rewrite-target`
//! - [`redirect`] - `ssl-redirect`, `force-ssl-redirect`
//! - [`auth`] - basic auth and forward auth
//! - [`cors`] - `enable-cors` and the `cors-*` family
//! - [`rate_limit`] - `limit-rps`, `limit-rpm`, `limit-burst-multiplier`, `limit-connections`
//! - [`buffering`] - `proxy-body-size`, `proxy-buffering`
//! - [`access`] - `whitelist-source-range`
//! - [`headers`] - `upstream-vhost`
//! - [`tls`] - `auth-tls-verify-client`, `auth-tls-secret`
//! - [`snippet`] - `configuration-snippet`
//! - [`passthrough`] - annotations with no per-route Traefik equivalent

pub mod access;
pub mod auth;
pub mod buffering;
pub mod cors;
pub mod headers;
pub mod passthrough;
pub mod rate_limit;
pub mod redirect;
pub mod rewrite;
pub mod snippet;
pub mod tls;

/// Split a comma-separated annotation value, trimming entries and dropping blanks.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
