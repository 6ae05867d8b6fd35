// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Middleware classification and chain ordering.
//!
//! Every middleware falls into one [`MiddlewareCategory`]. The chain is a stable
//! sort by category, so middlewares within a category keep the order in which
//! their converters ran.
//!
//! Classification looks at the populated spec block first and falls back to
//! substrings of the generated name. A middleware that matches nothing is
//! [`MiddlewareCategory::Other`].

use crate::crd::Middleware;
use tracing::debug;

/// Ordering categories, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MiddlewareCategory {
    /// Responders that answer without reaching the backend
    ShortCircuit,
    /// CORS, header injection, cookie rewrites, upstream vhost
    ResponseHeaders,
    /// Basic and forward auth
    Auth,
    /// Path rewrites, redirects, body size
    RequestTransform,
    Other,
}

const SHORT_CIRCUIT_NAMES: &[&str] = &["conditional-return"];
const RESPONSE_HEADER_NAMES: &[&str] = &[
    "cors",
    "configuration-snippet",
    "snippet-headers",
    "proxy-cookie",
    "upstream-vhost",
];
const REQUEST_TRANSFORM_NAMES: &[&str] = &["rewrite", "redirect", "bodysize", "proxy-redirect"];

/// Assign a middleware to its category.
#[must_use]
pub fn classify(mw: &Middleware) -> MiddlewareCategory {
    let name = mw
        .metadata
        .name
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let spec = &mw.spec;
    let name_has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if name_has(SHORT_CIRCUIT_NAMES) {
        MiddlewareCategory::ShortCircuit
    } else if spec.headers.is_some() || name_has(RESPONSE_HEADER_NAMES) {
        MiddlewareCategory::ResponseHeaders
    } else if spec.basic_auth.is_some() || spec.forward_auth.is_some() {
        MiddlewareCategory::Auth
    } else if spec.replace_path_regex.is_some()
        || spec.redirect_scheme.is_some()
        || name_has(REQUEST_TRANSFORM_NAMES)
    {
        MiddlewareCategory::RequestTransform
    } else {
        MiddlewareCategory::Other
    }
}

/// Stable-sort middlewares into chain order.
pub fn sort_middlewares(middlewares: &mut [Middleware]) {
    middlewares.sort_by_key(classify);
    debug!(
        chain = ?middlewares
            .iter()
            .filter_map(|m| m.metadata.name.as_deref())
            .collect::<Vec<_>>(),
        "Sequenced middleware chain"
    );
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod sequencer_tests;
