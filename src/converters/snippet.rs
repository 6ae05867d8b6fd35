// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `configuration-snippet` parsing.
//!
//! The snippet is raw nginx configuration. Only a small, line-oriented subset is
//! understood:
//!
//! | Directive | Effect |
//! |---|---|
//! | `add_header`, `more_set_headers` | response header |
//! | `proxy_set_header` | request header |
//! | `gzip`, `gzip_comp_level`, `gzip_types` | warning only (global in Traefik) |
//! | `proxy_cache*` | warning only (not available in Traefik OSS) |
//!
//! Header values that reference nginx variables count as unsupported.
//! Any other line, comments included, vetoes the whole snippet: nothing is
//! converted and a single warning is recorded.

use crate::annotations::Annotation;
use crate::constants::MW_SUFFIX_SNIPPET_HEADERS;
use crate::context::{ConversionContext, Delta};
use crate::crd::{Headers, MiddlewareSpec};
use crate::errors::ConvertError;
use std::collections::BTreeMap;
use tracing::debug;

/// Classified contents of a configuration snippet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedSnippet {
    pub request_headers: BTreeMap<String, String>,
    pub response_headers: BTreeMap<String, String>,
    /// Advisory messages for directives that are dropped on purpose
    pub warnings: Vec<String>,
    /// Lines that cannot be translated
    pub unsupported: Vec<String>,
}

impl ParsedSnippet {
    #[must_use]
    pub fn has_headers(&self) -> bool {
        !self.request_headers.is_empty() || !self.response_headers.is_empty()
    }
}

/// Classify every non-blank line of a snippet.
#[must_use]
pub fn parse_snippet(snippet: &str) -> ParsedSnippet {
    let mut parsed = ParsedSnippet::default();

    for raw in snippet.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let directive = line.split_whitespace().next().unwrap_or_default();

        match directive {
            "more_set_headers" | "add_header" => match extract_headers(line) {
                Some(headers) if !headers.iter().any(|(_, v)| uses_variable(v)) => {
                    parsed.response_headers.extend(headers);
                }
                _ => parsed.unsupported.push(line.to_string()),
            },
            "proxy_set_header" => {
                let parts: Vec<&str> = line.split_whitespace().collect();
                let value = clean_value(&parts.get(2..).unwrap_or_default().join(" "));
                if parts.len() >= 3 && !uses_variable(&value) {
                    parsed.request_headers.insert(parts[1].to_string(), value);
                } else {
                    parsed.unsupported.push(line.to_string());
                }
            }
            "gzip" => parsed
                .warnings
                .push("gzip must be enabled globally in Traefik static configuration".to_string()),
            "gzip_comp_level" => parsed.warnings.push(
                "gzip_comp_level is not configurable in Traefik and was ignored, compression level is fixed"
                    .to_string(),
            ),
            "gzip_types" => parsed.warnings.push(
                "gzip_types is not configurable in Traefik and was ignored. Compresses a fixed, internal set of MIME types"
                    .to_string(),
            ),
            d if d.starts_with("proxy_cache") => parsed
                .warnings
                .push("proxy_cache is not supported in Traefik OSS and was ignored".to_string()),
            _ => parsed.unsupported.push(line.to_string()),
        }
    }

    parsed
}

/// Extract headers from `"Name: value"` segments, or from `Name value` tokens.
///
/// The quoted form applies only when the first argument is itself quoted
/// (`more_set_headers "X: y"`); otherwise a quoted value such as
/// `"https://example.com"` would be split on its colon.
fn extract_headers(line: &str) -> Option<Vec<(String, String)>> {
    let mut parts = line.split_whitespace().skip(1);
    let name = parts.next()?;

    if name.starts_with('"') {
        // Odd segments of a split on '"' are the quoted ones.
        return line
            .split('"')
            .skip(1)
            .step_by(2)
            .map(|segment| {
                let (name, value) = segment.split_once(':')?;
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect();
    }

    // add_header X-Frame-Options "SAMEORIGIN" [always];
    let value: Vec<&str> = parts
        .map(|p| p.trim_end_matches(';'))
        .filter(|p| !p.is_empty() && *p != "always")
        .collect();
    if value.is_empty() || name.contains('"') {
        return None;
    }
    Some(vec![(name.to_string(), clean_value(&value.join(" ")))])
}

/// nginx variables (`$remote_addr`) have no Traefik equivalent in static headers.
fn uses_variable(value: &str) -> bool {
    value.contains('$')
}

fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(';')
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// # Errors
///
/// Never fails; unsupported snippets are reported, not raised.
pub fn configuration_snippet(ctx: &ConversionContext<'_>) -> Result<Delta, ConvertError> {
    let mut delta = Delta::default();
    let Some(snippet) = ctx.annotation(Annotation::ConfigurationSnippet) else {
        return Ok(delta);
    };
    let key = Annotation::ConfigurationSnippet.as_str();

    if snippet.trim().is_empty() {
        delta.ignored(key, "configuration-snippet is empty");
        return Ok(delta);
    }

    let parsed = parse_snippet(snippet);
    debug!(
        ingress = %ctx.name,
        unsupported = parsed.unsupported.len(),
        "Parsed configuration-snippet"
    );
    delta.warnings.extend(parsed.warnings.iter().cloned());

    if !parsed.unsupported.is_empty() {
        delta.skip_with_warning(
            key,
            format!(
                "configuration-snippet contains unsupported NGINX directives and was skipped: {}",
                parsed.unsupported.join(" | ")
            ),
        );
        return Ok(delta);
    }

    if !parsed.has_headers() {
        delta.warned(
            key,
            "configuration-snippet only contains directives Traefik configures globally",
        );
        return Ok(delta);
    }

    let ParsedSnippet {
        request_headers,
        response_headers,
        warnings,
        ..
    } = parsed;

    delta.middleware(ctx.middleware(
        MW_SUFFIX_SNIPPET_HEADERS,
        MiddlewareSpec {
            headers: Some(Headers {
                custom_request_headers: (!request_headers.is_empty()).then_some(request_headers),
                custom_response_headers: (!response_headers.is_empty())
                    .then_some(response_headers),
                ..Default::default()
            }),
            ..Default::default()
        },
    ));

    if warnings.is_empty() {
        delta.converted(key);
    } else {
        delta.warned(key, warnings.join("; "));
    }

    Ok(delta)
}

#[cfg(test)]
#[path = "snippet_tests.rs"]
mod snippet_tests;
