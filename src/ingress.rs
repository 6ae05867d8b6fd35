// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Loading Ingress manifests from YAML.
//!
//! Accepts multi-document files and `kind: List` wrappers as produced by
//! `kubectl get ingress -o yaml`. Empty documents are skipped; any other
//! document that is not a `networking.k8s.io/v1` Ingress is rejected.

use crate::errors::ConvertError;
use k8s_openapi::api::networking::v1::Ingress;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

const INGRESS_API_VERSION: &str = "networking.k8s.io/v1";
const INGRESS_KIND: &str = "Ingress";
const LIST_KIND: &str = "List";

/// Read every Ingress from a YAML file. `-` reads standard input.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] when the file cannot be read, and
/// [`ConvertError::InvalidManifest`] for documents that do not parse or are not
/// Ingresses.
pub fn load_ingresses(path: &Path) -> Result<Vec<Ingress>, ConvertError> {
    let source_name = path.display().to_string();
    let content = if source_name == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    parse_ingresses(&source_name, &content)
}

/// Parse every Ingress from YAML text. `source_name` is used in error messages.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidManifest`] for documents that do not parse or
/// are not Ingresses.
pub fn parse_ingresses(source_name: &str, content: &str) -> Result<Vec<Ingress>, ConvertError> {
    let mut ingresses = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document).map_err(|e| ConvertError::InvalidManifest {
            source_name: source_name.to_string(),
            reason: format!("document {}: {e}", index + 1),
        })?;
        collect(source_name, index + 1, value, &mut ingresses)?;
    }

    debug!(source = source_name, count = ingresses.len(), "Loaded Ingresses");
    Ok(ingresses)
}

fn collect(
    source_name: &str,
    document: usize,
    value: Value,
    out: &mut Vec<Ingress>,
) -> Result<(), ConvertError> {
    if value.is_null() {
        return Ok(());
    }
    let invalid = |reason: String| ConvertError::InvalidManifest {
        source_name: source_name.to_string(),
        reason: format!("document {document}: {reason}"),
    };

    let kind = value.get("kind").and_then(Value::as_str).unwrap_or_default();
    if kind == LIST_KIND {
        let items = value
            .get("items")
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default();
        for item in items {
            collect(source_name, document, item, out)?;
        }
        return Ok(());
    }

    let api_version = value
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if kind != INGRESS_KIND || api_version != INGRESS_API_VERSION {
        return Err(invalid(format!(
            "expected {INGRESS_API_VERSION} {INGRESS_KIND}, found '{api_version}' '{kind}'"
        )));
    }

    let ingress: Ingress = serde_yaml::from_value(value).map_err(|e| invalid(e.to_string()))?;
    out.push(ingress);
    Ok(())
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod ingress_tests;
