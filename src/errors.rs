// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the conversion pipeline.
//!
//! Only hard failures are errors. Outcomes such as "this annotation could not be
//! translated" are report data (see [`crate::report`]) and never surface here.
//!
//! Whether a [`ConvertError`] aborts a single step or the whole ingress is
//! decided by the converter table in [`crate::convert`], not by the error itself.

use thiserror::Error;

/// Errors raised while converting an Ingress or performing I/O around it.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// An annotation carried a value that could not be parsed
    ///
    /// Returned for malformed numeric values such as `cors-max-age: ten` or
    /// `proxy-body-size: 12x`.
    #[error("invalid value '{value}' for annotation {annotation}: {reason}")]
    InvalidAnnotationValue {
        /// Full annotation key
        annotation: String,
        /// Raw value as found on the Ingress
        value: String,
        /// Parser message
        reason: String,
    },

    /// `backend-protocol` named a protocol Traefik cannot speak to a backend
    #[error("unsupported backend-protocol '{value}'")]
    UnsupportedBackendProtocol {
        /// Raw annotation value
        value: String,
    },

    /// Listing cert-manager Certificates failed for a reason other than the CRD being absent
    #[error("failed to look up Certificates in namespace {namespace}: {reason}")]
    CertificateLookup {
        /// Namespace that was queried
        namespace: String,
        /// Underlying failure
        reason: String,
    },

    /// An input document was not a `networking.k8s.io/v1` Ingress
    #[error("invalid manifest in {source_name}: {reason}")]
    InvalidManifest {
        /// File or stream the document came from
        source_name: String,
        /// What was wrong with it
        reason: String,
    },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Build an [`ConvertError::InvalidAnnotationValue`].
    pub fn invalid_value(
        annotation: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidAnnotationValue {
            annotation: annotation.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Annotation key responsible for this error, if any.
    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        match self {
            Self::InvalidAnnotationValue { annotation, .. } => Some(annotation),
            Self::UnsupportedBackendProtocol { .. } => {
                Some(crate::annotations::Annotation::BackendProtocol.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
