// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for conversion error types.

#[cfg(test)]
mod tests {
    use crate::errors::ConvertError;

    #[test]
    fn test_invalid_annotation_value_message() {
        let error = ConvertError::invalid_value(
            "nginx.ingress.kubernetes.io/cors-max-age",
            "ten",
            "invalid digit found in string",
        );

        assert_eq!(
            error.to_string(),
            "invalid value 'ten' for annotation nginx.ingress.kubernetes.io/cors-max-age: invalid digit found in string"
        );
        assert_eq!(
            error.annotation(),
            Some("nginx.ingress.kubernetes.io/cors-max-age")
        );
    }

    #[test]
    fn test_unsupported_backend_protocol_points_at_annotation() {
        let error = ConvertError::UnsupportedBackendProtocol {
            value: "AJP".to_string(),
        };

        assert_eq!(error.to_string(), "unsupported backend-protocol 'AJP'");
        assert_eq!(
            error.annotation(),
            Some("nginx.ingress.kubernetes.io/backend-protocol")
        );
    }

    #[test]
    fn test_certificate_lookup_has_no_annotation() {
        let error = ConvertError::CertificateLookup {
            namespace: "shop".to_string(),
            reason: "forbidden".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "failed to look up Certificates in namespace shop: forbidden"
        );
        assert!(error.annotation().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yaml");
        let error: ConvertError = io.into();
        assert!(matches!(error, ConvertError::Io(_)));
        assert!(error.to_string().starts_with("I/O error:"));
    }
}
