// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ingress.rs`

#[cfg(test)]
mod tests {
    use crate::errors::ConvertError;
    use crate::ingress::{load_ingresses, parse_ingresses};
    use std::io::Write;

    const TWO_DOCS: &str = r#"
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: web
  namespace: shop
  annotations:
    nginx.ingress.kubernetes.io/limit-rps: "10"
spec:
  rules:
    - host: a.example.com
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: web
                port:
                  number: 80
---
---
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: api
spec:
  defaultBackend:
    service:
      name: api
      port:
        name: http
"#;

    #[test]
    fn test_multi_document_with_empty_document() {
        let ingresses = parse_ingresses("inline", TWO_DOCS).unwrap();
        assert_eq!(ingresses.len(), 2);
        assert_eq!(ingresses[0].metadata.name.as_deref(), Some("web"));
        assert_eq!(ingresses[1].metadata.namespace, None);
    }

    #[test]
    fn test_list_kind_is_flattened() {
        let yaml = r"
apiVersion: v1
kind: List
items:
  - apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: one
  - apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: two
";
        let ingresses = parse_ingresses("list.yaml", yaml).unwrap();
        let names: Vec<_> = ingresses
            .iter()
            .filter_map(|i| i.metadata.name.as_deref())
            .collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_non_ingress_document_is_rejected() {
        let yaml = r"
apiVersion: v1
kind: Service
metadata:
  name: web
";
        let err = parse_ingresses("svc.yaml", yaml).unwrap_err();
        match err {
            ConvertError::InvalidManifest {
                source_name,
                reason,
            } => {
                assert_eq!(source_name, "svc.yaml");
                assert!(reason.contains("Service"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_api_version_is_rejected() {
        let yaml = r"
apiVersion: extensions/v1beta1
kind: Ingress
metadata:
  name: old
";
        assert!(parse_ingresses("old.yaml", yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_DOCS.as_bytes()).unwrap();

        let ingresses = load_ingresses(file.path()).unwrap();
        assert_eq!(ingresses.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_ingresses(std::path::Path::new("/nonexistent/ingress.yaml")).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
