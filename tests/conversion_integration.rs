// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end conversion tests
//!
//! These tests drive the public pipeline the way the CLI does: parse YAML
//! manifests, convert each Ingress, aggregate the batch and emit files.
//! No cluster is needed; certificate extraction uses an in-memory source.
//!
//! Run with: cargo test --test conversion_integration

use kube::api::DynamicObject;
use nginx2traefik::certificates::{
    certificate_api_resource, CertificateCache, CertificateLookup, CertificateSource,
};
use nginx2traefik::context::ConvertOptions;
use nginx2traefik::convert::{convert_ingress, Conversion};
use nginx2traefik::errors::ConvertError;
use nginx2traefik::ingress::parse_ingresses;
use nginx2traefik::output::{BatchOutput, CERTIFICATES_FILE, MIDDLEWARES_FILE, REPORT_FILE};
use nginx2traefik::report::AnnotationStatus;
use serde_json::json;

// ============================================================================
// Helper Functions
// ============================================================================

/// One routed Ingress with the given annotations and optional TLS secret.
fn manifest(name: &str, annotations: &[(&str, &str)], tls_secret: Option<&str>) -> String {
    let mut yaml = format!(
        "apiVersion: networking.k8s.io/v1\nkind: Ingress\nmetadata:\n  name: {name}\n  namespace: shop\n"
    );
    if !annotations.is_empty() {
        yaml.push_str("  annotations:\n");
        for (key, value) in annotations {
            let value = serde_json::to_string(value).unwrap();
            yaml.push_str(&format!("    {key}: {value}\n"));
        }
    }
    yaml.push_str("spec:\n");
    if let Some(secret) = tls_secret {
        yaml.push_str(&format!(
            "  tls:\n    - hosts: [shop.example.com]\n      secretName: {secret}\n"
        ));
    }
    yaml.push_str(
        "  rules:\n    - host: shop.example.com\n      http:\n        paths:\n          - path: /\n            pathType: Prefix\n            backend:\n              service:\n                name: storefront\n                port:\n                  number: 80\n",
    );
    yaml
}

fn convert_one(yaml: &str) -> Conversion {
    convert_with(yaml, None)
}

fn convert_with(yaml: &str, lookup: Option<&dyn CertificateLookup>) -> Conversion {
    let ingresses = parse_ingresses("test", yaml).expect("manifest should parse");
    assert_eq!(ingresses.len(), 1);
    convert_ingress(&ingresses[0], &ConvertOptions::default(), lookup)
}

fn status_of(conversion: &Conversion, key: &str) -> AnnotationStatus {
    conversion
        .result
        .report
        .entries()
        .iter()
        .find(|e| e.name == key)
        .unwrap_or_else(|| panic!("no report entry for {key}"))
        .status
}

struct InMemoryCertificates(Vec<DynamicObject>);

impl CertificateSource for InMemoryCertificates {
    fn list(&self, namespace: &str) -> Result<Option<Vec<DynamicObject>>, ConvertError> {
        Ok(Some(
            self.0
                .iter()
                .filter(|c| c.metadata.namespace.as_deref() == Some(namespace))
                .cloned()
                .collect(),
        ))
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_ssl_redirect_without_tls_emits_redirect_middleware() {
    let conversion = convert_one(&manifest(
        "web",
        &[("nginx.ingress.kubernetes.io/ssl-redirect", "true")],
        None,
    ));

    let result = &conversion.result;
    assert_eq!(result.middlewares.len(), 1);
    let redirect = result.middlewares[0].spec.redirect_scheme.as_ref().unwrap();
    assert_eq!(redirect.scheme, "https");
    assert_eq!(redirect.permanent, Some(true));

    let route = &result.ingress_routes[0];
    assert_eq!(route.spec.entry_points, vec!["web"]);
    assert_eq!(route.spec.routes[0].middlewares[0].name, "web-https-redirect");
    assert!(result.warnings.is_empty());
}

#[test]
fn test_ssl_redirect_with_tls_warns_instead() {
    let conversion = convert_one(&manifest(
        "web",
        &[
            ("nginx.ingress.kubernetes.io/ssl-redirect", "true"),
            ("cert-manager.io/cluster-issuer", "letsencrypt"),
        ],
        Some("web-tls"),
    ));

    let result = &conversion.result;
    assert!(result.middlewares.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("entry point level"));
    assert_eq!(result.ingress_routes[0].spec.entry_points, vec!["websecure"]);
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/ssl-redirect"),
        AnnotationStatus::Skipped
    );
}

#[test]
fn test_limit_rps_uses_default_burst_multiplier() {
    let conversion = convert_one(&manifest(
        "web",
        &[("nginx.ingress.kubernetes.io/limit-rps", "10")],
        None,
    ));

    let rate = conversion.result.middlewares[0]
        .spec
        .rate_limit
        .as_ref()
        .unwrap();
    assert_eq!(rate.average, 10);
    assert_eq!(rate.burst, 50);
}

#[test]
fn test_header_snippet_becomes_headers_middleware() {
    let conversion = convert_one(&manifest(
        "web",
        &[(
            "nginx.ingress.kubernetes.io/configuration-snippet",
            "add_header \"X-Foo: bar\";",
        )],
        None,
    ));

    let result = &conversion.result;
    assert_eq!(result.middlewares.len(), 1);
    let headers = result.middlewares[0].spec.headers.as_ref().unwrap();
    let response = headers.custom_response_headers.as_ref().unwrap();
    assert_eq!(response.get("X-Foo").unwrap(), "bar");
    assert!(result.warnings.is_empty());
}

#[test]
fn test_lua_snippet_is_vetoed() {
    let conversion = convert_one(&manifest(
        "web",
        &[(
            "nginx.ingress.kubernetes.io/configuration-snippet",
            "add_header \"X-Foo: bar\";\nlua_code return 403;",
        )],
        None,
    ));

    let result = &conversion.result;
    assert!(result.middlewares.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/configuration-snippet"),
        AnnotationStatus::Skipped
    );
}

#[test]
fn test_unknown_nginx_annotation_is_skipped() {
    let conversion = convert_one(&manifest(
        "web",
        &[("nginx.ingress.kubernetes.io/mirror-uri", "/mirror")],
        None,
    ));

    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/mirror-uri"),
        AnnotationStatus::Skipped
    );
    assert_eq!(conversion.result.ingress_routes.len(), 1);
}

#[test]
fn test_middleware_chain_follows_request_order() {
    let conversion = convert_one(&manifest(
        "web",
        &[
            ("nginx.ingress.kubernetes.io/limit-rps", "5"),
            ("nginx.ingress.kubernetes.io/whitelist-source-range", "10.0.0.0/8"),
            ("nginx.ingress.kubernetes.io/enable-cors", "true"),
        ],
        None,
    ));

    let refs: Vec<_> = conversion.result.ingress_routes[0].spec.routes[0]
        .middlewares
        .iter()
        .map(|m| m.name.clone())
        .collect();
    assert_eq!(refs.first().map(String::as_str), Some("web-cors"));
    assert_eq!(refs.len(), 3);
    assert!(refs.contains(&"web-ipallowlist".to_string()));
    assert!(refs.contains(&"web-ratelimit".to_string()));
}

#[test]
fn test_conversion_is_idempotent() {
    let yaml = [
        manifest(
            "web",
            &[
                ("nginx.ingress.kubernetes.io/limit-rps", "10"),
                ("nginx.ingress.kubernetes.io/enable-cors", "true"),
                ("cert-manager.io/cluster-issuer", "letsencrypt"),
            ],
            Some("web-tls"),
        ),
        manifest(
            "api",
            &[("nginx.ingress.kubernetes.io/rewrite-target", "/")],
            None,
        ),
    ]
    .join("---\n");

    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = BatchOutput::new();
        for ingress in parse_ingresses("test", &yaml).unwrap() {
            batch.push(convert_ingress(&ingress, &ConvertOptions::default(), None).result);
        }
        let written = batch.write_to(dir.path()).unwrap();
        let middlewares = std::fs::read_to_string(dir.path().join(MIDDLEWARES_FILE)).unwrap();
        let report = std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
        (written.digest, middlewares, report)
    };

    assert_eq!(run(), run());
}

#[test]
fn test_shared_secret_produces_one_certificate() {
    let issuer = [("cert-manager.io/cluster-issuer", "letsencrypt")];
    let yaml = [
        manifest("web", &issuer, Some("shared-tls")),
        manifest("api", &issuer, Some("shared-tls")),
    ]
    .join("---\n");

    let dir = tempfile::tempdir().unwrap();
    let mut batch = BatchOutput::new();
    for ingress in parse_ingresses("test", &yaml).unwrap() {
        batch.push(convert_ingress(&ingress, &ConvertOptions::default(), None).result);
    }
    batch.write_to(dir.path()).unwrap();

    assert_eq!(batch.certificates.len(), 1);
    let certificates = std::fs::read_to_string(dir.path().join(CERTIFICATES_FILE)).unwrap();
    assert_eq!(certificates.matches("kind: Certificate").count(), 1);
    assert!(certificates.contains("secretName: shared-tls"));
    assert!(certificates.contains("name: letsencrypt"));
}

#[test]
fn test_existing_certificate_is_extracted_and_sanitized() {
    let mut live = DynamicObject::new("storefront-cert", &certificate_api_resource())
        .within("shop")
        .data(json!({
            "spec": {"secretName": "web-tls", "dnsNames": ["shop.example.com"]},
            "status": {"conditions": [{"type": "Ready", "status": "True"}]},
        }));
    live.metadata.resource_version = Some("4711".to_string());
    live.metadata.uid = Some("0b7c".to_string());
    let cache = CertificateCache::new(InMemoryCertificates(vec![live]));

    let conversion = convert_with(
        &manifest(
            "web",
            &[("cert-manager.io/cluster-issuer", "letsencrypt")],
            Some("web-tls"),
        ),
        Some(&cache),
    );

    let certs = &conversion.result.certificates;
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].metadata.name.as_deref(), Some("storefront-cert"));
    assert!(certs[0].metadata.resource_version.is_none());
    assert!(certs[0].metadata.uid.is_none());
    assert!(certs[0].data.get("status").is_none());
    assert_eq!(
        status_of(&conversion, "cert-manager.io/cluster-issuer"),
        AnnotationStatus::Ignored
    );
}

#[test]
fn test_partial_output_when_cors_aborts() {
    let conversion = convert_one(&manifest(
        "web",
        &[
            ("nginx.ingress.kubernetes.io/enable-cors", "true"),
            ("nginx.ingress.kubernetes.io/cors-max-age", "forever"),
            ("nginx.ingress.kubernetes.io/limit-rps", "10"),
        ],
        None,
    ));

    assert!(conversion.error.is_some());
    assert!(conversion.result.ingress_routes.is_empty());
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/cors-max-age"),
        AnnotationStatus::Skipped
    );
}

#[test]
fn test_quoted_url_header_value_is_kept_whole() {
    let conversion = convert_one(&manifest(
        "web",
        &[(
            "nginx.ingress.kubernetes.io/configuration-snippet",
            "add_header Access-Control-Allow-Origin \"https://example.com\";",
        )],
        None,
    ));

    let result = &conversion.result;
    assert_eq!(result.middlewares.len(), 1);
    let headers = result.middlewares[0].spec.headers.as_ref().unwrap();
    let response = headers.custom_response_headers.as_ref().unwrap();
    assert_eq!(response.len(), 1);
    assert_eq!(
        response.get("Access-Control-Allow-Origin").unwrap(),
        "https://example.com"
    );
    assert!(result.warnings.is_empty());
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/configuration-snippet"),
        AnnotationStatus::Converted
    );
}

#[test]
fn test_invalid_rpm_does_not_drop_valid_rps() {
    let conversion = convert_one(&manifest(
        "web",
        &[
            ("nginx.ingress.kubernetes.io/limit-rps", "10"),
            ("nginx.ingress.kubernetes.io/limit-rpm", "abc"),
        ],
        None,
    ));

    let result = &conversion.result;
    assert!(conversion.error.is_none());
    assert_eq!(result.middlewares.len(), 1);
    let rate = result.middlewares[0].spec.rate_limit.as_ref().unwrap();
    assert_eq!(rate.average, 10);
    assert_eq!(
        result.ingress_routes[0].spec.routes[0].middlewares[0].name,
        "web-ratelimit"
    );
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/limit-rps"),
        AnnotationStatus::Converted
    );
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/limit-rpm"),
        AnnotationStatus::Skipped
    );
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_tooling_annotations_leave_no_trace_in_report() {
    let conversion = convert_one(&manifest(
        "web",
        &[
            ("meta.helm.sh/release-name", "storefront"),
            ("meta.helm.sh/release-namespace", "shop"),
            ("argocd.argoproj.io/sync-wave", "1"),
            ("nginx.ingress.kubernetes.io/limit-rps", "10"),
        ],
        None,
    ));

    let entries = conversion.result.report.entries();
    assert!(entries.iter().all(|e| !e.name.starts_with("meta.helm.sh/")));
    assert!(entries.iter().all(|e| !e.name.starts_with("argocd.argoproj.io/")));
    assert_eq!(
        status_of(&conversion, "nginx.ingress.kubernetes.io/limit-rps"),
        AnnotationStatus::Converted
    );
    assert!(conversion.result.warnings.is_empty());
}
