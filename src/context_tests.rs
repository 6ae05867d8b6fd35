// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `context.rs`

#[cfg(test)]
mod tests {
    use crate::annotations::Annotation;
    use crate::context::*;
    use crate::crd::MiddlewareSpec;
    use crate::report::AnnotationStatus;
    use k8s_openapi::api::networking::v1::{Ingress, IngressSpec, IngressTLS};
    use std::collections::BTreeMap;

    fn ingress(annotations: &[(&str, &str)], tls: bool) -> Ingress {
        let mut ing = Ingress::default();
        ing.metadata.name = Some("web".to_string());
        ing.metadata.namespace = Some("shop".to_string());
        ing.metadata.annotations = Some(
            annotations
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
        if tls {
            ing.spec = Some(IngressSpec {
                tls: Some(vec![IngressTLS {
                    hosts: Some(vec!["a.example.com".to_string()]),
                    secret_name: Some("web-tls".to_string()),
                }]),
                ..Default::default()
            });
        }
        ing
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.burst_multiplier, 5);
        assert_eq!(options.entry_point_policy, EntryPointPolicy::Tls);
        assert_eq!(options.web_entry_point, "web");
        assert_eq!(options.secure_entry_point, "websecure");
    }

    #[test]
    fn test_entry_point_policy_parsing() {
        assert_eq!(
            "backend-scheme".parse::<EntryPointPolicy>(),
            Ok(EntryPointPolicy::BackendScheme)
        );
        assert_eq!("TLS".parse::<EntryPointPolicy>(), Ok(EntryPointPolicy::Tls));
        assert!("scheme".parse::<EntryPointPolicy>().is_err());
        assert_eq!(EntryPointPolicy::BackendScheme.to_string(), "backend-scheme");
    }

    #[test]
    fn test_context_reads_annotations() {
        let ing = ingress(
            &[
                ("nginx.ingress.kubernetes.io/use-regex", "True"),
                ("nginx.ingress.kubernetes.io/auth-realm", "  "),
            ],
            false,
        );
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        assert_eq!(ctx.namespace, "shop");
        assert!(ctx.is_true(Annotation::UseRegex));
        assert!(ctx.has(Annotation::AuthRealm));
        assert_eq!(ctx.non_empty(Annotation::AuthRealm), None);
        assert_eq!(ctx.annotation(Annotation::LimitRps), None);
        assert!(!ctx.has_tls());
    }

    #[test]
    fn test_context_detects_tls() {
        let ing = ingress(&[], true);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);
        assert!(ctx.has_tls());
    }

    #[test]
    fn test_middleware_is_named_and_namespaced() {
        let ing = ingress(&[], false);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let mw = ctx.middleware("cors", MiddlewareSpec::default());
        assert_eq!(mw.metadata.name.as_deref(), Some("web-cors"));
        assert_eq!(mw.metadata.namespace.as_deref(), Some("shop"));
    }

    #[test]
    fn test_apply_folds_delta_in_order() {
        let ing = ingress(&[], false);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);
        let mut result = ConversionResult::new(&ctx);

        let mut first = Delta::default();
        first.middleware(ctx.middleware("a", MiddlewareSpec::default()));
        first.converted("key-a");

        let mut second = Delta::default();
        second.middleware(ctx.middleware("b", MiddlewareSpec::default()));
        second.skip_with_warning("key-b", "needs manual work");
        second.tls_option_ref = Some("web-mtls".to_string());

        result.apply(first);
        result.apply(second);

        let names: Vec<_> = result
            .middlewares
            .iter()
            .filter_map(|m| m.metadata.name.as_deref())
            .collect();
        assert_eq!(names, vec!["web-a", "web-b"]);
        assert_eq!(result.warnings, vec!["needs manual work"]);
        assert_eq!(result.report.entries().len(), 2);
        assert_eq!(result.report.entries()[1].status, AnnotationStatus::Skipped);
        assert_eq!(result.tls_option_for("web"), Some("web-mtls"));
    }

    #[test]
    fn test_empty_delta() {
        let mut delta = Delta::default();
        assert!(delta.is_empty());
        delta.warn("x");
        assert!(!delta.is_empty());
    }
}
