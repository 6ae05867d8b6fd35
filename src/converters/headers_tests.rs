// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `headers.rs` and `access.rs`

#[cfg(test)]
mod tests {
    use crate::context::{ConversionContext, ConvertOptions};
    use crate::converters::access::whitelist_source_range;
    use crate::converters::headers::upstream_vhost;
    use crate::converters::test_support::ingress;
    use crate::report::AnnotationStatus;

    #[test]
    fn test_upstream_vhost_sets_host_header() {
        let ing = ingress(&[(
            "nginx.ingress.kubernetes.io/upstream-vhost",
            "internal.example.com",
        )]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = upstream_vhost(&ctx).unwrap();

        let mw = &delta.middlewares[0];
        assert_eq!(mw.metadata.name.as_deref(), Some("web-upstream-vhost"));
        let request = mw
            .spec
            .headers
            .as_ref()
            .and_then(|h| h.custom_request_headers.as_ref())
            .unwrap();
        assert_eq!(
            request.get("Host").map(String::as_str),
            Some("internal.example.com")
        );
    }

    #[test]
    fn test_whitelist_source_range() {
        let ing = ingress(&[(
            "nginx.ingress.kubernetes.io/whitelist-source-range",
            "10.0.0.0/8, 192.168.0.1",
        )]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = whitelist_source_range(&ctx).unwrap();

        let allow = delta.middlewares[0].spec.ip_allow_list.as_ref().unwrap();
        assert_eq!(allow.source_range, vec!["10.0.0.0/8", "192.168.0.1"]);
        assert_eq!(
            delta.middlewares[0].metadata.name.as_deref(),
            Some("web-ipallowlist")
        );
        assert_eq!(delta.entries[0].status, AnnotationStatus::Converted);
    }

    #[test]
    fn test_empty_whitelist_is_ignored() {
        let ing = ingress(&[("nginx.ingress.kubernetes.io/whitelist-source-range", " , ")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = whitelist_source_range(&ctx).unwrap();
        assert!(delta.middlewares.is_empty());
        assert_eq!(delta.entries[0].status, AnnotationStatus::Ignored);
    }
}
