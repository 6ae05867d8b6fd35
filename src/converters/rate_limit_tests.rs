// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `rate_limit.rs`

#[cfg(test)]
mod tests {
    use crate::context::{ConversionContext, ConvertOptions};
    use crate::converters::rate_limit::{limit_connections, rate_limit};
    use crate::converters::test_support::ingress;
    use crate::report::AnnotationStatus;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

    const RPS: &str = "nginx.ingress.kubernetes.io/limit-rps";
    const RPM: &str = "nginx.ingress.kubernetes.io/limit-rpm";
    const MULTIPLIER: &str = "nginx.ingress.kubernetes.io/limit-burst-multiplier";
    const CONNECTIONS: &str = "nginx.ingress.kubernetes.io/limit-connections";

    #[test]
    fn test_rps_uses_default_multiplier() {
        let ing = ingress(&[(RPS, "10")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();

        assert_eq!(delta.middlewares.len(), 1);
        let mw = &delta.middlewares[0];
        assert_eq!(mw.metadata.name.as_deref(), Some("web-ratelimit"));
        let limit = mw.spec.rate_limit.as_ref().unwrap();
        assert_eq!(limit.average, 10);
        assert_eq!(limit.burst, 50);
        assert_eq!(limit.period, None);
    }

    #[test]
    fn test_configured_multiplier_is_used() {
        let ing = ingress(&[(RPS, "4")]);
        let options = ConvertOptions {
            burst_multiplier: 3,
            ..Default::default()
        };
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();
        assert_eq!(delta.middlewares[0].spec.rate_limit.as_ref().unwrap().burst, 12);
    }

    #[test]
    fn test_rps_and_rpm_produce_two_middlewares() {
        let ing = ingress(&[(RPS, "10"), (RPM, "300"), (MULTIPLIER, "2")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();

        let names: Vec<_> = delta
            .middlewares
            .iter()
            .filter_map(|m| m.metadata.name.as_deref())
            .collect();
        assert_eq!(names, vec!["web-ratelimit", "web-ratelimit-rpm"]);

        let rpm = delta.middlewares[1].spec.rate_limit.as_ref().unwrap();
        assert_eq!(rpm.average, 300);
        assert_eq!(rpm.burst, 600);
        assert_eq!(rpm.period, Some(IntOrString::String("1m".to_string())));
        assert_eq!(delta.entries.len(), 3);
    }

    #[test]
    fn test_rpm_alone_keeps_plain_name() {
        let ing = ingress(&[(RPM, "60")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();
        assert_eq!(
            delta.middlewares[0].metadata.name.as_deref(),
            Some("web-ratelimit")
        );
    }

    #[test]
    fn test_invalid_multiplier_falls_back_to_default() {
        let ing = ingress(&[(RPS, "2"), (MULTIPLIER, "lots")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();
        assert_eq!(delta.middlewares[0].spec.rate_limit.as_ref().unwrap().burst, 10);
        assert_eq!(delta.warnings.len(), 1);
        assert_eq!(delta.entries[0].status, AnnotationStatus::Warned);
    }

    #[test]
    fn test_invalid_rate_is_skipped_with_warning() {
        let ing = ingress(&[(RPS, "fast")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();
        assert!(delta.middlewares.is_empty());
        assert_eq!(delta.warnings.len(), 1);
        assert_eq!(delta.entries[0].name, RPS);
        assert_eq!(delta.entries[0].status, AnnotationStatus::Skipped);
    }

    #[test]
    fn test_invalid_rpm_keeps_valid_rps() {
        let ing = ingress(&[(RPS, "10"), (RPM, "abc")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();

        assert_eq!(delta.middlewares.len(), 1);
        assert_eq!(
            delta.middlewares[0].metadata.name.as_deref(),
            Some("web-ratelimit")
        );
        let limit = delta.middlewares[0].spec.rate_limit.as_ref().unwrap();
        assert_eq!(limit.average, 10);
        assert_eq!(limit.period, None);

        let status = |key: &str| delta.entries.iter().find(|e| e.name == key).map(|e| e.status);
        assert_eq!(status(RPS), Some(AnnotationStatus::Converted));
        assert_eq!(status(RPM), Some(AnnotationStatus::Skipped));
        assert_eq!(delta.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_rps_keeps_valid_rpm() {
        let ing = ingress(&[(RPS, "lots"), (RPM, "120")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = rate_limit(&ctx).unwrap();

        assert_eq!(delta.middlewares.len(), 1);
        assert_eq!(
            delta.middlewares[0].metadata.name.as_deref(),
            Some("web-ratelimit"),
            "rpm takes the plain name when no rps middleware was emitted"
        );
        let limit = delta.middlewares[0].spec.rate_limit.as_ref().unwrap();
        assert_eq!(limit.average, 120);
        assert_eq!(limit.burst, 600);
        assert_eq!(limit.period, Some(IntOrString::String("1m".to_string())));

        let status = |key: &str| delta.entries.iter().find(|e| e.name == key).map(|e| e.status);
        assert_eq!(status(RPS), Some(AnnotationStatus::Skipped));
        assert_eq!(status(RPM), Some(AnnotationStatus::Converted));
    }

    #[test]
    fn test_limit_connections() {
        let ing = ingress(&[(CONNECTIONS, "20")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = limit_connections(&ctx).unwrap();
        let in_flight = delta.middlewares[0].spec.in_flight_req.as_ref().unwrap();
        assert_eq!(in_flight.amount, 20);
        assert!(in_flight
            .source_criterion
            .as_ref()
            .unwrap()
            .ip_strategy
            .is_some());
        assert_eq!(
            delta.middlewares[0].metadata.name.as_deref(),
            Some("web-inflightreq")
        );
    }

    #[test]
    fn test_invalid_limit_connections_warns() {
        let ing = ingress(&[(CONNECTIONS, "-1")]);
        let options = ConvertOptions::default();
        let ctx = ConversionContext::new(&ing, &options);

        let delta = limit_connections(&ctx).unwrap();
        assert!(delta.middlewares.is_empty());
        assert_eq!(delta.entries[0].status, AnnotationStatus::Warned);
    }
}
