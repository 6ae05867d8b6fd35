// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the Traefik CRD types.

#[cfg(test)]
mod tests {
    use crate::crd::*;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use kube::Resource;
    use std::collections::BTreeMap;

    #[test]
    fn test_middleware_api_version_and_kind() {
        assert_eq!(Middleware::api_version(&()), "traefik.io/v1alpha1");
        assert_eq!(Middleware::kind(&()), "Middleware");
        assert_eq!(IngressRoute::kind(&()), "IngressRoute");
        assert_eq!(TLSOption::kind(&()), "TLSOption");
    }

    #[test]
    fn test_unset_blocks_are_not_serialized() {
        let spec = MiddlewareSpec {
            rate_limit: Some(RateLimit {
                average: 10,
                period: None,
                burst: 50,
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&spec).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1, "Only rateLimit should be present: {value}");
        assert_eq!(value["rateLimit"]["average"], 10);
        assert_eq!(value["rateLimit"]["burst"], 50);
        assert!(value["rateLimit"].get("period").is_none());
    }

    #[test]
    fn test_middleware_schema_lists_only_emitted_blocks() {
        let schema = schemars::schema_for!(MiddlewareSpec);
        let mut properties: Vec<&str> = schema.as_value()["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        properties.sort_unstable();

        assert_eq!(
            properties,
            vec![
                "basicAuth",
                "buffering",
                "forwardAuth",
                "headers",
                "inFlightReq",
                "ipAllowList",
                "rateLimit",
                "redirectScheme",
                "replacePathRegex",
            ]
        );
    }

    #[test]
    fn test_rate_limit_period_serializes_as_string() {
        let limit = RateLimit {
            average: 100,
            period: Some(IntOrString::String("1m".to_string())),
            burst: 500,
        };
        let value = serde_json::to_value(&limit).unwrap();
        assert_eq!(value["period"], "1m");
    }

    #[test]
    fn test_field_names_use_traefik_casing() {
        let spec = MiddlewareSpec {
            ip_allow_list: Some(IpAllowList {
                source_range: vec!["10.0.0.0/8".to_string()],
            }),
            in_flight_req: Some(InFlightReq {
                amount: 5,
                source_criterion: Some(SourceCriterion {
                    ip_strategy: Some(IpStrategy::default()),
                }),
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["ipAllowList"]["sourceRange"][0], "10.0.0.0/8");
        assert_eq!(value["inFlightReq"]["amount"], 5);
        assert!(value["inFlightReq"]["sourceCriterion"]["ipStrategy"].is_object());
    }

    #[test]
    fn test_headers_serialization() {
        let mut response = BTreeMap::new();
        response.insert("X-Foo".to_string(), "bar".to_string());
        let headers = Headers {
            custom_response_headers: Some(response),
            access_control_allow_credentials: Some(true),
            access_control_max_age: Some(600),
            ..Default::default()
        };

        let value = serde_json::to_value(&headers).unwrap();
        assert_eq!(value["customResponseHeaders"]["X-Foo"], "bar");
        assert_eq!(value["accessControlAllowCredentials"], true);
        assert_eq!(value["accessControlMaxAge"], 600);
        assert!(value.get("customRequestHeaders").is_none());
    }

    #[test]
    fn test_route_match_field_is_renamed() {
        let route = Route {
            kind: "Rule".to_string(),
            r#match: "Host(`a.example.com`)".to_string(),
            services: vec![RouteService {
                name: "web".to_string(),
                port: IntOrString::Int(80),
                scheme: Some("http".to_string()),
            }],
            middlewares: vec![],
        };

        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["match"], "Host(`a.example.com`)");
        assert_eq!(value["services"][0]["port"], 80);
        assert!(
            value.get("middlewares").is_none(),
            "Empty middleware list should be omitted"
        );
    }

    #[test]
    fn test_ingress_route_yaml_round_trip() {
        let yaml = r"
apiVersion: traefik.io/v1alpha1
kind: IngressRoute
metadata:
  name: web
  namespace: shop
spec:
  entryPoints: [websecure]
  routes:
    - kind: Rule
      match: PathPrefix(`/`)
      services:
        - name: web
          port: http
      middlewares:
        - name: web-cors
  tls:
    secretName: web-tls
    options:
      name: web-mtls
";
        let route: IngressRoute = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(route.spec.entry_points, vec!["websecure"]);
        assert_eq!(
            route.spec.routes[0].services[0].port,
            IntOrString::String("http".to_string())
        );
        assert_eq!(route.spec.routes[0].middlewares[0].name, "web-cors");
        let tls = route.spec.tls.unwrap();
        assert_eq!(tls.secret_name.as_deref(), Some("web-tls"));
        assert_eq!(tls.options.unwrap().name, "web-mtls");
    }

    #[test]
    fn test_tls_option_client_auth() {
        let spec = TLSOptionSpec {
            client_auth: Some(ClientAuth {
                secret_names: vec!["ca".to_string()],
                client_auth_type: "RequireAndVerifyClientCert".to_string(),
            }),
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["clientAuth"]["secretNames"][0], "ca");
        assert_eq!(
            value["clientAuth"]["clientAuthType"],
            "RequireAndVerifyClientCert"
        );
    }
}
