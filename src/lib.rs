// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # nginx2traefik - ingress-nginx to Traefik migration
//!
//! nginx2traefik reads Kubernetes `Ingress` objects annotated for
//! ingress-nginx and compiles them into Traefik custom resources:
//! `Middleware`, `IngressRoute` and `TLSOption`. TLS secrets referenced by
//! the Ingress are backed by cert-manager `Certificate` objects, either
//! extracted from the cluster or generated from `cert-manager.io/*`
//! annotations. Every recognized annotation ends up in a per-Ingress report
//! as converted, warning, skipped or ignored.
//!
//! ## Modules
//!
//! - [`annotations`] - The closed annotation vocabulary
//! - [`context`] - Per-Ingress conversion context, deltas and results
//! - [`converters`] - One converter per nginx directive family
//! - [`sequencer`] - Middleware chain ordering
//! - [`routes`] - IngressRoute compilation (matchers, scheme, TLS)
//! - [`certificates`] - cert-manager Certificate extraction and generation
//! - [`convert`] - The single-Ingress pipeline
//! - [`ingress`] - Manifest loading
//! - [`kubernetes`] - Cluster access
//! - [`output`] - Batch aggregation and file emission
//! - [`report`] / [`render`] - Migration report model and rendering
//! - [`crd`] - Traefik CRD types
//!
//! ## Example
//!
//! ```rust
//! use nginx2traefik::context::ConvertOptions;
//! use nginx2traefik::convert::convert_ingress;
//! use nginx2traefik::ingress::parse_ingresses;
//!
//! let manifest = r#"
//! apiVersion: networking.k8s.io/v1
//! kind: Ingress
//! metadata:
//!   name: web
//!   namespace: shop
//!   annotations:
//!     nginx.ingress.kubernetes.io/ssl-redirect: "true"
//! spec:
//!   rules:
//!     - host: shop.example.com
//!       http:
//!         paths:
//!           - path: /
//!             pathType: Prefix
//!             backend:
//!               service:
//!                 name: web
//!                 port:
//!                   number: 80
//! "#;
//!
//! let ingresses = parse_ingresses("inline", manifest).unwrap();
//! let conversion = convert_ingress(&ingresses[0], &ConvertOptions::default(), None);
//!
//! assert_eq!(conversion.result.middlewares.len(), 1);
//! assert_eq!(conversion.result.ingress_routes.len(), 1);
//! ```

pub mod annotations;
pub mod certificates;
pub mod constants;
pub mod context;
pub mod convert;
pub mod converters;
pub mod crd;
pub mod errors;
pub mod ingress;
pub mod kubernetes;
pub mod metrics;
pub mod output;
pub mod render;
pub mod report;
pub mod routes;
pub mod sequencer;
