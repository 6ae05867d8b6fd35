// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster access: client bootstrap, paginated listing and the cluster-backed
//! certificate source.
//!
//! The converter itself is synchronous. [`KubeCertificateSource`] bridges the
//! async kube client into the synchronous [`CertificateSource`] trait by
//! blocking on a runtime [`Handle`]; it must be called from a thread that is
//! not driving that runtime.

use crate::certificates::{certificate_api_resource, CertificateSource};
use crate::constants::KUBE_LIST_PAGE_SIZE;
use crate::errors::ConvertError;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Build a client from the local kubeconfig, or the in-cluster config when no
/// context is requested and no kubeconfig is present.
///
/// # Errors
///
/// Returns an error when no usable configuration is found.
pub async fn connect(context: Option<&str>) -> anyhow::Result<Client> {
    let config = match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(Kubeconfig::read()?, &options).await?
        }
        None => Config::infer().await?,
    };
    info!(
        cluster_url = %config.cluster_url,
        context = context.unwrap_or("<default>"),
        "Connecting to Kubernetes"
    );
    Ok(Client::try_from(config)?)
}

/// List all resources with automatic pagination.
///
/// Fetches pages of [`KUBE_LIST_PAGE_SIZE`] items and follows continue tokens.
///
/// # Example
///
/// ```no_run
/// use k8s_openapi::api::networking::v1::Ingress;
/// use kube::{Api, Client, api::ListParams};
/// use nginx2traefik::kubernetes::list_all_paginated;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = Client::try_default().await?;
/// let api: Api<Ingress> = Api::namespaced(client, "default");
///
/// let ingresses = list_all_paginated(&api, ListParams::default()).await?;
/// println!("Found {} ingresses", ingresses.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the first failing API call's error.
pub async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
) -> Result<Vec<K>, kube::Error>
where
    K: Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(token) if !token.is_empty() => list_params.continue_token = Some(token),
            _ => break,
        }
    }

    debug!(
        total_pages = page_count,
        total_items = all_items.len(),
        "Completed paginated list operation"
    );

    Ok(all_items)
}

/// Ingresses in `namespace`, or in every namespace when `None`.
///
/// # Errors
///
/// Returns [`ConvertError::Kube`] when listing fails.
pub async fn list_ingresses(
    client: Client,
    namespace: Option<&str>,
) -> Result<Vec<Ingress>, ConvertError> {
    let api: Api<Ingress> = match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };
    let ingresses = list_all_paginated(&api, ListParams::default()).await?;
    info!(
        namespace = namespace.unwrap_or("<all>"),
        count = ingresses.len(),
        "Listed Ingresses"
    );
    Ok(ingresses)
}

/// Whether an API error means the resource type is not served (CRD absent).
#[must_use]
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 404)
}

/// Lists cert-manager Certificates through the API server.
pub struct KubeCertificateSource {
    client: Client,
    handle: Handle,
}

impl KubeCertificateSource {
    #[must_use]
    pub fn new(client: Client, handle: Handle) -> Self {
        Self { client, handle }
    }
}

impl CertificateSource for KubeCertificateSource {
    fn list(&self, namespace: &str) -> Result<Option<Vec<DynamicObject>>, ConvertError> {
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            namespace,
            &certificate_api_resource(),
        );

        match self
            .handle
            .block_on(list_all_paginated(&api, ListParams::default()))
        {
            Ok(items) => Ok(Some(items)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(ConvertError::CertificateLookup {
                namespace: namespace.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod kubernetes_tests;
