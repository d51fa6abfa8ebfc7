//! HTTP cluster adapter.
//!
//! Speaks a plain JSON REST dialect against the orchestrator API:
//! `{base}/namespaces/{namespace}/{collection}[/{name}]`, resources
//! serialized in their serde form. Authentication is a bearer token;
//! outbound traffic optionally goes through a proxy.
//!
//! Status mapping: 404 on get is absence, other 4xx is a terminal
//! [`ClusterError::Rejected`], everything else that fails is a retryable
//! [`ClusterError::Transport`] healed by the next re-sync.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::cluster::ClusterApi;
use crate::config::ClusterConfig;
use crate::domain::{Resource, ResourceKind};
use crate::error::{ClusterError, ConfigError, Error, Result};

pub struct HttpClusterApi {
    client: Client,
    base_url: String,
}

impl HttpClusterApi {
    /// Build a client from the cluster section of the configuration.
    pub fn new(config: &ClusterConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        if let Some(token) = &config.token {
            let mut headers = reqwest::header::HeaderMap::new();
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| {
                    Error::Config(ConfigError::InvalidValue {
                        field: "cluster.token",
                        reason: err.to_string(),
                    })
                })?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, kind: ResourceKind, namespace: &str) -> String {
        format!(
            "{}/namespaces/{}/{}",
            self.base_url,
            namespace,
            kind.collection()
        )
    }

    fn item_url(&self, kind: ResourceKind, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_url(kind, namespace), name)
    }

    async fn check(
        response: reqwest::Response,
        kind: ResourceKind,
        name: &str,
    ) -> std::result::Result<reqwest::Response, ClusterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ClusterError::Rejected {
                kind: kind.name().to_string(),
                name: name.to_string(),
                reason: format!("{status}: {body}"),
            })
        } else {
            Err(ClusterError::transport(format!("{status}: {body}")))
        }
    }
}

fn transport(err: reqwest::Error) -> ClusterError {
    ClusterError::Transport {
        reason: err.to_string(),
        source: Some(err),
    }
}

#[async_trait]
impl ClusterApi for HttpClusterApi {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<Option<Resource>, ClusterError> {
        let url = self.item_url(kind, namespace, name);
        debug!(url = %url, "GET resource");

        let response = self.client.get(&url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, kind, name).await?;
        let resource = response.json().await.map_err(transport)?;
        Ok(Some(resource))
    }

    async fn create(&self, resource: &Resource) -> std::result::Result<Resource, ClusterError> {
        let url = self.collection_url(resource.kind, resource.namespace());
        debug!(url = %url, name = resource.name(), "POST resource");

        let response = self
            .client
            .post(&url)
            .json(resource)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, resource.kind, resource.name()).await?;
        response.json().await.map_err(transport)
    }

    async fn update(&self, resource: &Resource) -> std::result::Result<Resource, ClusterError> {
        let url = self.item_url(resource.kind, resource.namespace(), resource.name());
        debug!(url = %url, "PUT resource");

        let response = self
            .client
            .put(&url)
            .json(resource)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, resource.kind, resource.name()).await?;
        response.json().await.map_err(transport)
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<(), ClusterError> {
        let url = self.item_url(kind, namespace, name);
        debug!(url = %url, "DELETE resource");

        let response = self.client.delete(&url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response, kind, name).await?;
        Ok(())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> std::result::Result<Vec<Resource>, ClusterError> {
        let url = match namespace {
            Some(namespace) => self.collection_url(kind, namespace),
            None => format!("{}/{}", self.base_url, kind.collection()),
        };
        debug!(url = %url, selector = label_selector, "LIST resources");

        let response = self
            .client
            .get(&url)
            .query(&[("labelSelector", label_selector)])
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, kind, "").await?;
        response.json().await.map_err(transport)
    }

    fn cluster_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_namespace_collection_layout() {
        let api = HttpClusterApi::new(&ClusterConfig {
            api_url: "https://cluster.example.com/".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            api.item_url(ResourceKind::Workload, "default", "testapp"),
            "https://cluster.example.com/namespaces/default/workloads/testapp"
        );
        assert_eq!(
            api.collection_url(ResourceKind::Ingress, "apps"),
            "https://cluster.example.com/namespaces/apps/ingresses"
        );
    }

    #[test]
    fn rejects_token_with_invalid_characters() {
        let result = HttpClusterApi::new(&ClusterConfig {
            token: Some("bad\ntoken".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
