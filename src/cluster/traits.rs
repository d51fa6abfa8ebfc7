//! Cluster API trait definition.

use async_trait::async_trait;

use crate::domain::{Resource, ResourceKind};
use crate::error::ClusterError;

/// Get/create/update/delete primitives against the orchestrator API.
///
/// All calls are bounded by the adapter's own timeout; the daemon adds no
/// retry on top. A failed call surfaces as [`ClusterError::Transport`]
/// (transient) or [`ClusterError::Rejected`] (terminal for that object).
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Look up one resource by identity. `Ok(None)` when it does not exist.
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Resource>, ClusterError>;

    /// Create a resource that does not exist yet.
    async fn create(&self, resource: &Resource) -> Result<Resource, ClusterError>;

    /// Replace an existing resource.
    async fn update(&self, resource: &Resource) -> Result<Resource, ClusterError>;

    /// Delete a resource. Deleting an absent resource is not an error.
    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClusterError>;

    /// List resources of one kind matching a label selector, optionally
    /// scoped to a namespace.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<Resource>, ClusterError>;

    /// Backend name for logging and diagnostics.
    fn cluster_name(&self) -> &'static str;
}
