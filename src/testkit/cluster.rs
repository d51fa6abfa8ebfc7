//! Recording in-memory cluster fake.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cluster::ClusterApi;
use crate::domain::{Resource, ResourceKind};
use crate::error::ClusterError;

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(ResourceKind, String, String),
    Create(ResourceKind, String),
    Update(ResourceKind, String),
    Delete(ResourceKind, String, String),
    List(ResourceKind),
}

impl Call {
    /// True for calls that mutate cluster state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Create(..) | Call::Update(..) | Call::Delete(..))
    }
}

type Key = (ResourceKind, String, String);

/// In-memory [`ClusterApi`] that records every call and can force
/// per-kind transport failures on mutations.
#[derive(Default)]
pub struct InMemoryCluster {
    objects: Mutex<HashMap<Key, Resource>>,
    calls: Mutex<Vec<Call>>,
    failing_kinds: Mutex<HashSet<ResourceKind>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every mutation of the given kind to fail with a transport
    /// error.
    pub fn fail_kind(&self, kind: ResourceKind) {
        self.failing_kinds.lock().insert(kind);
    }

    /// Stop failing the given kind.
    pub fn heal_kind(&self, kind: ResourceKind) {
        self.failing_kinds.lock().remove(&kind);
    }

    /// Place a resource into the cluster without recording a call.
    pub fn seed(&self, resource: Resource) {
        let key = key_of(&resource);
        self.objects.lock().insert(key, resource);
    }

    /// All recorded calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of recorded mutating calls.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_mutation()).count()
    }

    /// Forget recorded calls, keeping the stored objects.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    #[must_use]
    pub fn contains(&self, kind: ResourceKind, namespace: &str, name: &str) -> bool {
        self.objects
            .lock()
            .contains_key(&(kind, namespace.to_string(), name.to_string()))
    }

    /// A stored resource, by identity.
    #[must_use]
    pub fn stored(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<Resource> {
        self.objects
            .lock()
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check_failure(&self, kind: ResourceKind) -> Result<(), ClusterError> {
        if self.failing_kinds.lock().contains(&kind) {
            Err(ClusterError::transport(format!(
                "forced failure for {kind}"
            )))
        } else {
            Ok(())
        }
    }
}

fn key_of(resource: &Resource) -> Key {
    (
        resource.kind,
        resource.namespace().to_string(),
        resource.name().to_string(),
    )
}

/// Parse a `key=value` label selector.
fn selector_matches(selector: &str, resource: &Resource) -> bool {
    if selector.is_empty() {
        return true;
    }
    selector.split(',').all(|clause| {
        match clause.split_once('=') {
            Some((key, value)) => {
                resource.metadata.labels.get(key.trim()) == Some(&value.trim().to_string())
            }
            None => false,
        }
    })
}

#[async_trait]
impl ClusterApi for InMemoryCluster {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Resource>, ClusterError> {
        self.record(Call::Get(kind, namespace.to_string(), name.to_string()));
        Ok(self.stored(kind, namespace, name))
    }

    async fn create(&self, resource: &Resource) -> Result<Resource, ClusterError> {
        self.record(Call::Create(resource.kind, resource.name().to_string()));
        self.check_failure(resource.kind)?;
        self.objects
            .lock()
            .insert(key_of(resource), resource.clone());
        Ok(resource.clone())
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, ClusterError> {
        self.record(Call::Update(resource.kind, resource.name().to_string()));
        self.check_failure(resource.kind)?;
        self.objects
            .lock()
            .insert(key_of(resource), resource.clone());
        Ok(resource.clone())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClusterError> {
        self.record(Call::Delete(kind, namespace.to_string(), name.to_string()));
        self.check_failure(kind)?;
        self.objects
            .lock()
            .remove(&(kind, namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        label_selector: &str,
    ) -> Result<Vec<Resource>, ClusterError> {
        self.record(Call::List(kind));
        let objects = self.objects.lock();
        let mut matches: Vec<Resource> = objects
            .iter()
            .filter(|((k, ns, _), _)| {
                *k == kind && namespace.map_or(true, |scope| ns.as_str() == scope)
            })
            .map(|(_, resource)| resource.clone())
            .filter(|resource| selector_matches(label_selector, resource))
            .collect();
        matches.sort_by(|a, b| {
            (a.namespace(), a.name()).cmp(&(b.namespace(), b.name()))
        });
        Ok(matches)
    }

    fn cluster_name(&self) -> &'static str {
        "in-memory"
    }
}
