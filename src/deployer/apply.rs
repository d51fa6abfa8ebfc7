//! Idempotent per-resource apply.

use std::fmt;

use crate::cluster::ClusterApi;
use crate::domain::resource::ObjectMeta;
use crate::domain::Resource;
use crate::error::ClusterError;

/// What applying one resource did to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
    /// The live object already matched; no mutating call was made.
    Unchanged,
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Created => write!(f, "created"),
            Applied::Updated => write!(f, "updated"),
            Applied::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Apply one desired resource against live cluster state.
///
/// Absent: create. Present: merge the daemon's bookkeeping into the live
/// metadata and update only when the merged object differs, so re-applying
/// an unchanged spec issues zero mutating calls.
pub(super) async fn apply(
    cluster: &dyn ClusterApi,
    desired: &Resource,
) -> Result<Applied, ClusterError> {
    let existing = cluster
        .get(desired.kind, desired.namespace(), desired.name())
        .await?;

    match existing {
        None => {
            cluster.create(desired).await?;
            Ok(Applied::Created)
        }
        Some(existing) => {
            let merged = merge(&existing, desired);
            if merged == existing {
                Ok(Applied::Unchanged)
            } else {
                cluster.update(&merged).await?;
                Ok(Applied::Updated)
            }
        }
    }
}

/// Merge a desired resource onto the live object.
///
/// Labels and annotations are merge-patched, not overwritten wholesale:
/// keys added by operators or the orchestrator survive, while the daemon's
/// own keys win on collision. The payload is owned by the daemon and
/// replaced entirely.
pub(super) fn merge(existing: &Resource, desired: &Resource) -> Resource {
    let mut labels = existing.metadata.labels.clone();
    labels.extend(
        desired
            .metadata
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let mut annotations = existing.metadata.annotations.clone();
    annotations.extend(
        desired
            .metadata
            .annotations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    Resource {
        kind: desired.kind,
        metadata: ObjectMeta {
            name: desired.metadata.name.clone(),
            namespace: desired.metadata.namespace.clone(),
            labels,
            annotations,
        },
        payload: desired.payload.clone(),
    }
}
