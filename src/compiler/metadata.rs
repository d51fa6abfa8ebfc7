//! Bookkeeping labels and overlay merging.
//!
//! Every produced resource carries the application's label/annotation overlay
//! for its kind, merged with the daemon's bookkeeping keys. Bookkeeping wins
//! on collision so the deployer can always identify resources it owns.

use std::collections::BTreeMap;

use crate::domain::resource::ObjectMeta;
use crate::domain::{AppSpec, ResourceKind};

/// Label naming the application; doubles as the workload selector.
pub const LABEL_APP: &str = "app";
/// Marker label identifying resources owned by this daemon.
pub const LABEL_MANAGED_BY: &str = "deckhand.io/managed-by";
/// Value of [`LABEL_MANAGED_BY`] on everything we create.
pub const MANAGED_BY: &str = "deckhand";
/// Label correlating a resource to the deploy attempt that produced it.
pub const LABEL_DEPLOYMENT_ID: &str = "deckhand.io/deployment-id";
/// Workload annotation holding the serialized spec, read back by re-sync.
pub const ANNOTATION_SPEC: &str = "deckhand.io/spec";

/// Label selector matching every resource this daemon manages.
#[must_use]
pub fn managed_selector() -> String {
    format!("{LABEL_MANAGED_BY}={MANAGED_BY}")
}

/// The selector tying service and autoscaler to the workload's pods.
pub fn selector(spec: &AppSpec) -> BTreeMap<String, String> {
    let mut selector = BTreeMap::new();
    selector.insert(LABEL_APP.to_string(), spec.name.clone());
    selector
}

/// Metadata for a resource of the given kind and name.
pub fn object_meta(spec: &AppSpec, kind: ResourceKind, name: String) -> ObjectMeta {
    let (overlay_labels, overlay_annotations) = overlay_for(spec, kind);

    let mut labels = overlay_labels.clone();
    labels.insert(LABEL_APP.to_string(), spec.name.clone());
    labels.insert(LABEL_MANAGED_BY.to_string(), MANAGED_BY.to_string());
    labels.insert(
        LABEL_DEPLOYMENT_ID.to_string(),
        spec.deployment_id.to_string(),
    );

    ObjectMeta {
        name,
        namespace: spec.namespace.clone(),
        labels,
        annotations: overlay_annotations.clone(),
    }
}

/// Workload metadata additionally carries the serialized spec, which the
/// scheduler reads back to re-sync without any local cache.
pub fn workload_meta(spec: &AppSpec) -> ObjectMeta {
    let mut meta = object_meta(spec, ResourceKind::Workload, spec.name.clone());
    meta.annotations.insert(
        ANNOTATION_SPEC.to_string(),
        serde_json::to_string(spec).unwrap_or_default(),
    );
    meta
}

fn overlay_for(
    spec: &AppSpec,
    kind: ResourceKind,
) -> (&BTreeMap<String, String>, &BTreeMap<String, String>) {
    match kind {
        ResourceKind::Workload | ResourceKind::ConfigMap => {
            (&spec.labels.workload, &spec.annotations.workload)
        }
        ResourceKind::Service => (&spec.labels.service, &spec.annotations.service),
        ResourceKind::Ingress => (&spec.labels.ingress, &spec.annotations.ingress),
        ResourceKind::Autoscaler => (&spec.labels.autoscaler, &spec.annotations.autoscaler),
    }
}
