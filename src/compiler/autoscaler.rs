//! Autoscaler compilation - produced iff the policy is enabled, in which
//! case it owns the replica count and the workload's static count is
//! advisory.

use crate::domain::resource::{AutoscalerResourceSpec, Resource, ResourcePayload};
use crate::domain::{AppSpec, ResourceKind};

use super::metadata;

pub(super) fn compile(spec: &AppSpec) -> Resource {
    Resource {
        kind: ResourceKind::Autoscaler,
        metadata: metadata::object_meta(spec, ResourceKind::Autoscaler, spec.name.clone()),
        payload: ResourcePayload::Autoscaler(AutoscalerResourceSpec {
            target: spec.name.clone(),
            min_replicas: spec.autoscaler.min_replicas,
            max_replicas: spec.autoscaler.max_replicas,
            cpu_target_percent: spec.autoscaler.cpu_threshold_percent,
        }),
    }
}
