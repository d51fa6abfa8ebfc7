//! Ingress compilation - produced iff the application has an http-class
//! port and declares at least one path mapping.

use crate::domain::resource::{IngressPath, IngressRule, IngressSpec, Resource, ResourcePayload};
use crate::domain::{AppSpec, ResourceKind};

use super::metadata;

pub(super) fn compile(spec: &AppSpec) -> Option<Resource> {
    if spec.http_ports().next().is_none() {
        return None;
    }

    let rules: Vec<IngressRule> = spec
        .ingresses
        .iter()
        .filter(|item| !item.path_mappings.is_empty())
        .map(|item| IngressRule {
            host: item.host.clone(),
            paths: item
                .path_mappings
                .iter()
                .map(|m| IngressPath {
                    path: m.path.clone(),
                    service_port: m.port,
                })
                .collect(),
        })
        .collect();

    if rules.is_empty() {
        return None;
    }

    Some(Resource {
        kind: ResourceKind::Ingress,
        metadata: metadata::object_meta(spec, ResourceKind::Ingress, spec.name.clone()),
        payload: ResourcePayload::Ingress(IngressSpec { rules }),
    })
}
