//! Service compilation - produced iff the application declares ports.

use crate::domain::resource::{Resource, ResourcePayload, ServicePort, ServiceSpec, Transport};
use crate::domain::{AppSpec, ResourceKind};

use super::metadata;

pub(super) fn compile(spec: &AppSpec) -> Resource {
    let ports = spec
        .ports
        .iter()
        .map(|p| ServicePort {
            name: p.name.clone(),
            port: p.port,
            target_port: p.target_port,
            // Both http- and tcp-class app ports ride TCP transport; the
            // class tag only decides probes and ingress eligibility.
            protocol: Transport::Tcp,
        })
        .collect();

    Resource {
        kind: ResourceKind::Service,
        metadata: metadata::object_meta(spec, ResourceKind::Service, spec.name.clone()),
        payload: ResourcePayload::Service(ServiceSpec {
            selector: metadata::selector(spec),
            ports,
        }),
    }
}
