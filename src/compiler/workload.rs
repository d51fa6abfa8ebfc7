//! Workload compilation - always produced, one per application.

use crate::domain::resource::{
    ContainerPort, ContainerSpec, EnvVar, Probe, ProbeAction, Resource, ResourcePayload,
    WorkloadSpec,
};
use crate::domain::spec::{CheckSpec, MetricsSpec, ProbeMode};
use crate::domain::{AppSpec, ResourceKind};

use super::metadata;

/// Image used for the optional metrics sidecar container.
const SIDECAR_IMAGE: &str = "deckhand/metrics-sidecar:stable";

/// Service account granted to workloads with admin access.
const ADMIN_SERVICE_ACCOUNT: &str = "deckhand-admin";

pub(super) fn compile(spec: &AppSpec) -> Resource {
    let mut containers = vec![main_container(spec)];
    if spec.sidecar_enabled {
        containers.push(sidecar_container());
    }

    let mut pod_annotations = spec.annotations.pod.clone();
    if spec.metrics.enabled {
        stamp_scrape_annotations(&mut pod_annotations, &spec.metrics);
    }

    Resource {
        kind: ResourceKind::Workload,
        metadata: metadata::workload_meta(spec),
        payload: ResourcePayload::Workload(WorkloadSpec {
            replicas: spec.replicas,
            selector: metadata::selector(spec),
            containers,
            pod_annotations,
            service_account: spec
                .admin_access
                .then(|| ADMIN_SERVICE_ACCOUNT.to_string()),
        }),
    }
}

fn main_container(spec: &AppSpec) -> ContainerSpec {
    ContainerSpec {
        name: spec.name.clone(),
        image: spec.image.clone(),
        ports: spec
            .ports
            .iter()
            .map(|p| ContainerPort {
                name: p.name.clone(),
                port: p.target_port,
            })
            .collect(),
        env: vec![
            EnvVar {
                name: "IMAGE".to_string(),
                value: spec.image.clone(),
            },
            EnvVar {
                name: "VERSION".to_string(),
                value: spec.version().to_string(),
            },
        ],
        env_from_secret: spec.secrets_in_environment.then(|| spec.name.clone()),
        resources: spec.resources.clone(),
        liveness: Some(probe(&spec.health_checks.liveness)),
        readiness: Some(probe(&spec.health_checks.readiness)),
    }
}

fn sidecar_container() -> ContainerSpec {
    ContainerSpec {
        name: "metrics-sidecar".to_string(),
        image: SIDECAR_IMAGE.to_string(),
        ports: Vec::new(),
        env: Vec::new(),
        env_from_secret: None,
        resources: Default::default(),
        liveness: None,
        readiness: None,
    }
}

/// Translate a spec health check 1:1 into an orchestrator probe.
fn probe(check: &CheckSpec) -> Probe {
    let action = match &check.probe {
        ProbeMode::Http {
            path,
            port,
            headers,
        } => ProbeAction::Http {
            path: path.clone(),
            port: *port,
            headers: headers.clone(),
        },
        ProbeMode::Tcp { port } => ProbeAction::Tcp { port: *port },
        ProbeMode::Exec { command } => ProbeAction::Exec {
            command: command.clone(),
        },
    };
    Probe {
        action,
        initial_delay_seconds: check.initial_delay_seconds,
        period_seconds: check.period_seconds,
        success_threshold: check.success_threshold,
        timeout_seconds: check.timeout_seconds,
    }
}

fn stamp_scrape_annotations(
    annotations: &mut std::collections::BTreeMap<String, String>,
    metrics: &MetricsSpec,
) {
    annotations.insert("prometheus.io/scrape".to_string(), "true".to_string());
    annotations.insert("prometheus.io/path".to_string(), metrics.path.clone());
    annotations.insert("prometheus.io/port".to_string(), metrics.port.clone());
}
