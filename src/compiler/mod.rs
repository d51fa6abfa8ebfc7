//! The resource compiler: pure translation of an [`AppSpec`] into the
//! [`ResourceSet`] the deployer applies.
//!
//! No I/O, fully deterministic: compiling the same spec twice yields
//! identical output. Cross-field consistency rules live here, not in the
//! spec model - a malformed combination fails fast with
//! [`SpecValidationError`] and produces no partial set.

mod autoscaler;
mod ingress;
pub mod metadata;
mod service;
mod workload;

use std::collections::BTreeSet;

use crate::domain::resource::{Resource, ResourcePayload, ResourceSet};
use crate::domain::{AppSpec, ResourceKind, SpecValidationError};

/// Compile one spec into the ordered set of resources describing it.
///
/// Production order is fixed: workload, service, ingress, autoscaler,
/// supporting config. Service and later kinds are conditional on the spec.
pub fn compile(spec: &AppSpec) -> Result<ResourceSet, SpecValidationError> {
    validate(spec)?;

    let mut set = ResourceSet::new();
    set.push(workload::compile(spec));
    if !spec.ports.is_empty() {
        set.push(service::compile(spec));
    }
    if let Some(resource) = ingress::compile(spec) {
        set.push(resource);
    }
    if spec.autoscaler.enabled {
        set.push(autoscaler::compile(spec));
    }
    if spec.metrics.enabled {
        set.push(metrics_config(spec));
    }
    Ok(set)
}

/// Cross-field validation, applied before any resource is produced.
fn validate(spec: &AppSpec) -> Result<(), SpecValidationError> {
    let app = spec.app_id().to_string();

    let mut names = BTreeSet::new();
    for port in &spec.ports {
        if !names.insert(port.name.as_str()) {
            return Err(SpecValidationError::DuplicatePortName {
                app: app.clone(),
                name: port.name.clone(),
            });
        }
    }

    for (label, check) in [
        ("liveness", &spec.health_checks.liveness),
        ("readiness", &spec.health_checks.readiness),
    ] {
        for (field, value) in [
            ("initial_delay_seconds", check.initial_delay_seconds),
            ("period_seconds", check.period_seconds),
            ("success_threshold", check.success_threshold),
            ("timeout_seconds", check.timeout_seconds),
        ] {
            if value == 0 {
                return Err(SpecValidationError::NonPositiveTiming {
                    app: app.clone(),
                    check: label,
                    field,
                });
            }
        }
        if spec.ports.is_empty() && check.is_network_probe() {
            return Err(SpecValidationError::NetworkCheckWithoutPorts {
                app: app.clone(),
                check: label,
            });
        }
    }

    let declares_ingress = spec
        .ingresses
        .iter()
        .any(|item| !item.path_mappings.is_empty());
    if spec.ports.is_empty() {
        if declares_ingress {
            return Err(SpecValidationError::IngressWithoutPorts { app });
        }
        return Ok(());
    }

    let http_ports: BTreeSet<u16> = spec.http_ports().map(|p| p.port).collect();
    for item in &spec.ingresses {
        for mapping in &item.path_mappings {
            if !http_ports.contains(&mapping.port) {
                return Err(SpecValidationError::IngressPortNotHttp {
                    app: app.clone(),
                    path: mapping.path.clone(),
                    port: mapping.port,
                });
            }
        }
    }
    Ok(())
}

/// Supporting config object carrying the metrics scrape settings.
fn metrics_config(spec: &AppSpec) -> Resource {
    let mut data = std::collections::BTreeMap::new();
    data.insert("scrape_path".to_string(), spec.metrics.path.clone());
    data.insert("scrape_port".to_string(), spec.metrics.port.clone());

    Resource {
        kind: ResourceKind::ConfigMap,
        metadata: metadata::object_meta(
            spec,
            ResourceKind::ConfigMap,
            format!("{}-metrics", spec.name),
        ),
        payload: ResourcePayload::ConfigMap(data),
    }
}
