//! Canonical spec fixtures.
//!
//! Single source of truth for the app specs used across tests. Derived
//! variants come from the base fixture via the spec model's `with_*`
//! overrides, so tests focus on assertions rather than construction.

use crate::domain::{
    AppSpec, AutoscalerSpec, CheckSpec, DeploymentId, HealthCheckSpec, IngressItemSpec,
    IngressPathMappingSpec, MetricsSpec, OverlaySpec, PortProtocol, PortSpec, ProbeMode,
    ResourcesSpec,
};

/// Baseline http application: one `http` port 80 -> 8080, tcp liveness,
/// http readiness on `/`, one ingress path mapping.
pub fn app_spec() -> AppSpec {
    AppSpec {
        name: "testapp".into(),
        namespace: "default".into(),
        image: "registry.example.com/testapp:1.2.3".into(),
        replicas: 3,
        autoscaler: AutoscalerSpec::default(),
        resources: ResourcesSpec::default(),
        admin_access: false,
        secrets_in_environment: false,
        metrics: MetricsSpec::default(),
        sidecar_enabled: false,
        ports: vec![PortSpec {
            protocol: PortProtocol::Http,
            name: "http".into(),
            port: 80,
            target_port: 8080,
        }],
        health_checks: HealthCheckSpec {
            liveness: CheckSpec::with_defaults(ProbeMode::Tcp { port: 8080 }),
            readiness: CheckSpec::with_defaults(ProbeMode::Http {
                path: "/".into(),
                port: 8080,
                headers: Default::default(),
            }),
        },
        teams: vec!["foo".into()],
        tags: vec!["bar".into()],
        deployment_id: DeploymentId::new("test-app-deployment-id"),
        labels: OverlaySpec::default(),
        annotations: OverlaySpec::default(),
        ingresses: vec![IngressItemSpec {
            host: None,
            path_mappings: vec![IngressPathMappingSpec {
                path: "/".into(),
                port: 80,
            }],
        }],
    }
}

/// Tcp-only variant: one `thrift` port, tcp checks, no ingress.
pub fn app_spec_thrift() -> AppSpec {
    app_spec()
        .with_ports(vec![PortSpec {
            protocol: PortProtocol::Tcp,
            name: "thrift".into(),
            port: 7999,
            target_port: 7999,
        }])
        .with_health_checks(HealthCheckSpec {
            liveness: CheckSpec::with_defaults(ProbeMode::Tcp { port: 7999 }),
            readiness: CheckSpec::with_defaults(ProbeMode::Tcp { port: 7999 }),
        })
        .with_ingresses(vec![])
}

/// Two tcp-class ports, no http-class port.
pub fn app_spec_multiple_thrift_ports() -> AppSpec {
    app_spec_thrift().with_ports(vec![
        PortSpec {
            protocol: PortProtocol::Tcp,
            name: "thrift1".into(),
            port: 7999,
            target_port: 7999,
        },
        PortSpec {
            protocol: PortProtocol::Tcp,
            name: "thrift2".into(),
            port: 8000,
            target_port: 8000,
        },
    ])
}

/// Mixed http and tcp ports.
pub fn app_spec_thrift_and_http() -> AppSpec {
    app_spec()
        .with_ports(vec![
            PortSpec {
                protocol: PortProtocol::Http,
                name: "http".into(),
                port: 80,
                target_port: 8080,
            },
            PortSpec {
                protocol: PortProtocol::Tcp,
                name: "thrift".into(),
                port: 7999,
                target_port: 7999,
            },
        ])
        .with_health_checks(HealthCheckSpec {
            liveness: CheckSpec::with_defaults(ProbeMode::Tcp { port: 7999 }),
            readiness: CheckSpec::with_defaults(ProbeMode::Http {
                path: "/".into(),
                port: 8080,
                headers: Default::default(),
            }),
        })
}

/// Portless variant: exec checks only, no ingress.
pub fn app_spec_no_ports() -> AppSpec {
    let exec_check = CheckSpec::with_defaults(ProbeMode::Exec {
        command: "/app/check.sh".into(),
    });
    app_spec()
        .with_ports(vec![])
        .with_health_checks(HealthCheckSpec {
            liveness: exec_check.clone(),
            readiness: exec_check,
        })
        .with_ingresses(vec![])
}
