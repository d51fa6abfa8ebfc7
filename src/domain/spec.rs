//! The immutable application spec model.
//!
//! An [`AppSpec`] is the declarative description of one application's desired
//! deployment. It is pure data: construction and accessors carry no business
//! rules beyond field shape. Cross-field consistency is the compiler's job.
//!
//! Specs are never mutated in place. Derived variants are produced by the
//! consuming `with_*` methods, which replace whole fields and leave everything
//! else untouched - used by tests and by adapters for legacy spec formats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{AppId, DeploymentId};

/// Protocol class of an application port.
///
/// The class decides which probe type a health check translates to and
/// whether the port is eligible as an ingress target. It is not the wire
/// transport: both classes ride TCP on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    Http,
    Tcp,
}

/// One named port of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub protocol: PortProtocol,
    /// Unique within one spec.
    pub name: String,
    /// Port exposed by the service.
    pub port: u16,
    /// Port the container listens on.
    pub target_port: u16,
}

/// How a health check probes the application.
///
/// Exactly one mode per check; the compiler translates it 1:1 into the
/// orchestrator-native probe type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    Http {
        path: String,
        port: u16,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    Tcp {
        port: u16,
    },
    Exec {
        command: String,
    },
}

/// One health check: a probe mode plus timing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub probe: ProbeMode,
    pub initial_delay_seconds: u32,
    pub period_seconds: u32,
    pub success_threshold: u32,
    pub timeout_seconds: u32,
}

impl CheckSpec {
    /// A check with the given probe and default timing.
    pub fn with_defaults(probe: ProbeMode) -> Self {
        Self {
            probe,
            initial_delay_seconds: 10,
            period_seconds: 10,
            success_threshold: 1,
            timeout_seconds: 1,
        }
    }

    /// True when the probe needs a network port on the application.
    #[must_use]
    pub fn is_network_probe(&self) -> bool {
        matches!(self.probe, ProbeMode::Http { .. } | ProbeMode::Tcp { .. })
    }
}

/// Liveness and readiness checks for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckSpec {
    pub liveness: CheckSpec,
    pub readiness: CheckSpec,
}

/// Autoscaling policy.
///
/// When enabled, the compiled autoscaler resource owns the replica count and
/// the spec's static `replicas` is advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalerSpec {
    pub enabled: bool,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_threshold_percent: u32,
}

impl Default for AutoscalerSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            min_replicas: 2,
            max_replicas: 5,
            cpu_threshold_percent: 50,
        }
    }
}

/// One side of a resource requirement (requests or limits).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirementSpec {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// Compute resources requested for and limiting the main container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesSpec {
    pub requests: ResourceRequirementSpec,
    pub limits: ResourceRequirementSpec,
}

/// Metrics scrape integration.
///
/// `port` names an application port; `path` is the scrape endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSpec {
    pub enabled: bool,
    pub port: String,
    pub path: String,
}

impl Default for MetricsSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            port: "http".into(),
            path: "/metrics".into(),
        }
    }
}

/// Label or annotation overlay, one map per produced resource kind.
///
/// Applied to the matching compiled resource and merged with the daemon's
/// bookkeeping keys, which win on collision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySpec {
    #[serde(default)]
    pub workload: BTreeMap<String, String>,
    #[serde(default)]
    pub service: BTreeMap<String, String>,
    #[serde(default)]
    pub ingress: BTreeMap<String, String>,
    #[serde(default)]
    pub autoscaler: BTreeMap<String, String>,
    #[serde(default)]
    pub pod: BTreeMap<String, String>,
}

/// One (host, path, port) ingress mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressPathMappingSpec {
    pub path: String,
    /// Service port the path routes to. Must name an http-class port.
    pub port: u16,
}

/// One ingress rule: an optional host and its path mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressItemSpec {
    pub host: Option<String>,
    #[serde(default)]
    pub path_mappings: Vec<IngressPathMappingSpec>,
}

/// Immutable declarative description of one application's desired deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    pub name: String,
    pub namespace: String,
    /// Container image reference, e.g. `registry/app:1.2.3`.
    pub image: String,
    pub replicas: u32,
    #[serde(default)]
    pub autoscaler: AutoscalerSpec,
    #[serde(default)]
    pub resources: ResourcesSpec,
    #[serde(default)]
    pub admin_access: bool,
    #[serde(default)]
    pub secrets_in_environment: bool,
    #[serde(default)]
    pub metrics: MetricsSpec,
    #[serde(default)]
    pub sidecar_enabled: bool,
    /// Ordered; empty means the application is not network-addressable.
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    pub health_checks: HealthCheckSpec,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Generated when the publishing side supplies none (manual triggers).
    #[serde(default = "DeploymentId::generate")]
    pub deployment_id: DeploymentId,
    #[serde(default)]
    pub labels: OverlaySpec,
    #[serde(default)]
    pub annotations: OverlaySpec,
    #[serde(default)]
    pub ingresses: Vec<IngressItemSpec>,
}

impl AppSpec {
    /// The identity the deploy queue coalesces on.
    #[must_use]
    pub fn app_id(&self) -> AppId {
        AppId::new(self.namespace.clone(), self.name.clone())
    }

    /// The image tag, or `latest` when the reference carries none.
    #[must_use]
    pub fn version(&self) -> &str {
        match self.image.rsplit_once(':') {
            Some((_, tag)) if !tag.contains('/') => tag,
            _ => "latest",
        }
    }

    /// The http-class ports, in declaration order.
    pub fn http_ports(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.protocol == PortProtocol::Http)
    }

    /// Derive a variant with a different replica count.
    #[must_use]
    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    /// Derive a variant with different ports.
    #[must_use]
    pub fn with_ports(mut self, ports: Vec<PortSpec>) -> Self {
        self.ports = ports;
        self
    }

    /// Derive a variant with different health checks.
    #[must_use]
    pub fn with_health_checks(mut self, health_checks: HealthCheckSpec) -> Self {
        self.health_checks = health_checks;
        self
    }

    /// Derive a variant with different ingress rules.
    #[must_use]
    pub fn with_ingresses(mut self, ingresses: Vec<IngressItemSpec>) -> Self {
        self.ingresses = ingresses;
        self
    }

    /// Derive a variant with a different autoscaling policy.
    #[must_use]
    pub fn with_autoscaler(mut self, autoscaler: AutoscalerSpec) -> Self {
        self.autoscaler = autoscaler;
        self
    }

    /// Derive a variant carrying a new deployment id.
    #[must_use]
    pub fn with_deployment_id(mut self, deployment_id: DeploymentId) -> Self {
        self.deployment_id = deployment_id;
        self
    }
}
