//! Typed orchestrator resource definitions.
//!
//! A [`ResourceSet`] is the desired cluster state for one application for one
//! reconciliation pass. It is transient: recomputed from the spec every time,
//! never diffed against a cached prior set. The live cluster is the only
//! source of truth for current state.
//!
//! All maps are `BTreeMap` so compiling the same spec twice yields
//! byte-identical output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource kinds this daemon manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Workload,
    Service,
    Ingress,
    Autoscaler,
    ConfigMap,
}

impl ResourceKind {
    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Workload => "workload",
            ResourceKind::Service => "service",
            ResourceKind::Ingress => "ingress",
            ResourceKind::Autoscaler => "autoscaler",
            ResourceKind::ConfigMap => "configmap",
        }
    }

    /// Collection segment of the cluster API path.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Workload => "workloads",
            ResourceKind::Service => "services",
            ResourceKind::Ingress => "ingresses",
            ResourceKind::Autoscaler => "autoscalers",
            ResourceKind::ConfigMap => "configmaps",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifying metadata shared by every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Environment variable injected into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Probe translated 1:1 from a spec health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeAction {
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

/// A liveness or readiness probe on a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub action: ProbeAction,
    pub initial_delay_seconds: u32,
    pub period_seconds: u32,
    pub success_threshold: u32,
    pub timeout_seconds: u32,
}

/// Named container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub name: String,
    pub port: u16,
}

/// One container in the workload's pod template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    /// Secret whose entries are injected as environment variables.
    #[serde(default)]
    pub env_from_secret: Option<String>,
    #[serde(default)]
    pub resources: crate::domain::spec::ResourcesSpec,
    #[serde(default)]
    pub liveness: Option<Probe>,
    #[serde(default)]
    pub readiness: Option<Probe>,
}

/// Desired state of the application workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Advisory when an autoscaler resource is produced for the app.
    pub replicas: u32,
    pub selector: BTreeMap<String, String>,
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub pod_annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub service_account: Option<String>,
}

/// Wire transport of a service port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    Tcp,
    Udp,
}

/// One exposed service port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub target_port: u16,
    pub protocol: Transport,
}

/// Desired state of the application's service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub selector: BTreeMap<String, String>,
    pub ports: Vec<ServicePort>,
}

/// One (path, service port) routing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressPath {
    pub path: String,
    pub service_port: u16,
}

/// Routing rules for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub host: Option<String>,
    pub paths: Vec<IngressPath>,
}

/// Desired state of the application's ingress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    pub rules: Vec<IngressRule>,
}

/// Desired state of the application's autoscaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalerResourceSpec {
    /// Name of the workload being scaled.
    pub target: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_target_percent: u32,
}

/// Kind-specific payload of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePayload {
    Workload(WorkloadSpec),
    Service(ServiceSpec),
    Ingress(IngressSpec),
    Autoscaler(AutoscalerResourceSpec),
    ConfigMap(BTreeMap<String, String>),
}

/// One orchestrator object owned by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub metadata: ObjectMeta,
    pub payload: ResourcePayload,
}

impl Resource {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// Ordered collection of resources compiled from one spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The resource of the given kind, if the compiler produced one.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&Resource> {
        self.resources.iter().find(|r| r.kind == kind)
    }

    /// Kinds present in the set, in production order.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.resources.iter().map(|r| r.kind)
    }
}

impl IntoIterator for ResourceSet {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}
