//! Domain types: the immutable application spec model and the typed
//! cluster resources compiled from it.

pub mod error;
pub mod id;
pub mod request;
pub mod resource;
pub mod spec;

pub use error::SpecValidationError;
pub use id::{AppId, DeploymentId};
pub use request::{DeployRequest, TriggerReason};
pub use resource::{
    ContainerSpec, EnvVar, IngressPath, IngressRule, ObjectMeta, Probe, Resource, ResourceKind,
    ResourcePayload, ResourceSet, ServicePort, Transport,
};
pub use spec::{
    AppSpec, AutoscalerSpec, CheckSpec, HealthCheckSpec, IngressItemSpec, IngressPathMappingSpec,
    MetricsSpec, OverlaySpec, PortProtocol, PortSpec, ProbeMode, ResourceRequirementSpec,
    ResourcesSpec,
};
