//! Spec validation errors raised by the resource compiler.

use thiserror::Error;

/// A cross-field inconsistency in an [`AppSpec`](super::AppSpec).
///
/// Terminal for the deploy attempt that carried the spec: the compiler
/// produces no partial resource set and the deployer never contacts the
/// cluster. A corrected spec must arrive through a new trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecValidationError {
    #[error("{app}: ingress rules declared but the application has no ports")]
    IngressWithoutPorts { app: String },

    #[error("{app}: {check} check needs a network port but the application has no ports")]
    NetworkCheckWithoutPorts { app: String, check: &'static str },

    #[error("{app}: ingress path {path} targets port {port}, which is not an http port")]
    IngressPortNotHttp { app: String, path: String, port: u16 },

    #[error("{app}: duplicate port name {name}")]
    DuplicatePortName { app: String, name: String },

    #[error("{app}: {field} of the {check} check must be positive")]
    NonPositiveTiming {
        app: String,
        check: &'static str,
        field: &'static str,
    },
}
