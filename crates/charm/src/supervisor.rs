use thiserror::Error;

use crate::layer::Layer;

/// Errors reported by the container supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("service not found: {name}")]
    ServiceNotFound { name: String },
    #[error("failed to read the current plan")]
    PlanUnavailable,
    #[error("failed to apply layer {label}")]
    ApplyFailed { label: String },
    #[error("failed to restart service {name}")]
    RestartFailed { name: String },
}

/// Runtime state of a supervised service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub running: bool,
}

/// The workload container's process supervisor (Pebble-shaped).
///
/// The supervisor owns the observed launch specification; the charm reads it
/// for comparison and mutates it only through [`add_layer`].
///
/// [`add_layer`]: ContainerSupervisor::add_layer
pub trait ContainerSupervisor {
    /// Whether the supervisor's API is reachable yet.
    fn can_connect(&self) -> bool;

    /// Snapshot of the currently active launch specification.
    fn get_plan(&self) -> Result<Layer, SupervisorError>;

    /// Apply a layer under `label`. With `combine` the layer is merged on
    /// top of the existing one of the same label, leaving fields absent from
    /// `layer` untouched; otherwise it replaces it.
    fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<(), SupervisorError>;

    /// Restart the named service.
    fn restart(&self, name: &str) -> Result<(), SupervisorError>;

    /// Look up runtime information for the named service.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::ServiceNotFound`] if the service has never been
    ///   started; callers treat this as "not running", not as a failure
    fn get_service(&self, name: &str) -> Result<ServiceInfo, SupervisorError>;
}
