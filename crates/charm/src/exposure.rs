use serde::Serialize;
use thiserror::Error;

/// One service port to open to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub target_port: u16,
}

impl ServicePort {
    /// Port exposed under the same external and container port number.
    pub fn symmetric(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            target_port: port,
        }
    }
}

/// Errors reported by the network-exposure subsystem.
#[derive(Debug, Error)]
pub enum ExposureError {
    #[error("failed to patch the Kubernetes service with {count} ports")]
    PatchFailed { count: usize },
}

/// Declares which service ports are open to the cluster.
///
/// Implemented out of tree by a Kubernetes service patcher; the charm only
/// hands it the ordered port set derived from configuration.
pub trait ServiceExposure {
    fn apply(&self, ports: &[ServicePort]) -> Result<(), ExposureError>;
}
