use std::fmt;

/// Externally visible unit status, read by the orchestration runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// The charm is actively working on the unit.
    Maintenance(String),
    /// The workload is configured and running.
    Active,
    /// The charm is waiting on an external precondition.
    Waiting(String),
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Maintenance(msg) => write!(f, "maintenance: {msg}"),
            UnitStatus::Active => write!(f, "active"),
            UnitStatus::Waiting(msg) => write!(f, "waiting: {msg}"),
        }
    }
}

/// Sink the charm reports unit status through.
pub trait StatusSink {
    fn set_status(&self, status: UnitStatus);
}
