//! Operator ("charm") for the prometheus-edge-hub metrics aggregation
//! sidecar.
//!
//! The charm reacts to lifecycle events from the orchestration runtime,
//! derives the desired launch specification from configuration, and
//! reconciles the workload container only when the desired and observed
//! specifications differ. Collaborators (container supervisor, service
//! exposure, status sink, relation data bus) are injected as trait objects;
//! [`harness::Harness`] provides in-memory implementations for offline
//! replays and tests.

pub mod charm;
pub mod config;
pub mod event;
pub mod exposure;
pub mod harness;
pub mod layer;
pub mod logging;
pub mod relation;
pub mod runtime;
pub mod status;
pub mod supervisor;

pub use charm::{CharmError, EdgeHubCharm};
pub use event::{CharmEvent, EventKind, Outcome};
pub use layer::{Layer, ServiceSpec};
