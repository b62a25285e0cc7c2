//! In-memory collaborator implementations.
//!
//! [`Harness`] stands in for the orchestration runtime's config source, the
//! container supervisor, the network-exposure subsystem, the status sink, and
//! the relation data bus. It records every mutating call so replays and
//! tests can assert on exactly what the charm did.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::config::charm::{CharmConfig, ConfigError, ConfigSource};
use crate::exposure::{ExposureError, ServiceExposure, ServicePort};
use crate::layer::Layer;
use crate::relation::{RelationDataBus, RelationError};
use crate::status::{StatusSink, UnitStatus};
use crate::supervisor::{ContainerSupervisor, ServiceInfo, SupervisorError};

#[derive(Default)]
struct HarnessState {
    can_connect: bool,
    leader: bool,
    options: BTreeMap<String, String>,
    plan: Layer,
    /// `None` until the service is first started.
    service_running: Option<bool>,
    restarts: Vec<String>,
    applied_port_sets: Vec<Vec<ServicePort>>,
    statuses: Vec<UnitStatus>,
    relation_data: BTreeMap<u32, BTreeMap<String, String>>,
}

/// In-memory stand-in for all of the charm's collaborators.
pub struct Harness {
    state: RefCell<HarnessState>,
}

impl Harness {
    /// A harness with an unreachable container and no configuration set.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(HarnessState {
                leader: true,
                ..HarnessState::default()
            }),
        }
    }

    pub fn set_can_connect(&self, can_connect: bool) {
        self.state.borrow_mut().can_connect = can_connect;
    }

    pub fn set_leader(&self, leader: bool) {
        self.state.borrow_mut().leader = leader;
    }

    /// Replace the option bag, as a config-changed delivery would.
    pub fn set_options(&self, options: BTreeMap<String, String>) {
        self.state.borrow_mut().options = options;
    }

    pub fn set_option(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .options
            .insert(key.to_string(), value.to_string());
    }

    /// Force the workload's running state without going through a restart.
    pub fn set_service_running(&self, running: bool) {
        self.state.borrow_mut().service_running = Some(running);
    }

    pub fn plan(&self) -> Layer {
        self.state.borrow().plan.clone()
    }

    pub fn restart_count(&self) -> usize {
        self.state.borrow().restarts.len()
    }

    pub fn applied_port_sets(&self) -> Vec<Vec<ServicePort>> {
        self.state.borrow().applied_port_sets.clone()
    }

    pub fn statuses(&self) -> Vec<UnitStatus> {
        self.state.borrow().statuses.clone()
    }

    pub fn last_status(&self) -> Option<UnitStatus> {
        self.state.borrow().statuses.last().cloned()
    }

    pub fn relation_data(&self, relation_id: u32) -> Option<BTreeMap<String, String>> {
        self.state.borrow().relation_data.get(&relation_id).cloned()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for Harness {
    fn current(&self) -> Result<CharmConfig, ConfigError> {
        CharmConfig::from_options(&self.state.borrow().options)
    }
}

impl ContainerSupervisor for Harness {
    fn can_connect(&self) -> bool {
        self.state.borrow().can_connect
    }

    fn get_plan(&self) -> Result<Layer, SupervisorError> {
        Ok(self.state.borrow().plan.clone())
    }

    fn add_layer(&self, _label: &str, layer: &Layer, combine: bool) -> Result<(), SupervisorError> {
        let mut state = self.state.borrow_mut();
        if combine {
            // Combine merge: services named in the new layer replace their
            // previous definition, everything else survives.
            for (name, spec) in &layer.services {
                state.plan.services.insert(name.clone(), spec.clone());
            }
            if !layer.summary.is_empty() {
                state.plan.summary = layer.summary.clone();
            }
        } else {
            state.plan = layer.clone();
        }
        Ok(())
    }

    fn restart(&self, name: &str) -> Result<(), SupervisorError> {
        let mut state = self.state.borrow_mut();
        state.restarts.push(name.to_string());
        state.service_running = Some(true);
        Ok(())
    }

    fn get_service(&self, name: &str) -> Result<ServiceInfo, SupervisorError> {
        match self.state.borrow().service_running {
            Some(running) => Ok(ServiceInfo {
                name: name.to_string(),
                running,
            }),
            None => Err(SupervisorError::ServiceNotFound {
                name: name.to_string(),
            }),
        }
    }
}

impl ServiceExposure for Harness {
    fn apply(&self, ports: &[ServicePort]) -> Result<(), ExposureError> {
        self.state
            .borrow_mut()
            .applied_port_sets
            .push(ports.to_vec());
        Ok(())
    }
}

impl StatusSink for Harness {
    fn set_status(&self, status: UnitStatus) {
        self.state.borrow_mut().statuses.push(status);
    }
}

impl RelationDataBus for Harness {
    fn is_leader(&self) -> bool {
        self.state.borrow().leader
    }

    fn write(
        &self,
        relation_id: u32,
        data: &BTreeMap<String, String>,
    ) -> Result<(), RelationError> {
        let mut state = self.state.borrow_mut();
        let bag = state.relation_data.entry(relation_id).or_default();
        for (key, value) in data {
            bag.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
