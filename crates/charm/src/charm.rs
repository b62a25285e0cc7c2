use std::collections::BTreeMap;

use error_stack::{Report, ResultExt};
use tracing::{debug, info};

use crate::config::charm::ConfigSource;
use crate::event::{CharmEvent, Outcome};
use crate::exposure::ServiceExposure;
use crate::layer::{desired_layer, service_ports, SERVICE_NAME};
use crate::relation::{scrape_jobs, RelationDataBus, RelationEvent, ACTIVE_KEY, SCRAPE_JOBS_KEY};
use crate::status::{StatusSink, UnitStatus};
use crate::supervisor::{ContainerSupervisor, SupervisorError};

/// Top-level failures surfaced to the orchestration runtime.
///
/// Anything below this level that is recoverable (supervisor not reachable,
/// service not yet running) is handled by deferring, not by erroring.
#[derive(Debug, thiserror::Error)]
pub enum CharmError {
    #[error("failed to configure the workload container")]
    ConfigureFailed,
    #[error("failed to publish relation data")]
    RelationWriteFailed,
}

/// The reconciler for the prometheus-edge-hub workload.
///
/// Holds no state of its own: configuration and the observed plan are read
/// fresh from the injected collaborators on every event.
pub struct EdgeHubCharm<'a> {
    app_name: String,
    config: &'a dyn ConfigSource,
    supervisor: &'a dyn ContainerSupervisor,
    exposure: &'a dyn ServiceExposure,
    status: &'a dyn StatusSink,
    relations: &'a dyn RelationDataBus,
}

impl<'a> EdgeHubCharm<'a> {
    pub fn new(
        app_name: impl Into<String>,
        config: &'a dyn ConfigSource,
        supervisor: &'a dyn ContainerSupervisor,
        exposure: &'a dyn ServiceExposure,
        status: &'a dyn StatusSink,
        relations: &'a dyn RelationDataBus,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            config,
            supervisor,
            exposure,
            status,
            relations,
        }
    }

    /// Register this charm's handlers in the runtime's dispatch table.
    pub fn register(&'a self, dispatcher: &mut crate::runtime::Dispatcher<'a>) {
        use crate::event::EventKind;
        for kind in [
            EventKind::PebbleReady,
            EventKind::ConfigChanged,
            EventKind::RelationJoined,
            EventKind::RelationDeparted,
        ] {
            dispatcher.observe(kind, move |event| self.dispatch(event));
        }
    }

    /// Route one lifecycle event to its handler.
    pub fn dispatch(&self, event: &CharmEvent) -> Result<Outcome, Report<CharmError>> {
        match event {
            CharmEvent::PebbleReady | CharmEvent::ConfigChanged => self.configure(),
            CharmEvent::RelationJoined(relation) => self.on_relation_joined(relation),
            CharmEvent::RelationDeparted(relation) => self.on_relation_departed(relation),
        }
    }

    /// Reconcile the workload container against the current configuration.
    ///
    /// Applies the exposed port set, writes the launch layer, and restarts
    /// the service only when the desired service map differs from the
    /// observed one, so repeated calls with unchanged configuration are
    /// side-effect free.
    pub fn configure(&self) -> Result<Outcome, Report<CharmError>> {
        if !self.supervisor.can_connect() {
            self.status.set_status(UnitStatus::Waiting(
                "Waiting for container to be ready...".to_string(),
            ));
            return Ok(Outcome::Deferred("container not ready".to_string()));
        }

        self.status
            .set_status(UnitStatus::Maintenance("Configuring pod".to_string()));

        let config = self
            .config
            .current()
            .change_context(CharmError::ConfigureFailed)?;
        let plan = self
            .supervisor
            .get_plan()
            .change_context(CharmError::ConfigureFailed)?;
        let desired = desired_layer(&config);

        if plan.services != desired.services {
            self.exposure
                .apply(&service_ports(&config))
                .change_context(CharmError::ConfigureFailed)?;
            self.supervisor
                .add_layer(SERVICE_NAME, &desired, true)
                .change_context(CharmError::ConfigureFailed)?;
            self.supervisor
                .restart(SERVICE_NAME)
                .change_context(CharmError::ConfigureFailed)?;
            info!("restarted container {SERVICE_NAME}");
        } else {
            debug!("plan already matches the desired layer, nothing to do");
        }

        self.status.set_status(UnitStatus::Active);
        Ok(Outcome::Handled)
    }

    /// Announce the scrape endpoint and the readiness flag to a collector.
    ///
    /// Leader-only; the flag is retried via deferral until the workload is
    /// actually running so the collector never sees a stale `"True"`.
    pub fn on_relation_joined(
        &self,
        event: &RelationEvent,
    ) -> Result<Outcome, Report<CharmError>> {
        if !self.relations.is_leader() {
            debug!("not the leader, skipping relation data for {}", event.relation);
            return Ok(Outcome::Handled);
        }

        let running = self.workload_running()?;
        let config = self
            .config
            .current()
            .change_context(CharmError::RelationWriteFailed)?;
        let jobs = serde_json::to_string(&scrape_jobs(&self.app_name, config.port))
            .change_context(CharmError::RelationWriteFailed)?;

        let mut data = BTreeMap::new();
        data.insert(ACTIVE_KEY.to_string(), bool_flag(running));
        data.insert(SCRAPE_JOBS_KEY.to_string(), jobs);
        self.relations
            .write(event.relation_id, &data)
            .change_context(CharmError::RelationWriteFailed)?;

        if running {
            Ok(Outcome::Handled)
        } else {
            Ok(Outcome::Deferred("workload not running yet".to_string()))
        }
    }

    /// Withdraw the readiness flag when a collector departs.
    pub fn on_relation_departed(
        &self,
        event: &RelationEvent,
    ) -> Result<Outcome, Report<CharmError>> {
        if !self.relations.is_leader() {
            return Ok(Outcome::Handled);
        }
        let mut data = BTreeMap::new();
        data.insert(ACTIVE_KEY.to_string(), bool_flag(false));
        self.relations
            .write(event.relation_id, &data)
            .change_context(CharmError::RelationWriteFailed)?;
        Ok(Outcome::Handled)
    }

    /// Whether the supervisor reports the workload service as running.
    ///
    /// A service the supervisor has no record of is simply not running.
    fn workload_running(&self) -> Result<bool, Report<CharmError>> {
        match self.supervisor.get_service(SERVICE_NAME) {
            Ok(info) => Ok(info.running),
            Err(SupervisorError::ServiceNotFound { .. }) => Ok(false),
            Err(err) => Err(Report::new(err).change_context(CharmError::RelationWriteFailed)),
        }
    }
}

fn bool_flag(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}
