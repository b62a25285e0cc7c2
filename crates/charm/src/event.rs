use crate::relation::RelationEvent;

/// Lifecycle triggers delivered by the orchestration runtime.
#[derive(Debug, Clone)]
pub enum CharmEvent {
    /// The workload container reported that its supervisor is up.
    PebbleReady,
    /// The charm configuration changed.
    ConfigChanged,
    /// A remote unit joined a relation.
    RelationJoined(RelationEvent),
    /// A remote unit departed a relation.
    RelationDeparted(RelationEvent),
}

impl CharmEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CharmEvent::PebbleReady => EventKind::PebbleReady,
            CharmEvent::ConfigChanged => EventKind::ConfigChanged,
            CharmEvent::RelationJoined(_) => EventKind::RelationJoined,
            CharmEvent::RelationDeparted(_) => EventKind::RelationDeparted,
        }
    }
}

/// Discriminant used as the key of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PebbleReady,
    ConfigChanged,
    RelationJoined,
    RelationDeparted,
}

/// Result of handling one lifecycle event.
///
/// `Deferred` asks the runtime to redeliver the same event later; it is the
/// explicit-return rendering of the runtime's `defer()` primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Deferred(String),
}
