use std::collections::VecDeque;

use error_stack::Report;
use tracing::{debug, info, warn};

use crate::charm::CharmError;
use crate::event::{CharmEvent, EventKind, Outcome};

type Handler<'a> = Box<dyn Fn(&CharmEvent) -> Result<Outcome, Report<CharmError>> + 'a>;

/// Explicit observer table mapping event kinds to handlers.
///
/// Built once at startup; the runtime never mutates it afterwards.
pub struct Dispatcher<'a> {
    handlers: Vec<(EventKind, Handler<'a>)>,
}

impl<'a> Dispatcher<'a> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler for an event kind.
    pub fn observe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&CharmEvent) -> Result<Outcome, Report<CharmError>> + 'a,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Deliver one event to its handler; unobserved kinds are ignored.
    pub fn dispatch(&self, event: &CharmEvent) -> Result<Outcome, Report<CharmError>> {
        let kind = event.kind();
        match self.handlers.iter().find(|(k, _)| *k == kind) {
            Some((_, handler)) => handler(event),
            None => {
                debug!("no handler observes {kind:?}, ignoring");
                Ok(Outcome::Handled)
            }
        }
    }
}

impl Default for Dispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-threaded event loop with defer redelivery.
///
/// Events are delivered one at a time in arrival order. A deferred event is
/// re-queued at the back and redelivered until its budget is exhausted; the
/// budget exists only so an offline replay terminates when a precondition
/// never becomes true.
pub struct EventLoop<'a> {
    dispatcher: Dispatcher<'a>,
    queue: VecDeque<(CharmEvent, usize)>,
    redelivery_budget: usize,
}

impl<'a> EventLoop<'a> {
    pub fn new(dispatcher: Dispatcher<'a>, redelivery_budget: usize) -> Self {
        Self {
            dispatcher,
            queue: VecDeque::new(),
            redelivery_budget,
        }
    }

    /// Enqueue an event for delivery.
    pub fn push(&mut self, event: CharmEvent) {
        self.queue.push_back((event, 0));
    }

    /// Drain the queue, redelivering deferred events.
    ///
    /// # Errors
    ///
    /// Propagates the first handler failure; remaining events stay queued,
    /// mirroring the orchestration runtime's error-and-retry model.
    pub fn run(&mut self) -> Result<(), Report<CharmError>> {
        while let Some((event, deliveries)) = self.queue.pop_front() {
            match self.dispatcher.dispatch(&event)? {
                Outcome::Handled => {}
                Outcome::Deferred(reason) => {
                    let deliveries = deliveries + 1;
                    if deliveries > self.redelivery_budget {
                        warn!(
                            "dropping {:?} after {deliveries} deliveries: {reason}",
                            event.kind()
                        );
                    } else {
                        info!("deferring {:?}: {reason}", event.kind());
                        self.queue.push_back((event, deliveries));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn dispatch_routes_by_event_kind() {
        let seen = RefCell::new(Vec::new());
        let mut dispatcher = Dispatcher::new();
        dispatcher.observe(EventKind::PebbleReady, |_| {
            seen.borrow_mut().push("ready");
            Ok(Outcome::Handled)
        });
        dispatcher.observe(EventKind::ConfigChanged, |_| {
            seen.borrow_mut().push("config");
            Ok(Outcome::Handled)
        });

        dispatcher
            .dispatch(&CharmEvent::ConfigChanged)
            .expect("dispatch succeeds");
        assert_eq!(*seen.borrow(), vec!["config"]);
    }

    #[test]
    fn unobserved_kinds_are_ignored() {
        let dispatcher = Dispatcher::new();
        let outcome = dispatcher
            .dispatch(&CharmEvent::PebbleReady)
            .expect("dispatch succeeds");
        assert_eq!(outcome, Outcome::Handled);
    }

    #[test]
    fn deferred_events_are_redelivered_until_handled() {
        let calls = RefCell::new(0usize);
        let mut dispatcher = Dispatcher::new();
        dispatcher.observe(EventKind::PebbleReady, |_| {
            *calls.borrow_mut() += 1;
            if *calls.borrow() < 3 {
                Ok(Outcome::Deferred("not yet".to_string()))
            } else {
                Ok(Outcome::Handled)
            }
        });

        let mut event_loop = EventLoop::new(dispatcher, 5);
        event_loop.push(CharmEvent::PebbleReady);
        event_loop.run().expect("loop completes");
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn permanently_deferred_events_are_dropped_after_the_budget() {
        let calls = RefCell::new(0usize);
        let mut dispatcher = Dispatcher::new();
        dispatcher.observe(EventKind::ConfigChanged, |_| {
            *calls.borrow_mut() += 1;
            Ok(Outcome::Deferred("never ready".to_string()))
        });

        let mut event_loop = EventLoop::new(dispatcher, 2);
        event_loop.push(CharmEvent::ConfigChanged);
        event_loop.run().expect("loop completes");
        // first delivery plus two redeliveries
        assert_eq!(*calls.borrow(), 3);
    }
}
