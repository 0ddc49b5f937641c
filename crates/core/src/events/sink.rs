//! Where committed ledger operations announce themselves.

use std::sync::{Arc, Mutex, MutexGuard};

use super::DomainEvent;

/// Receiver of events for operations that have already committed.
///
/// `emit` runs on the caller's task right after the commit, so it must not
/// block or fail the operation. Adapters buffer and fan out on their own.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);

    /// Emits in order. Multi-step operations use this so listeners see one
    /// commit's events together.
    fn emit_batch(&self, events: Vec<DomainEvent>) {
        events.into_iter().for_each(|event| self.emit(event));
    }
}

/// Discards everything.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Records events in memory so tests can assert on what was announced.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking test thread must not hide the events from the others.
    fn recorded(&self) -> MutexGuard<'_, Vec<DomainEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.recorded().clone()
    }

    /// Events concerning `trip_id`, in emission order.
    pub fn for_trip(&self, trip_id: &str) -> Vec<DomainEvent> {
        self.recorded()
            .iter()
            .filter(|e| e.trip_id() == trip_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.recorded().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.recorded().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled(trip_id: &str) -> DomainEvent {
        DomainEvent::trip_cancelled(trip_id.to_string(), vec![])
    }

    #[test]
    fn noop_sink_swallows_events() {
        let sink = NoOpDomainEventSink;
        sink.emit(cancelled("trip-1"));
        sink.emit_batch(vec![cancelled("trip-2"), cancelled("trip-3")]);
    }

    #[test]
    fn mock_sink_keeps_emission_order() {
        let sink = MockDomainEventSink::new();
        assert!(sink.is_empty());

        sink.emit(cancelled("trip-1"));
        sink.emit_batch(vec![cancelled("trip-2"), cancelled("trip-1")]);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.events()[1], cancelled("trip-2"));
        assert_eq!(sink.for_trip("trip-1").len(), 2);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn clones_share_the_same_log() {
        let sink = MockDomainEventSink::new();
        let handle = sink.clone();
        handle.emit(cancelled("trip-9"));
        assert_eq!(sink.for_trip("trip-9"), vec![cancelled("trip-9")]);
    }
}
