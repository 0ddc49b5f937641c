//! Web domain event sink implementation.
//!
//! Receives domain events and sends them to a background worker.

use std::sync::Mutex;

use freightfin_core::events::{DomainEvent, DomainEventSink};
use tokio::sync::mpsc;

/// Domain event sink for the web server runtime.
///
/// The sink is usable as soon as it is created; events are buffered until
/// `start_worker()` spawns the consumer.
pub struct WebDomainEventSink {
    tx: mpsc::UnboundedSender<DomainEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<DomainEvent>>>,
}

impl WebDomainEventSink {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Spawns the background worker. Later calls are no-ops.
    pub fn start_worker(&self) {
        let rx = match self.rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match rx {
            Some(rx) => {
                tokio::spawn(event_log_worker(rx));
            }
            None => tracing::warn!("Domain event worker already started"),
        }
    }
}

impl Default for WebDomainEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        // Events are best-effort; a closed channel means the server is shutting down.
        if self.tx.send(event).is_err() {
            tracing::debug!("Domain event dropped: worker stopped");
        }
    }
}

async fn event_log_worker(mut rx: mpsc::UnboundedReceiver<DomainEvent>) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(target: "freightfin::events", %payload, "domain event"),
            Err(e) => tracing::warn!("Failed to encode domain event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightfin_core::money::Money;

    #[tokio::test]
    async fn events_are_buffered_until_the_worker_starts() {
        let sink = WebDomainEventSink::new();
        sink.emit(DomainEvent::trip_created(
            "trip-1".to_string(),
            "owner-1".to_string(),
            Money::from_minor(100),
        ));
        let mut rx = sink.rx.lock().unwrap().take().unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(DomainEvent::TripCreated { .. })
        ));
    }
}
