//! Domain events runtime bridge for the web server.
//!
//! Receives domain events via DomainEventSink and hands them to a background
//! worker that records them in the structured log. Notification delivery
//! hooks in here.

mod sink;

pub use sink::WebDomainEventSink;
