//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after committed ledger operations. The server wires a sink that forwards
//! them to the notification layer.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
