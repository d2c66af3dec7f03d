//! Handles a consumer receives when it mounts a service.

use mfshell_bus::EventBus;
use mfshell_types::{BusEvent, ShellEvent};
use tracing::debug;

/// Router handle.  Routing is not wired into the shell yet, so `push` only
/// records the request in the trace log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History;

impl History {
    pub fn push(&self, path: &str) {
        debug!(path, "history push ignored");
    }
}

/// Controls of a mounted service, so it can be driven by another service.
#[derive(Debug, Clone)]
pub struct ServiceControls<E: BusEvent = ShellEvent> {
    pub history: History,
    pub events: EventBus<E>,
}

impl<E: BusEvent> ServiceControls<E> {
    /// Default controls: no-op history and the given bus.
    pub fn with_bus(events: EventBus<E>) -> Self {
        Self {
            history: History,
            events,
        }
    }
}
