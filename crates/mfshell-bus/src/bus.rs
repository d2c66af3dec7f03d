//! Typed, kind-filtered publish/subscribe event bus.
//!
//! Handlers are plain closures registered against an event kind (see
//! [`BusEvent::kind`]).  [`EventBus::emit`] runs every matching handler
//! synchronously on the caller's thread, in registration order.  A panic
//! inside a handler is not caught: it unwinds through `emit` and the
//! remaining handlers do not run.
//!
//! Every bus also owns a [`tokio::sync::broadcast`] channel.  Receivers
//! obtained with [`EventBus::subscribe`] see every emitted event, after the
//! synchronous handlers have run.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mfshell_types::{BusEvent, ShellEvent};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default broadcast tap capacity (number of buffered events before old
/// ones are dropped for slow receivers).
pub const DEFAULT_CAPACITY: usize = 256;

/// Largest broadcast tap capacity a bus will allocate.  Larger requests are
/// clamped to it.
pub const MAX_CAPACITY: usize = 1 << 16;

/// A registered event handler.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Token returned by [`EventBus::on`] and [`EventBus::on_any`]; pass it to
/// [`EventBus::off`] to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Registration<E: BusEvent> {
    id: HandlerId,
    // `None` matches every kind.
    kind: Option<E::Kind>,
    handler: Handler<E>,
}

impl<E: BusEvent> Registration<E> {
    fn matches(&self, kind: &E::Kind) -> bool {
        self.kind.as_ref().is_none_or(|k| k == kind)
    }
}

struct Inner<E: BusEvent> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<Registration<E>>>,
    tap: broadcast::Sender<E>,
}

/// Shared event bus.  Clone it cheaply – all clones share the same
/// handlers and broadcast tap.  Two independently created buses never see
/// each other's events.
pub struct EventBus<E: BusEvent = ShellEvent> {
    inner: Arc<Inner<E>>,
}

impl<E: BusEvent> EventBus<E> {
    /// Create a new, empty bus.  `capacity` sizes the broadcast tap and is
    /// clamped to `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (tap, _) = broadcast::channel(capacity.clamp(1, MAX_CAPACITY));
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                handlers: Mutex::new(Vec::new()),
                tap,
            }),
        }
    }

    /// Deliver `event` to every handler registered for its kind and to every
    /// wildcard handler, in registration order.
    ///
    /// Returns the number of handlers invoked.  Having no handlers or no tap
    /// receivers is not an error.
    pub fn emit(&self, event: E) -> usize {
        let kind = event.kind();
        // Snapshot so handlers may call back into the bus.
        let targets: Vec<Handler<E>> = self
            .handlers()
            .iter()
            .filter(|r| r.matches(&kind))
            .map(|r| Arc::clone(&r.handler))
            .collect();

        trace!(?kind, handlers = targets.len(), "dispatching event");
        for handler in &targets {
            handler(&event);
        }

        if self.inner.tap.receiver_count() > 0 {
            let _ = self.inner.tap.send(event);
        }
        targets.len()
    }

    /// Register `handler` for events of `kind`.
    pub fn on<F>(&self, kind: E::Kind, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(handler))
    }

    /// Register `handler` for every event kind.
    pub fn on_any<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(handler))
    }

    /// Remove a handler.  Returns `false` if it was not registered here.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|r| r.id != id);
        let removed = handlers.len() != before;
        if removed {
            debug!(handler = id.0, "handler removed");
        }
        removed
    }

    /// Remove every handler.  Broadcast receivers are unaffected.
    pub fn clear(&self) {
        self.handlers().clear();
    }

    /// Number of registered handlers, wildcards included.
    pub fn handler_count(&self) -> usize {
        self.handlers().len()
    }

    /// Subscribe to the broadcast tap.
    ///
    /// The receiver yields every event emitted after this call.  A receiver
    /// that falls more than the bus capacity behind gets
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.inner.tap.subscribe()
    }

    /// `true` when both handles point at the same underlying bus.
    pub fn same_bus(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn register(&self, kind: Option<E::Kind>, handler: Handler<E>) -> HandlerId {
        let id = HandlerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(handler = id.0, ?kind, "handler registered");
        self.handlers().push(Registration { id, kind, handler });
        id
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<Registration<E>>> {
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("tap_receivers", &self.inner.tap.receiver_count())
            .finish()
    }
}
