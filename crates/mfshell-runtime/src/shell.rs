//! [`Shell`] – the rendezvous point shared by every module of a page.
//!
//! A shell owns the global event bus and the service registry.  Build one
//! explicitly with [`Shell::new`] and hand clones to every provider and
//! consumer, or use the process-wide default returned by [`global`] when
//! modules have no way to pass a reference to each other.

use std::sync::{Arc, OnceLock};

use mfshell_bus::{EventBus, HandlerId};
use mfshell_registry::{ServiceControls, ServiceRegistry};
use mfshell_types::{BusEvent, InstantiateOptions, MountNode, ServiceId, ShellError, ShellEvent};
use tracing::info;
use uuid::Uuid;

use crate::config::ShellConfig;
use crate::provider::ProviderScope;

struct ShellInner<E: BusEvent> {
    id: Uuid,
    config: ShellConfig,
    registry: ServiceRegistry<E>,
}

/// Shared shell context.  Clones refer to the same bus and registry.
pub struct Shell<E: BusEvent = ShellEvent> {
    inner: Arc<ShellInner<E>>,
}

impl<E: BusEvent> Shell<E> {
    /// Create a shell with a fresh global bus and an empty registry.
    pub fn new(config: &ShellConfig) -> Self {
        let global_bus = EventBus::new(config.bus_capacity);
        let registry = ServiceRegistry::new(global_bus)
            .with_bus_capacity(config.bus_capacity)
            .with_failure_policy(config.mount_failure);
        let id = Uuid::new_v4();
        info!(shell = %id, policy = ?config.mount_failure, "shell created");
        Self {
            inner: Arc::new(ShellInner {
                id,
                config: config.clone(),
                registry,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &ShellConfig {
        &self.inner.config
    }

    /// The bus every uncontrolled instance shares.  Never replaced.
    pub fn global_bus(&self) -> &EventBus<E> {
        self.inner.registry.global_bus()
    }

    pub fn registry(&self) -> &ServiceRegistry<E> {
        &self.inner.registry
    }

    /// A new bus, unconnected to the global one.
    pub fn create_event_bus(&self) -> EventBus<E> {
        EventBus::new(self.inner.config.bus_capacity)
    }

    pub fn emit_on_global_bus(&self, event: E) -> usize {
        self.global_bus().emit(event)
    }

    pub fn on_event_on_global_bus<F>(&self, kind: E::Kind, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.global_bus().on(kind, handler)
    }

    /// Open the scope of a provider module.  Call once per provider.
    pub fn provider(&self, label: impl Into<String>) -> ProviderScope<E> {
        ProviderScope::new(self.clone(), label)
    }

    /// See [`ServiceRegistry::instantiate_at`].
    pub async fn instantiate_at(
        &self,
        service_id: &ServiceId,
        node: MountNode,
        options: InstantiateOptions,
    ) -> Result<ServiceControls<E>, ShellError> {
        self.inner
            .registry
            .instantiate_at(service_id, node, options)
            .await
    }

    /// See [`ServiceRegistry::unmount_from`].
    pub async fn unmount_from(
        &self,
        service_id: &ServiceId,
        node: &MountNode,
    ) -> Result<(), ShellError> {
        self.inner.registry.unmount_from(service_id, node).await
    }
}

impl<E: BusEvent> Clone for Shell<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Default for Shell<E> {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}

static GLOBAL: OnceLock<Shell> = OnceLock::new();

/// Process-wide shell, created on first use from the environment
/// (see [`ShellConfig::from_env`]).  Every call returns the same shell.
pub fn global() -> &'static Shell {
    GLOBAL.get_or_init(|| Shell::new(&ShellConfig::from_env()))
}
