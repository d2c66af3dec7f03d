//! [`ProviderScope`] – the facade a provider module talks to.
//!
//! A provider registers its service through its scope and publishes or
//! listens to events through [`ProviderScope::emit`] / [`ProviderScope::on`].
//! While nobody has mounted the provider those calls go to the global bus.
//! Once a consumer mounts one of its instances they go to that instance's
//! controls instead, which for a controlled instance is a private bus
//! shared only with that consumer.

use std::fmt;
use std::sync::Arc;

use mfshell_bus::{EventBus, HandlerId};
use mfshell_registry::{MountedInstanceSlot, Service, ServiceControls, ServiceInstance};
use mfshell_types::{BusEvent, InstantiateOptions, MountNode, ServiceId, ShellError, ShellEvent};
use tracing::debug;
use uuid::Uuid;

use crate::shell::Shell;

/// The scope of one provider module: its shell plus its own
/// mounted-instance slot.  Clones share the slot.
pub struct ProviderScope<E: BusEvent = ShellEvent> {
    id: Uuid,
    shell: Shell<E>,
    slot: MountedInstanceSlot<E>,
}

impl<E: BusEvent> ProviderScope<E> {
    pub(crate) fn new(shell: Shell<E>, label: impl Into<String>) -> Self {
        let scope = Self {
            id: Uuid::new_v4(),
            shell,
            slot: MountedInstanceSlot::new(label),
        };
        debug!(scope = %scope.id, provider = scope.label(), "provider scope opened");
        scope
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        self.slot.owner()
    }

    pub fn shell(&self) -> &Shell<E> {
        &self.shell
    }

    /// Register `service` as provided by this scope.
    pub fn register_instance(&self, service: Arc<dyn Service>) -> Arc<ServiceInstance<E>> {
        self.shell.registry().register_instance(service, &self.slot)
    }

    /// Mount another service; see [`Shell::instantiate_at`].
    pub async fn instantiate_at(
        &self,
        service_id: &ServiceId,
        node: MountNode,
        options: InstantiateOptions,
    ) -> Result<ServiceControls<E>, ShellError> {
        self.shell.instantiate_at(service_id, node, options).await
    }

    /// Unmount another service; see [`Shell::unmount_from`].
    pub async fn unmount_from(
        &self,
        service_id: &ServiceId,
        node: &MountNode,
    ) -> Result<(), ShellError> {
        self.shell.unmount_from(service_id, node).await
    }

    /// The instance of this provider a consumer currently has mounted.
    /// Meant for plugins.
    pub fn mounted_instance(&self) -> Option<Arc<ServiceInstance<E>>> {
        self.slot.get()
    }

    /// The bus this provider's `emit` and `on` currently resolve to.
    pub fn events(&self) -> EventBus<E> {
        match self.slot.get() {
            Some(instance) => instance.controls().events,
            None => self.shell.global_bus().clone(),
        }
    }

    /// Emit on the mounted instance's bus, or on the global bus when
    /// unmounted.
    pub fn emit(&self, event: E) -> usize {
        self.events().emit(event)
    }

    /// Listen on the mounted instance's bus, or on the global bus when
    /// unmounted.  The bus is resolved now; a handler registered before a
    /// controlled mount stays on the global bus.
    pub fn on<F>(&self, kind: E::Kind, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.events().on(kind, handler)
    }
}

impl<E: BusEvent> Clone for ProviderScope<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shell: self.shell.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<E: BusEvent> fmt::Debug for ProviderScope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderScope")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .finish()
    }
}
