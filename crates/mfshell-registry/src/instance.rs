//! [`ServiceInstance`] – one registry entry.
//!
//! The immutable half (service, ids, provider slot) is fixed at
//! registration.  The mutable half (controls, mount node, controlled flag)
//! lives behind a lock and cycles between "unmounted" and "mounted" for as
//! long as the registry exists.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mfshell_bus::EventBus;
use mfshell_types::{BusEvent, InstanceId, InstantiateOptions, MountNode, ServiceId, ShellEvent};
use serde::{Deserialize, Serialize};

use crate::controls::ServiceControls;
use crate::mounted::MountedInstanceSlot;
use crate::service::Service;

struct MountState<E: BusEvent> {
    controls: ServiceControls<E>,
    dom_element: Option<MountNode>,
    is_controlled: Option<bool>,
    mounted_at: Option<DateTime<Utc>>,
}

impl<E: BusEvent> MountState<E> {
    fn unmounted(global_bus: &EventBus<E>) -> Self {
        Self {
            controls: ServiceControls::with_bus(global_bus.clone()),
            dom_element: None,
            is_controlled: None,
            mounted_at: None,
        }
    }
}

/// A registered service definition enriched with runtime state.
pub struct ServiceInstance<E: BusEvent = ShellEvent> {
    service: Arc<dyn Service>,
    service_id: ServiceId,
    instance_id: InstanceId,
    registered_at: DateTime<Utc>,
    slot: MountedInstanceSlot<E>,
    global_bus: EventBus<E>,
    state: Mutex<MountState<E>>,
}

impl<E: BusEvent> ServiceInstance<E> {
    pub(crate) fn new(
        service: Arc<dyn Service>,
        instance_id: InstanceId,
        slot: MountedInstanceSlot<E>,
        global_bus: EventBus<E>,
    ) -> Self {
        Self {
            service_id: service.service_id().clone(),
            service,
            instance_id,
            registered_at: Utc::now(),
            slot,
            state: Mutex::new(MountState::unmounted(&global_bus)),
            global_bus,
        }
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Slot of the provider that registered this entry.
    pub fn slot(&self) -> &MountedInstanceSlot<E> {
        &self.slot
    }

    /// Current controls.  Clones share the underlying bus.
    pub fn controls(&self) -> ServiceControls<E> {
        self.state().controls.clone()
    }

    pub fn dom_element(&self) -> Option<MountNode> {
        self.state().dom_element.clone()
    }

    pub fn is_controlled(&self) -> Option<bool> {
        self.state().is_controlled
    }

    /// An entry is mounted iff it has a mount node.
    pub fn is_mounted(&self) -> bool {
        self.state().dom_element.is_some()
    }

    pub fn is_mounted_at(&self, node: &MountNode) -> bool {
        self.state().dom_element.as_ref() == Some(node)
    }

    pub fn snapshot(&self) -> InstanceSnapshot {
        let state = self.state();
        InstanceSnapshot {
            service_id: self.service_id.clone(),
            instance_id: self.instance_id,
            dom_element: state.dom_element.clone(),
            is_controlled: state.is_controlled,
            registered_at: self.registered_at,
            mounted_at: state.mounted_at,
        }
    }

    /// Mark the entry mounted at `node` if it is free.
    ///
    /// Controlled claims swap in a brand-new bus of `bus_capacity`; the
    /// global bus handle is dropped without touching its handlers.
    pub(crate) fn try_claim(
        &self,
        node: &MountNode,
        options: InstantiateOptions,
        bus_capacity: usize,
    ) -> bool {
        let mut state = self.state();
        if state.dom_element.is_some() {
            return false;
        }
        state.dom_element = Some(node.clone());
        state.is_controlled = Some(options.is_controlled);
        state.mounted_at = Some(Utc::now());
        if options.is_controlled {
            state.controls.events = EventBus::new(bus_capacity);
        }
        true
    }

    /// Return to the unmounted state with freshly built controls.
    pub(crate) fn release(&self) {
        *self.state() = MountState::unmounted(&self.global_bus);
    }

    fn state(&self) -> MutexGuard<'_, MountState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: BusEvent> fmt::Debug for ServiceInstance<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ServiceInstance")
            .field("service_id", &self.service_id)
            .field("instance_id", &self.instance_id)
            .field("provider", &self.slot.owner())
            .field("dom_element", &state.dom_element)
            .field("is_controlled", &state.is_controlled)
            .finish()
    }
}

/// Serializable, point-in-time view of a [`ServiceInstance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub service_id: ServiceId,
    pub instance_id: InstanceId,
    pub dom_element: Option<MountNode>,
    pub is_controlled: Option<bool>,
    pub registered_at: DateTime<Utc>,
    pub mounted_at: Option<DateTime<Utc>>,
}
