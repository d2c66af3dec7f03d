//! [`ServiceRegistry`] – the shared list of service instances.
//!
//! Providers append entries with [`ServiceRegistry::register_instance`];
//! consumers move them between the unmounted and mounted states with
//! [`ServiceRegistry::instantiate_at`] and [`ServiceRegistry::unmount_from`].
//!
//! # Ordering
//!
//! Entries keep their insertion order forever and are never removed.  When
//! several entries of a service are free, `instantiate_at` always picks the
//! earliest registered one.
//!
//! # Failed mounts
//!
//! What happens to an entry whose `mount` fails is governed by
//! [`MountFailurePolicy`].  With [`MountFailurePolicy::LeaveMounted`] the
//! entry stays marked as mounted until the consumer unmounts it; with
//! [`MountFailurePolicy::Rollback`] it is freed again.  A failed `unmount`
//! always leaves the entry mounted.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mfshell_bus::{DEFAULT_CAPACITY, EventBus, MAX_CAPACITY};
use mfshell_types::{
    BusEvent, InstanceId, InstantiateOptions, MountFailurePolicy, MountNode, ServiceId,
    ShellError, ShellEvent,
};
use tracing::{info, instrument, warn};

use crate::controls::ServiceControls;
use crate::instance::{InstanceSnapshot, ServiceInstance};
use crate::mounted::MountedInstanceSlot;
use crate::service::Service;

/// Ordered registry of every [`ServiceInstance`] known to a shell.
///
/// Construct with [`ServiceRegistry::new`], register services from provider
/// scopes, then instantiate and unmount them from consumers.
pub struct ServiceRegistry<E: BusEvent = ShellEvent> {
    global_bus: EventBus<E>,
    bus_capacity: usize,
    failure_policy: MountFailurePolicy,
    instances: RwLock<Vec<Arc<ServiceInstance<E>>>>,
}

impl<E: BusEvent> ServiceRegistry<E> {
    /// Create an empty registry whose uncontrolled instances use
    /// `global_bus`.
    pub fn new(global_bus: EventBus<E>) -> Self {
        Self {
            global_bus,
            bus_capacity: DEFAULT_CAPACITY,
            failure_policy: MountFailurePolicy::default(),
            instances: RwLock::new(Vec::new()),
        }
    }

    /// Capacity of the private buses created for controlled instances,
    /// clamped to `1..=MAX_CAPACITY`.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity.clamp(1, MAX_CAPACITY);
        self
    }

    pub fn with_failure_policy(mut self, policy: MountFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn global_bus(&self) -> &EventBus<E> {
        &self.global_bus
    }

    pub fn failure_policy(&self) -> MountFailurePolicy {
        self.failure_policy
    }

    /// Append a new entry for `service`, owned by the provider whose slot is
    /// `slot`.
    ///
    /// The entry gets the next free instance id for its service (highest
    /// existing id + 1, or 0), a no-op history and the global bus.
    pub fn register_instance(
        &self,
        service: Arc<dyn Service>,
        slot: &MountedInstanceSlot<E>,
    ) -> Arc<ServiceInstance<E>> {
        let mut instances = self.write();
        let service_id = service.service_id();
        let instance_id: InstanceId = instances
            .iter()
            .filter(|i| i.service_id() == service_id)
            .map(|i| i.instance_id() + 1)
            .max()
            .unwrap_or(0);

        let entry = Arc::new(ServiceInstance::new(
            service,
            instance_id,
            slot.clone(),
            self.global_bus.clone(),
        ));
        info!(
            service_id = %entry.service_id(),
            instance_id,
            provider = slot.owner(),
            "service instance registered"
        );
        instances.push(Arc::clone(&entry));
        entry
    }

    /// Mount the first free instance of `service_id` at `node`.
    ///
    /// Marks the entry mounted, gives it a private bus when
    /// `options.is_controlled`, records it in its provider's slot, then
    /// awaits the service's own `mount`.
    ///
    /// # Errors
    ///
    /// * [`ShellError::NoAvailableInstance`] – nothing registered or every
    ///   entry already mounted.
    /// * [`ShellError::DuplicateMount`] – the provider's slot is taken.
    /// * whatever the service's `mount` returns.
    #[instrument(skip(self, node), fields(node = %node))]
    pub async fn instantiate_at(
        &self,
        service_id: &ServiceId,
        node: MountNode,
        options: InstantiateOptions,
    ) -> Result<ServiceControls<E>, ShellError> {
        let entry = self
            .claim(service_id, &node, options)
            .ok_or_else(|| ShellError::NoAvailableInstance(service_id.clone()))?;

        if let Err(e) = entry.slot().set(Arc::clone(&entry)) {
            warn!(error = %e, instance_id = entry.instance_id(), "provider slot occupied");
            if self.failure_policy == MountFailurePolicy::Rollback {
                entry.release();
            }
            return Err(e);
        }

        if let Err(e) = entry.service().mount(&node).await {
            warn!(error = %e, instance_id = entry.instance_id(), "service mount failed");
            if self.failure_policy == MountFailurePolicy::Rollback {
                entry.slot().reset_if_holds(&entry);
                entry.release();
            }
            return Err(e);
        }

        info!(
            instance_id = entry.instance_id(),
            controlled = options.is_controlled,
            "service instance mounted"
        );
        Ok(entry.controls())
    }

    /// Unmount the instance of `service_id` mounted at `node`.
    ///
    /// Awaits the service's `unmount`; on success clears the provider's slot
    /// and returns the entry to the unmounted state with fresh controls.
    /// Handlers still attached to a private bus are dropped along with it.
    ///
    /// The slot is only cleared when it holds this entry.  An entry left
    /// stuck by a [`ShellError::DuplicateMount`] never made it into the
    /// slot, so unmounting it keeps the provider's real occupant.
    ///
    /// # Errors
    ///
    /// * [`ShellError::NoMountedInstance`] – no instance of that service is
    ///   mounted at `node`, whatever else may be.
    /// * whatever the service's `unmount` returns; the entry stays mounted.
    #[instrument(skip(self, node), fields(node = %node))]
    pub async fn unmount_from(
        &self,
        service_id: &ServiceId,
        node: &MountNode,
    ) -> Result<(), ShellError> {
        let entry = self
            .read()
            .iter()
            .find(|i| i.service_id() == service_id && i.is_mounted_at(node))
            .cloned()
            .ok_or_else(|| ShellError::NoMountedInstance {
                service_id: service_id.clone(),
                node: node.clone(),
            })?;

        if let Err(e) = entry.service().unmount(node).await {
            warn!(error = %e, instance_id = entry.instance_id(), "service unmount failed");
            return Err(e);
        }

        entry.slot().reset_if_holds(&entry);
        entry.release();
        info!(instance_id = entry.instance_id(), "service instance unmounted");
        Ok(())
    }

    /// Every entry, in registration order.
    pub fn instances(&self) -> Vec<Arc<ServiceInstance<E>>> {
        self.read().clone()
    }

    pub fn snapshot(&self) -> Vec<InstanceSnapshot> {
        self.read().iter().map(|i| i.snapshot()).collect()
    }

    pub fn find(
        &self,
        service_id: &ServiceId,
        instance_id: InstanceId,
    ) -> Option<Arc<ServiceInstance<E>>> {
        self.read()
            .iter()
            .find(|i| i.service_id() == service_id && i.instance_id() == instance_id)
            .cloned()
    }

    /// Number of unmounted entries of `service_id`.
    pub fn available_count(&self, service_id: &ServiceId) -> usize {
        self.read()
            .iter()
            .filter(|i| i.service_id() == service_id && !i.is_mounted())
            .count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Find-and-mark in one step so two consumers never claim the same entry.
    fn claim(
        &self,
        service_id: &ServiceId,
        node: &MountNode,
        options: InstantiateOptions,
    ) -> Option<Arc<ServiceInstance<E>>> {
        self.read()
            .iter()
            .filter(|i| i.service_id() == service_id)
            .find(|i| i.try_claim(node, options, self.bus_capacity))
            .cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<ServiceInstance<E>>>> {
        self.instances.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<ServiceInstance<E>>>> {
        self.instances.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: BusEvent> Default for ServiceRegistry<E> {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mfshell_types::EventKind;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    // ------------------------------------------------------------------
    // Test doubles
    // ------------------------------------------------------------------

    struct MockService {
        id: ServiceId,
        mounted_on: Mutex<Vec<MountNode>>,
        fail_mount: AtomicBool,
        fail_unmount: AtomicBool,
    }

    impl MockService {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: ServiceId::from(id),
                mounted_on: Mutex::new(Vec::new()),
                fail_mount: AtomicBool::new(false),
                fail_unmount: AtomicBool::new(false),
            })
        }

        fn fault(&self, details: &str) -> ShellError {
            ShellError::ServiceFault {
                service_id: self.id.clone(),
                details: details.to_string(),
            }
        }
    }

    #[async_trait]
    impl Service for MockService {
        fn service_id(&self) -> &ServiceId {
            &self.id
        }

        async fn mount(&self, node: &MountNode) -> Result<(), ShellError> {
            if self.fail_mount.load(Ordering::SeqCst) {
                return Err(self.fault("render crashed"));
            }
            self.mounted_on.lock().unwrap().push(node.clone());
            Ok(())
        }

        async fn unmount(&self, node: &MountNode) -> Result<(), ShellError> {
            if self.fail_unmount.load(Ordering::SeqCst) {
                return Err(self.fault("teardown crashed"));
            }
            self.mounted_on.lock().unwrap().retain(|n| n != node);
            Ok(())
        }
    }

    fn chat() -> ServiceId {
        ServiceId::from("chat")
    }

    /// Register `count` chat instances, each from its own provider scope.
    fn registry_with_chats(
        count: usize,
    ) -> (ServiceRegistry, Vec<Arc<MockService>>, Vec<MountedInstanceSlot>) {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let mut services = Vec::new();
        let mut slots = Vec::new();
        for n in 0..count {
            let service = MockService::new("chat");
            let slot = MountedInstanceSlot::new(format!("chat-provider-{n}"));
            registry.register_instance(service.clone(), &slot);
            services.push(service);
            slots.push(slot);
        }
        (registry, services, slots)
    }

    // ------------------------------------------------------------------
    // register_instance
    // ------------------------------------------------------------------

    #[test]
    fn instance_ids_count_up_per_service() {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let slot = MountedInstanceSlot::new("p");

        let ids: Vec<InstanceId> = (0..3)
            .map(|_| registry.register_instance(MockService::new("chat"), &slot).instance_id())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // Another service starts from zero again.
        let cart = registry.register_instance(MockService::new("cart"), &slot);
        assert_eq!(cart.instance_id(), 0);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn registered_entry_starts_unmounted_on_global_bus() {
        let (registry, _, _) = registry_with_chats(1);
        let entry = registry.find(&chat(), 0).unwrap();
        assert!(!entry.is_mounted());
        assert!(entry.controls().events.same_bus(registry.global_bus()));
        assert_eq!(registry.available_count(&chat()), 1);
    }

    // ------------------------------------------------------------------
    // instantiate_at
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn instantiate_picks_earliest_free_entry() {
        let (registry, services, _) = registry_with_chats(3);

        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();
        registry
            .instantiate_at(&chat(), MountNode::from("#b"), InstantiateOptions::default())
            .await
            .unwrap();

        assert_eq!(registry.find(&chat(), 0).unwrap().dom_element(), Some(MountNode::from("#a")));
        assert_eq!(registry.find(&chat(), 1).unwrap().dom_element(), Some(MountNode::from("#b")));
        assert!(!registry.find(&chat(), 2).unwrap().is_mounted());
        assert_eq!(*services[0].mounted_on.lock().unwrap(), vec![MountNode::from("#a")]);
    }

    #[tokio::test]
    async fn instantiate_unknown_service_fails() {
        let (registry, _, _) = registry_with_chats(1);
        let result = registry
            .instantiate_at(&ServiceId::from("cart"), MountNode::from("#a"), InstantiateOptions::default())
            .await;
        assert_eq!(
            result.unwrap_err(),
            ShellError::NoAvailableInstance(ServiceId::from("cart"))
        );
    }

    #[tokio::test]
    async fn instantiate_when_all_mounted_fails() {
        let (registry, _, _) = registry_with_chats(1);
        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();

        let result = registry
            .instantiate_at(&chat(), MountNode::from("#b"), InstantiateOptions::default())
            .await;
        assert!(matches!(result, Err(ShellError::NoAvailableInstance(_))));
    }

    #[tokio::test]
    async fn uncontrolled_instance_shares_global_bus() {
        let (registry, _, _) = registry_with_chats(1);
        let controls = registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();

        let seen = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&seen);
        controls.events.on(EventKind::message("x"), move |_| {
            flag.store(true, Ordering::SeqCst);
        });
        registry.global_bus().emit(ShellEvent::message("x", json!(null)));

        assert!(seen.load(Ordering::SeqCst));
        assert!(controls.events.same_bus(registry.global_bus()));
    }

    #[tokio::test]
    async fn controlled_instance_is_isolated_both_ways() {
        let (registry, _, _) = registry_with_chats(1);
        let controls = registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::controlled())
            .await
            .unwrap();
        assert!(!controls.events.same_bus(registry.global_bus()));

        let private_hits = Arc::new(Mutex::new(0));
        let global_hits = Arc::new(Mutex::new(0));
        let p = Arc::clone(&private_hits);
        controls.events.on(EventKind::message("x"), move |_| *p.lock().unwrap() += 1);
        let g = Arc::clone(&global_hits);
        registry.global_bus().on(EventKind::message("x"), move |_| *g.lock().unwrap() += 1);

        registry.global_bus().emit(ShellEvent::message("x", json!(1)));
        controls.events.emit(ShellEvent::message("x", json!(2)));

        assert_eq!(*private_hits.lock().unwrap(), 1);
        assert_eq!(*global_hits.lock().unwrap(), 1);
        assert_eq!(registry.find(&chat(), 0).unwrap().is_controlled(), Some(true));
    }

    #[tokio::test]
    async fn instantiate_records_entry_in_provider_slot() {
        let (registry, _, slots) = registry_with_chats(2);
        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();

        let held = slots[0].get().expect("provider 0 must see its instance");
        assert_eq!(held.instance_id(), 0);
        assert!(held.is_mounted_at(&MountNode::from("#a")));
        assert!(!slots[1].is_occupied());
    }

    #[tokio::test]
    async fn two_mounts_from_one_provider_is_duplicate_mount() {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let slot = MountedInstanceSlot::new("chat-provider");
        registry.register_instance(MockService::new("chat"), &slot);
        registry.register_instance(MockService::new("chat"), &slot);

        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();
        let result = registry
            .instantiate_at(&chat(), MountNode::from("#b"), InstantiateOptions::default())
            .await;

        assert!(matches!(result, Err(ShellError::DuplicateMount { .. })));
        // Left mounted under the default policy.
        assert!(registry.find(&chat(), 1).unwrap().is_mounted());
        assert_eq!(slot.get().unwrap().instance_id(), 0);
    }

    #[tokio::test]
    async fn duplicate_mount_rollback_keeps_existing_occupant() {
        let registry: ServiceRegistry =
            ServiceRegistry::default().with_failure_policy(MountFailurePolicy::Rollback);
        let slot = MountedInstanceSlot::new("chat-provider");
        registry.register_instance(MockService::new("chat"), &slot);
        registry.register_instance(MockService::new("chat"), &slot);

        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();
        let result = registry
            .instantiate_at(&chat(), MountNode::from("#b"), InstantiateOptions::default())
            .await;

        assert!(matches!(result, Err(ShellError::DuplicateMount { .. })));
        assert!(!registry.find(&chat(), 1).unwrap().is_mounted());
        assert_eq!(slot.get().unwrap().instance_id(), 0);
    }

    #[tokio::test]
    async fn unmounting_stuck_duplicate_keeps_real_occupant() {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let slot = MountedInstanceSlot::new("chat-provider");
        registry.register_instance(MockService::new("chat"), &slot);
        registry.register_instance(MockService::new("chat"), &slot);

        let controls = registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::controlled())
            .await
            .unwrap();
        let result = registry
            .instantiate_at(&chat(), MountNode::from("#b"), InstantiateOptions::default())
            .await;
        assert!(matches!(result, Err(ShellError::DuplicateMount { .. })));

        registry.unmount_from(&chat(), &MountNode::from("#b")).await.unwrap();

        let held = slot.get().expect("entry 0 is still mounted");
        assert_eq!(held.instance_id(), 0);
        assert!(held.controls().events.same_bus(&controls.events));
        assert!(!held.controls().events.same_bus(registry.global_bus()));
    }

    #[tokio::test]
    async fn failed_mount_leaves_entry_stuck_by_default() {
        let (registry, services, slots) = registry_with_chats(1);
        services[0].fail_mount.store(true, Ordering::SeqCst);

        let result = registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::controlled())
            .await;
        assert!(matches!(result, Err(ShellError::ServiceFault { .. })));

        let entry = registry.find(&chat(), 0).unwrap();
        assert!(entry.is_mounted_at(&MountNode::from("#a")));
        assert!(slots[0].is_occupied());
        assert_eq!(registry.available_count(&chat()), 0);

        // The consumer can still unmount the stuck entry.
        registry.unmount_from(&chat(), &MountNode::from("#a")).await.unwrap();
        assert_eq!(registry.available_count(&chat()), 1);
    }

    #[tokio::test]
    async fn failed_mount_rolls_back_when_configured() {
        let registry: ServiceRegistry =
            ServiceRegistry::default().with_failure_policy(MountFailurePolicy::Rollback);
        let service = MockService::new("chat");
        service.fail_mount.store(true, Ordering::SeqCst);
        let slot = MountedInstanceSlot::new("chat-provider");
        registry.register_instance(service.clone(), &slot);

        let result = registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::controlled())
            .await;
        assert!(result.is_err());

        let entry = registry.find(&chat(), 0).unwrap();
        assert!(!entry.is_mounted());
        assert_eq!(entry.is_controlled(), None);
        assert!(entry.controls().events.same_bus(registry.global_bus()));
        assert!(!slot.is_occupied());

        // A retry goes through once the service recovers.
        service.fail_mount.store(false, Ordering::SeqCst);
        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();
    }

    // ------------------------------------------------------------------
    // unmount_from
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn unmount_requires_matching_service_at_node() {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let slot = MountedInstanceSlot::new("p");
        registry.register_instance(MockService::new("cart"), &slot);
        registry.register_instance(MockService::new("chat"), &MountedInstanceSlot::new("q"));

        registry
            .instantiate_at(&ServiceId::from("cart"), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();

        // `cart` is mounted at #a, but `chat` is not.
        let result = registry.unmount_from(&chat(), &MountNode::from("#a")).await;
        assert_eq!(
            result.unwrap_err(),
            ShellError::NoMountedInstance {
                service_id: chat(),
                node: MountNode::from("#a"),
            }
        );
    }

    #[tokio::test]
    async fn round_trip_frees_entry_with_fresh_controls() {
        let (registry, _, slots) = registry_with_chats(1);
        let node = MountNode::from("#a");

        let first = registry
            .instantiate_at(&chat(), node.clone(), InstantiateOptions::controlled())
            .await
            .unwrap();
        first.events.on(EventKind::message("x"), |_| {});

        registry.unmount_from(&chat(), &node).await.unwrap();
        let entry = registry.find(&chat(), 0).unwrap();
        assert_eq!(entry.dom_element(), None);
        assert_eq!(entry.is_controlled(), None);
        assert!(!slots[0].is_occupied());

        let second = registry
            .instantiate_at(&chat(), node.clone(), InstantiateOptions::default())
            .await
            .unwrap();
        assert!(second.events.same_bus(registry.global_bus()));
        assert!(!second.events.same_bus(&first.events));
        assert_eq!(registry.find(&chat(), 0).unwrap().instance_id(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn failed_unmount_keeps_entry_mounted() {
        let (registry, services, slots) = registry_with_chats(1);
        let node = MountNode::from("#a");
        registry
            .instantiate_at(&chat(), node.clone(), InstantiateOptions::default())
            .await
            .unwrap();

        services[0].fail_unmount.store(true, Ordering::SeqCst);
        let result = registry.unmount_from(&chat(), &node).await;
        assert!(matches!(result, Err(ShellError::ServiceFault { .. })));
        assert!(registry.find(&chat(), 0).unwrap().is_mounted_at(&node));
        assert!(slots[0].is_occupied());
    }

    #[test]
    fn snapshot_lists_entries_in_registration_order() {
        let registry: ServiceRegistry = ServiceRegistry::default();
        let slot = MountedInstanceSlot::new("p");
        registry.register_instance(MockService::new("chat"), &slot);
        registry.register_instance(MockService::new("cart"), &slot);
        registry.register_instance(MockService::new("chat"), &slot);

        let order: Vec<(String, InstanceId)> = registry
            .snapshot()
            .into_iter()
            .map(|s| (s.service_id.to_string(), s.instance_id))
            .collect();
        assert_eq!(
            order,
            vec![
                ("chat".to_string(), 0),
                ("cart".to_string(), 0),
                ("chat".to_string(), 1),
            ]
        );
        assert!(!registry.is_empty());
    }

    #[tokio::test]
    async fn instances_keep_registration_time_across_mounts() {
        let (registry, _, _) = registry_with_chats(2);
        let before: Vec<_> = registry.instances().iter().map(|i| i.registered_at()).collect();
        assert_eq!(before.len(), 2);
        assert!(before[0] <= before[1]);

        registry
            .instantiate_at(&chat(), MountNode::from("#a"), InstantiateOptions::default())
            .await
            .unwrap();

        let instances = registry.instances();
        assert_eq!(instances[0].registered_at(), before[0]);
        assert!(instances[0].is_mounted());
        assert!(!instances[1].is_mounted());
        let snapshot = instances[0].snapshot();
        assert_eq!(snapshot.registered_at, before[0]);
        assert!(snapshot.mounted_at.is_some_and(|at| at >= before[0]));
    }
}
