//! [`MountedInstanceSlot`] – which instance of a provider is mounted.
//!
//! Each provider module owns exactly one slot.  A handle to it is stored in
//! every entry the provider registers; when a consumer mounts one of those
//! entries the registry writes the entry into the slot.  The provider can
//! then look at its own slot to find the controls it was mounted with.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mfshell_types::{BusEvent, ShellError, ShellEvent};
use tracing::debug;

use crate::instance::ServiceInstance;

struct SlotInner<E: BusEvent> {
    owner: String,
    slot: Mutex<Option<Arc<ServiceInstance<E>>>>,
}

/// Single-slot holder of the currently mounted [`ServiceInstance`].
///
/// Clones share the same slot.
pub struct MountedInstanceSlot<E: BusEvent = ShellEvent> {
    inner: Arc<SlotInner<E>>,
}

impl<E: BusEvent> MountedInstanceSlot<E> {
    /// Create an empty slot owned by the provider labelled `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SlotInner {
                owner: owner.into(),
                slot: Mutex::new(None),
            }),
        }
    }

    /// Label of the provider owning this slot.
    pub fn owner(&self) -> &str {
        &self.inner.owner
    }

    /// Record `instance` as mounted.
    ///
    /// # Errors
    ///
    /// [`ShellError::DuplicateMount`] when the slot is already occupied; the
    /// current occupant is kept.
    pub fn set(&self, instance: Arc<ServiceInstance<E>>) -> Result<(), ShellError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(ShellError::DuplicateMount {
                provider: self.inner.owner.clone(),
            });
        }
        debug!(
            provider = %self.inner.owner,
            service_id = %instance.service_id(),
            instance_id = instance.instance_id(),
            "mounted instance recorded"
        );
        *slot = Some(instance);
        Ok(())
    }

    pub fn get(&self) -> Option<Arc<ServiceInstance<E>>> {
        self.slot().clone()
    }

    /// Empty the slot.  Idempotent.
    pub fn reset(&self) {
        if self.slot().take().is_some() {
            debug!(provider = %self.inner.owner, "mounted instance cleared");
        }
    }

    /// Empty the slot only if it currently holds `instance`.  Returns
    /// whether it did.
    pub fn reset_if_holds(&self, instance: &Arc<ServiceInstance<E>>) -> bool {
        let mut slot = self.slot();
        if !slot.as_ref().is_some_and(|held| Arc::ptr_eq(held, instance)) {
            return false;
        }
        *slot = None;
        debug!(
            provider = %self.inner.owner,
            instance_id = instance.instance_id(),
            "mounted instance cleared"
        );
        true
    }

    pub fn is_occupied(&self) -> bool {
        self.slot().is_some()
    }

    /// `true` when both handles refer to the same slot.
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<ServiceInstance<E>>>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: BusEvent> Clone for MountedInstanceSlot<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> fmt::Debug for MountedInstanceSlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedInstanceSlot")
            .field("owner", &self.inner.owner)
            .field("occupied", &self.is_occupied())
            .finish()
    }
}
