//! `mfshell-registry` – service lifecycle bookkeeping
//!
//! Turns service definitions published by provider modules into mountable
//! instances and hands their controls to the consumers that mount them.
//!
//! # Modules
//!
//! - [`service`] – [`Service`]: the contract every provider implements
//!   (`service_id`, async `mount`, async `unmount`).
//! - [`controls`] – [`ServiceControls`]: the history and event bus handed
//!   to whoever mounts an instance.
//! - [`mounted`] – [`MountedInstanceSlot`]: the per-provider single slot
//!   recording which instance of that provider is currently mounted.
//! - [`instance`] – [`ServiceInstance`]: a registry entry and its mutable
//!   mount state.
//! - [`registry`] – [`ServiceRegistry`]: the ordered list of entries and
//!   the register / instantiate / unmount protocol.

pub mod controls;
pub mod instance;
pub mod mounted;
pub mod registry;
pub mod service;

pub use controls::{History, ServiceControls};
pub use instance::{InstanceSnapshot, ServiceInstance};
pub use mounted::MountedInstanceSlot;
pub use registry::ServiceRegistry;
pub use service::Service;
