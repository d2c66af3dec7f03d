//! The provider-side contract.
//!
//! A provider module implements [`Service`] and registers it with a
//! [`ServiceRegistry`][crate::registry::ServiceRegistry].
//! The registry only ever talks to the trait, so how a service actually
//! renders into its node is entirely the provider's business.

use async_trait::async_trait;
use mfshell_types::{MountNode, ServiceId, ShellError};

/// A mountable UI service.
///
/// # Contract
///
/// * `mount` – attach the service to `node`.  Called at most once per
///   instantiation, after the instance has been marked mounted.
/// * `unmount` – detach it from `node`.  The instance stays mounted if this
///   fails.
///
/// Implementations report their own failures as
/// [`ShellError::ServiceFault`]; the registry propagates whatever is
/// returned unchanged.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable identifier shared by every registration of this service.
    fn service_id(&self) -> &ServiceId;

    async fn mount(&self, node: &MountNode) -> Result<(), ShellError>;

    async fn unmount(&self, node: &MountNode) -> Result<(), ShellError>;
}
