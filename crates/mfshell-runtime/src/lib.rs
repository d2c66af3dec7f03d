//! `mfshell-runtime` – the public face of the shell
//!
//! # Modules
//!
//! - [`shell`] – [`Shell`]: the context every module shares, owning the
//!   global event bus and the service registry.  [`global`] returns a
//!   lazily created process-wide shell.
//! - [`provider`] – [`ProviderScope`]: one per provider module.  Registers
//!   the provider's services and routes its `emit` / `on` calls to whichever
//!   bus it is currently mounted with.
//! - [`config`] – [`ShellConfig`]: bus capacity, mount failure policy and
//!   log format, read from `~/.mfshell/config.toml` and `MFSHELL_*`
//!   variables.
//! - [`telemetry`] – [`init_tracing`]: installs the `tracing` subscriber,
//!   with optional OTLP span export.

pub mod config;
pub mod provider;
pub mod shell;
pub mod telemetry;

pub use config::{LogFormat, ShellConfig};
pub use provider::ProviderScope;
pub use shell::{Shell, global};
pub use telemetry::{TracerProviderGuard, init_tracing};

pub use mfshell_bus::{EventBus, HandlerId};
pub use mfshell_registry::{
    History, InstanceSnapshot, Service, ServiceControls, ServiceInstance, ServiceRegistry,
};
pub use mfshell_types::{
    BusEvent, EventKind, InstanceId, InstantiateOptions, MountFailurePolicy, MountNode,
    ServiceId, ShellError, ShellEvent,
};
