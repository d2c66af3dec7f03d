use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for a class of service, e.g. `"chat"` or `"cart"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Index distinguishing registrations that share a [`ServiceId`].
pub type InstanceId = u32;

/// Opaque handle to the host node a service renders into (a DOM element
/// id, a selector, a window name, …).  Two handles denote the same node
/// iff they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountNode(String);

impl MountNode {
    pub fn new(node: impl Into<String>) -> Self {
        Self(node.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MountNode {
    fn from(node: &str) -> Self {
        Self::new(node)
    }
}

/// Options supplied by a consumer when instantiating a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantiateOptions {
    /// Give the instance a private event bus instead of the global one.
    pub is_controlled: bool,
}

impl InstantiateOptions {
    /// Options for a controlled (privately scoped) instance.
    pub fn controlled() -> Self {
        Self { is_controlled: true }
    }
}

/// What the registry does with an entry whose mount did not complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountFailurePolicy {
    /// Keep the entry marked as mounted; the consumer must unmount it.
    #[default]
    LeaveMounted,
    /// Return the entry to the unmounted state.
    Rollback,
}

impl std::str::FromStr for MountFailurePolicy {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leave_mounted" => Ok(Self::LeaveMounted),
            "rollback" => Ok(Self::Rollback),
            other => Err(ShellError::Config(format!(
                "unknown mount failure policy '{other}'"
            ))),
        }
    }
}

/// An event that can travel over an event bus.
///
/// Handlers subscribe to a [`BusEvent::Kind`]; every emitted event is
/// delivered to the handlers registered for `event.kind()`.
pub trait BusEvent: Clone + Send + Sync + 'static {
    type Kind: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Default event vocabulary exchanged between services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ShellEvent {
    /// A request to navigate the receiving service to `path`.
    Navigate { path: String },
    /// Application-defined message on a named topic.
    Message {
        topic: String,
        data: serde_json::Value,
    },
}

impl ShellEvent {
    pub fn message(topic: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Message {
            topic: topic.into(),
            data,
        }
    }

    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate { path: path.into() }
    }
}

/// Discriminator of a [`ShellEvent`].  Messages are keyed by topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Navigate,
    Message(String),
}

impl EventKind {
    pub fn message(topic: impl Into<String>) -> Self {
        Self::Message(topic.into())
    }
}

impl BusEvent for ShellEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            ShellEvent::Navigate { .. } => EventKind::Navigate,
            ShellEvent::Message { topic, .. } => EventKind::Message(topic.clone()),
        }
    }
}

/// Error type shared by every layer of the shell.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellError {
    #[error("Mounted instance already defined for provider {provider}")]
    DuplicateMount { provider: String },

    #[error("No available instance for service {0}")]
    NoAvailableInstance(ServiceId),

    #[error("No instance of service {service_id} mounted at {node}")]
    NoMountedInstance {
        service_id: ServiceId,
        node: MountNode,
    },

    #[error("Service Fault on {service_id}: {details}")]
    ServiceFault {
        service_id: ServiceId,
        details: String,
    },

    #[error("Configuration Error: {0}")]
    Config(String),
}
