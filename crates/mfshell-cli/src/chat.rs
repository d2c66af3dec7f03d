//! A toy chat service used by the demo.
//!
//! On mount it starts listening, through its provider scope, for messages
//! on the `"x"` topic and records which ones reach it.  Because listening
//! goes through the scope, a controlled instance only hears its own
//! consumer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mfshell_runtime::{
    EventKind, HandlerId, MountNode, ProviderScope, Service, ServiceId, ShellError, ShellEvent,
};
use tracing::info;

pub const TOPIC: &str = "x";

pub struct ChatService {
    id: ServiceId,
    scope: ProviderScope,
    listener: Mutex<Option<HandlerId>>,
    inbox: Arc<Mutex<Vec<String>>>,
}

impl ChatService {
    pub fn new(scope: ProviderScope) -> Arc<Self> {
        Arc::new(Self {
            id: ServiceId::from("chat"),
            scope,
            listener: Mutex::new(None),
            inbox: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Messages received while mounted.
    pub fn inbox(&self) -> Vec<String> {
        self.inbox.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn fault(&self, details: &str) -> ShellError {
        ShellError::ServiceFault {
            service_id: self.id.clone(),
            details: details.to_string(),
        }
    }
}

#[async_trait]
impl Service for ChatService {
    fn service_id(&self) -> &ServiceId {
        &self.id
    }

    async fn mount(&self, node: &MountNode) -> Result<(), ShellError> {
        let inbox = Arc::clone(&self.inbox);
        let id = self.scope.on(EventKind::message(TOPIC), move |event| {
            if let ShellEvent::Message { data, .. } = event
                && let Ok(mut inbox) = inbox.lock()
            {
                inbox.push(data.to_string());
            }
        });
        *self.listener.lock().map_err(|_| self.fault("listener lock poisoned"))? = Some(id);
        info!(provider = self.scope.label(), %node, "chat rendered");
        Ok(())
    }

    async fn unmount(&self, node: &MountNode) -> Result<(), ShellError> {
        let id = self
            .listener
            .lock()
            .map_err(|_| self.fault("listener lock poisoned"))?
            .take();
        if let Some(id) = id {
            self.scope.events().off(id);
        }
        info!(provider = self.scope.label(), %node, "chat removed");
        Ok(())
    }
}
