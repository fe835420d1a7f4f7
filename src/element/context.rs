//! Per-instance handle passed into implementation hooks.
//!
//! Hooks never see the [`Element`](super::Element) wrapper; they get its name
//! and a way to report structured errors to the application.

use crate::bus::{Bus, ErrorMessage, Message};
use std::sync::RwLock;

/// Instance name plus the optional application bus.
pub struct ElementContext {
    name: String,
    bus: RwLock<Option<Bus>>,
}

impl ElementContext {
    /// Context for the instance called `name`, with no bus attached.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus: RwLock::new(None),
        }
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach (or detach) the message bus.
    pub fn set_bus(&self, bus: Option<Bus>) {
        *self.bus.write().unwrap() = bus;
    }

    /// Check if a bus is attached.
    pub fn has_bus(&self) -> bool {
        self.bus.read().unwrap().is_some()
    }

    /// Log an error and post it on the bus.
    ///
    /// Without a bus the message is only logged.
    pub fn post_error(&self, mut message: ErrorMessage) {
        message.source = self.name.clone();
        tracing::error!(
            element = %self.name,
            domain = message.domain.name(),
            code = message.code,
            debug = %message.debug,
            "{}",
            message.message
        );
        self.post(Message::Error(message));
    }

    /// Log a warning and post it on the bus.
    pub fn post_warning(&self, mut message: ErrorMessage) {
        message.source = self.name.clone();
        tracing::warn!(
            element = %self.name,
            domain = message.domain.name(),
            code = message.code,
            debug = %message.debug,
            "{}",
            message.message
        );
        self.post(Message::Warning(message));
    }

    fn post(&self, message: Message) {
        let delivered = match self.bus.read().unwrap().as_ref() {
            Some(bus) => bus.post(message),
            None => return,
        };
        if !delivered {
            tracing::trace!(element = %self.name, "bus receiver gone, message dropped");
        }
    }
}

impl std::fmt::Debug for ElementContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementContext")
            .field("name", &self.name)
            .field("has_bus", &self.has_bus())
            .finish()
    }
}
