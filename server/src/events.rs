//! Async event dispatch
//!
//! Handlers are registered under an event name. Emitting an event spawns a
//! single task that awaits every handler for that name in registration
//! order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

/// Receives emitted events.
#[async_trait]
pub trait EventHandler<E>: Send + Sync {
    async fn handle(&self, event: &E);
}

/// Registry of named event handlers.
pub struct EventManager<E> {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: Send + Sync + 'static> EventManager<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Adds a handler for `name`, after any already registered.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: EventHandler<E> + 'static,
    {
        self.handlers
            .entry(name.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Dispatches `event` to the handlers registered for `name`.
    ///
    /// Returns `None` without spawning anything when no handler is
    /// registered. Must be called from within a tokio runtime.
    pub fn emit(&self, name: &str, event: E) -> Option<JoinHandle<()>> {
        let handlers = self.handlers.get(name)?.clone();
        Some(tokio::spawn(async move {
            for handler in &handlers {
                handler.handle(&event).await;
            }
        }))
    }
}

impl<E: Send + Sync + 'static> Default for EventManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventManager")
            .field("handlers", &counts)
            .finish()
    }
}
