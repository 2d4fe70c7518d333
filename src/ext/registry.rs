//! Extended event renderer registry
//!
//! Maps event-type ids to renderers. Built-in kinds are installed when the
//! owning store initializes; custom renderers get ids from a counter that
//! only ever grows, so an id is never handed out twice for the lifetime of
//! the registry.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RingLogError, Result};

use super::{
    renderer::{RenderFn, Renderer, RendererRef},
    types::EventType,
};

/// One registered renderer
#[derive(Debug, Clone)]
pub struct RendererEntry {
    /// Assigned id
    pub event_type: EventType,
    /// Renderer invoked for payloads of this type
    pub renderer: RendererRef,
}

#[derive(Debug)]
struct RegistryTable {
    initialized: bool,
    entries: Vec<RendererEntry>,
    next_dynamic: EventType,
}

/// Fixed-capacity table of (event type, renderer) pairs
#[derive(Debug)]
pub struct RendererRegistry {
    table: RwLock<RegistryTable>,
    capacity: usize,
}

impl RendererRegistry {
    /// Create an uninitialized registry holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            table: RwLock::new(RegistryTable {
                initialized: false,
                entries: Vec::with_capacity(capacity),
                next_dynamic: EventType::FIRST_DYNAMIC,
            }),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the built-in renderers; a second call is a no-op
    pub fn install_builtins(&self) {
        let mut table = self.write();
        if table.initialized {
            return;
        }
        for (event_type, renderer) in [
            (EventType::HEXDUMP, RendererRef::HexDump),
            (EventType::BACKTRACE, RendererRef::Backtrace),
        ] {
            if !table.entries.iter().any(|e| e.event_type == event_type) {
                table.entries.push(RendererEntry {
                    event_type,
                    renderer,
                });
            }
        }
        table.initialized = true;
    }

    /// Whether the built-ins have been installed
    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    /// Register a renderer and return its id
    ///
    /// Registering a renderer that is already present returns the id it
    /// was given the first time.
    pub fn register(&self, renderer: RendererRef) -> Result<EventType> {
        let mut table = self.write();
        if !table.initialized {
            return Err(RingLogError::NotInitialized);
        }

        if let Some(existing) = table
            .entries
            .iter()
            .find(|entry| entry.renderer.same_as(&renderer))
        {
            return Ok(existing.event_type);
        }

        if table.entries.len() >= self.capacity {
            return Err(RingLogError::RegistryFull {
                capacity: self.capacity,
            });
        }

        let event_type = table.next_dynamic;
        table.next_dynamic = event_type.next();
        log::debug!("registered {} renderer as {}", renderer.name(), event_type);
        table.entries.push(RendererEntry {
            event_type,
            renderer,
        });
        Ok(event_type)
    }

    /// Register a plain function renderer under `name`
    ///
    /// The name is the registration key: registering the same name again
    /// returns the first id, whatever function is passed.
    pub fn register_fn(&self, name: &'static str, renderer: RenderFn) -> Result<EventType> {
        self.register(RendererRef::function(name, renderer))
    }

    /// Register a shared trait-object renderer
    pub fn register_renderer(&self, renderer: Arc<dyn Renderer>) -> Result<EventType> {
        self.register(RendererRef::Shared(renderer))
    }

    /// Look up the renderer for `event_type`
    pub fn resolve(&self, event_type: EventType) -> Option<RendererRef> {
        let table = self.read();
        if !table.initialized {
            return None;
        }
        table
            .entries
            .iter()
            .find(|entry| entry.event_type == event_type)
            .map(|entry| entry.renderer.clone())
    }

    /// Whether `event_type` is a built-in or an already assigned dynamic id
    pub fn is_valid(&self, event_type: EventType) -> bool {
        if event_type.is_builtin() {
            return true;
        }
        event_type.is_dynamic() && event_type < self.read().next_dynamic
    }

    /// Snapshot of the registered entries
    pub fn entries(&self) -> Vec<RendererEntry> {
        self.read().entries.clone()
    }

    /// Number of registered entries, built-ins included
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
