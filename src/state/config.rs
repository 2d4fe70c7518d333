//! Log store configuration

use crate::{
    config::{MAX_BUFFERS, MAX_EVENTS, RENDERER_CAPACITY},
    error::{RingLogError, Result},
};

/// Sizing of a [`LogStore`](super::LogStore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of entries in the buffer table
    pub max_buffers: usize,
    /// Upper bound on events per buffer; larger requests are clamped
    pub max_events: usize,
    /// Number of entries in the renderer registry
    pub renderer_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_buffers: MAX_BUFFERS,
            max_events: MAX_EVENTS,
            renderer_capacity: RENDERER_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer table size
    pub fn with_max_buffers(mut self, max_buffers: usize) -> Self {
        self.max_buffers = max_buffers;
        self
    }

    /// Set the per-buffer event bound
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Set the renderer registry size
    pub fn with_renderer_capacity(mut self, capacity: usize) -> Self {
        self.renderer_capacity = capacity;
        self
    }

    /// Clamp a requested buffer capacity: 0 or anything above the bound
    /// means the bound
    pub fn clamp_capacity(&self, requested: usize) -> usize {
        if requested == 0 || requested > self.max_events {
            self.max_events
        } else {
            requested
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_buffers == 0 {
            return Err(RingLogError::invalid_parameter(
                "max_buffers",
                "Buffer table cannot be empty",
            ));
        }

        if self.max_events == 0 {
            return Err(RingLogError::invalid_parameter(
                "max_events",
                "Buffers must hold at least one event",
            ));
        }

        // Built-in renderers take two entries
        if self.renderer_capacity < 2 {
            return Err(RingLogError::invalid_parameter(
                "renderer_capacity",
                "Registry must fit the built-in renderers",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_buffers, 5);
        assert_eq!(config.max_events, 128);
        assert_eq!(config.renderer_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_capacity() {
        let config = StoreConfig::new().with_max_events(16);
        assert_eq!(config.clamp_capacity(0), 16);
        assert_eq!(config.clamp_capacity(8), 8);
        assert_eq!(config.clamp_capacity(17), 16);
    }

    #[test]
    fn test_validate_rejects_empty_tables() {
        assert!(StoreConfig::new().with_max_buffers(0).validate().is_err());
        assert!(StoreConfig::new().with_max_events(0).validate().is_err());
        assert!(StoreConfig::new().with_renderer_capacity(1).validate().is_err());
    }
}
