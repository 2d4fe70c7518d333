//! Console server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::{
    config::DEFAULT_CONSOLE_PORT,
    error::{RingLogError, Result},
};

/// Banner sent when a session opens
pub const DEFAULT_BANNER: &str = "\n  >> ringlog event log console <<\n\n";

/// Where the console listens and what it greets sessions with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Address to bind
    pub address: IpAddr,
    /// TCP port; 0 picks an ephemeral port
    pub port: u16,
    /// Text written when a session opens
    pub banner: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_CONSOLE_PORT,
            banner: DEFAULT_BANNER.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address
    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = address;
        self
    }

    /// Set the TCP port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the session banner
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.address.is_multicast() {
            return Err(RingLogError::invalid_parameter(
                "address",
                "Console cannot bind a multicast address",
            ));
        }
        Ok(())
    }
}
