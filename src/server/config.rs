//! Relay server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port the relay listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 9002;

/// Relay server configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Enable TCP_NODELAY on accepted sockets
    pub tcp_nodelay: bool,

    /// Text records a session may hold before new ones are dropped
    pub outbound_capacity: usize,

    /// Longest a single socket write may take before the client is
    /// considered stalled and the session ends
    pub write_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            tcp_nodelay: true,
            outbound_capacity: 64,
            write_timeout: Duration::from_secs(5),
        }
    }
}

impl RelayConfig {
    /// Listen on all interfaces at `port`
    pub fn with_port(port: u16) -> Self {
        Self { bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)), ..Default::default() }
    }

    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self { bind_addr: addr, ..Default::default() }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Set the per-session outbound queue capacity (at least 1)
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }

    /// Set the socket write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}
