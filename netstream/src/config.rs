//! Construction-time configuration for servers and clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which address families resolution may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpVersion {
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
    /// Either family, IPv4 candidates first.
    Any,
}

impl IpVersion {
    /// Returns `true` if an address of this family is acceptable.
    #[must_use]
    pub fn admits(self, addr: &std::net::SocketAddr) -> bool {
        match self {
            Self::V4 => addr.is_ipv4(),
            Self::V6 => addr.is_ipv6(),
            Self::Any => true,
        }
    }
}

/// Configuration passed to [`TcpServer`], [`UdpServer`], [`TcpClient`] and
/// [`UdpClient`] at construction.
///
/// Every stream produced by a server or client inherits its timeouts.
///
/// [`TcpServer`]: crate::TcpServer
/// [`UdpServer`]: crate::UdpServer
/// [`TcpClient`]: crate::TcpClient
/// [`UdpClient`]: crate::UdpClient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of pending connections on a TCP listener.
    pub backlog: i32,
    /// Budget for flushing the whole send buffer.
    pub send_timeout: Duration,
    /// Budget for a single receive call.
    pub recv_timeout: Duration,
    /// Address families considered during resolution.
    pub ip_version: IpVersion,
    /// Install a no-op [`INTERRUPT_SIGNAL`] handler so the signal interrupts
    /// a blocked `accept()` instead of terminating the process.
    ///
    /// [`INTERRUPT_SIGNAL`]: crate::INTERRUPT_SIGNAL
    pub interrupt_handler: bool,
}

/// Default listen backlog.
pub const DEFAULT_BACKLOG: i32 = 10;

/// Default send deadline.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(2);

/// Default receive deadline.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(1);

impl Default for Config {
    fn default() -> Self {
        Self {
            backlog: DEFAULT_BACKLOG,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            ip_version: IpVersion::V4,
            interrupt_handler: false,
        }
    }
}
