//! Resolved endpoint type.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use rustix::net::{AddressFamily, SocketType};

/// Transport protocol of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Connected byte stream.
    Tcp,
    /// Unconnected datagrams.
    Udp,
}

impl Protocol {
    /// Socket type used to open sockets of this protocol.
    #[must_use]
    pub const fn socket_type(self) -> SocketType {
        match self {
            Self::Tcp => SocketType::STREAM,
            Self::Udp => SocketType::DGRAM,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
        }
    }
}

/// One candidate end of a connection: address family, socket type, address
/// and port.
///
/// Endpoints are immutable and `Copy`, so a UDP stream can keep its peer for
/// as long as it lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    addr: SocketAddr,
    protocol: Protocol,
}

impl Endpoint {
    /// Creates an endpoint from a socket address.
    #[must_use]
    pub const fn new(addr: SocketAddr, protocol: Protocol) -> Self {
        Self { addr, protocol }
    }

    /// Wildcard IPv4 endpoint (`0.0.0.0`) on `port`.
    #[must_use]
    pub const fn any_v4(port: u16, protocol: Protocol) -> Self {
        Self::new(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            protocol,
        )
    }

    /// Wildcard IPv6 endpoint (`::`) on `port`.
    #[must_use]
    pub const fn any_v6(port: u16, protocol: Protocol) -> Self {
        Self::new(
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port),
            protocol,
        )
    }

    /// Address family to open the socket with.
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        match self.addr {
            SocketAddr::V4(_) => AddressFamily::INET,
            SocketAddr::V6(_) => AddressFamily::INET6,
        }
    }

    /// Socket type to open the socket with.
    #[must_use]
    pub const fn socket_type(&self) -> SocketType {
        self.protocol.socket_type()
    }

    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Returns the underlying [`SocketAddr`].
    #[must_use]
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(ep: Endpoint) -> Self {
        ep.addr
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.addr)
    }
}
