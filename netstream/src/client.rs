//! Clients: resolve, open one socket, and turn it into a stream.
//!
//! A client holds its socket only until the stream is requested. The
//! conversion consumes the client, so the socket (and, for UDP, the peer
//! endpoint) has exactly one owner at every point.

use std::net::{TcpStream as StdTcpStream, UdpSocket as StdUdpSocket};

use mio::net::{TcpStream as MioTcpStream, UdpSocket as MioUdpSocket};

use crate::config::Config;
use crate::error::Result;
use crate::net::socket::{self, Established};
use crate::net::{Endpoint, Protocol};
use crate::stream::{TcpStream, UdpStream};

/// A TCP connection waiting to be turned into a [`TcpStream`].
#[derive(Debug)]
pub struct TcpClient {
    socket: MioTcpStream,
    peer: Endpoint,
    config: Config,
}

impl TcpClient {
    /// Connects to `host:port` with the default [`Config`].
    ///
    /// # Errors
    ///
    /// See [`TcpClient::with_config`].
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_config(host, port, Config::default())
    }

    /// Resolves `host:port` and connects to the first reachable candidate.
    ///
    /// # Errors
    ///
    /// - [`Error::Resolution`] if no candidate address exists.
    /// - [`Error::Connection`] if every candidate refused.
    ///
    /// [`Error::Resolution`]: crate::Error::Resolution
    /// [`Error::Connection`]: crate::Error::Connection
    pub fn with_config(host: &str, port: u16, config: Config) -> Result<Self> {
        let Established { fd, endpoint } = socket::connect(host, port, Protocol::Tcp, &config)?;
        Ok(Self {
            socket: MioTcpStream::from_std(StdTcpStream::from(fd)),
            peer: endpoint,
            config,
        })
    }

    /// The endpoint the connection was made to.
    #[must_use]
    pub const fn peer(&self) -> Endpoint {
        self.peer
    }

    /// Hands the connection to a new stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the stream's poll instance cannot be
    /// created; the socket is closed in that case.
    ///
    /// [`Error::Connection`]: crate::Error::Connection
    pub fn connect(self) -> Result<TcpStream> {
        TcpStream::new(self.socket, &self.config)
    }
}

/// An unconnected UDP socket paired with the peer it will send to.
#[derive(Debug)]
pub struct UdpClient {
    socket: MioUdpSocket,
    peer: Endpoint,
    config: Config,
}

impl UdpClient {
    /// Prepares a socket towards `host:port` with the default [`Config`].
    ///
    /// # Errors
    ///
    /// See [`UdpClient::with_config`].
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_config(host, port, Config::default())
    }

    /// Resolves `host:port` and opens a socket for the first candidate whose
    /// family is usable. No packet is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::Resolution`] if no candidate address exists.
    /// - [`Error::Connection`] if no socket could be created.
    ///
    /// [`Error::Resolution`]: crate::Error::Resolution
    /// [`Error::Connection`]: crate::Error::Connection
    pub fn with_config(host: &str, port: u16, config: Config) -> Result<Self> {
        let Established { fd, endpoint } = socket::connect(host, port, Protocol::Udp, &config)?;
        Ok(Self {
            socket: MioUdpSocket::from_std(StdUdpSocket::from(fd)),
            peer: endpoint,
            config,
        })
    }

    /// The endpoint datagrams will be sent to.
    #[must_use]
    pub const fn peer(&self) -> Endpoint {
        self.peer
    }

    /// Hands the socket and peer endpoint to a new stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the stream's poll instance cannot be
    /// created.
    ///
    /// [`Error::Connection`]: crate::Error::Connection
    pub fn get_stream(self) -> Result<UdpStream> {
        UdpStream::with_peer(self.socket, self.peer, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::server::TcpServer;

    #[test]
    fn tcp_client_remembers_peer() {
        let server = TcpServer::new(0).unwrap();
        let port = server.local_addr().port();
        let client = TcpClient::new("127.0.0.1", port).unwrap();
        assert_eq!(client.peer().port(), port);
        assert!(client.connect().is_ok());
    }

    #[test]
    fn tcp_client_without_server_fails() {
        let port = TcpServer::new(0).unwrap().local_addr().port();
        let err = TcpClient::new("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn udp_client_stream_keeps_peer() {
        let client = UdpClient::new("127.0.0.1", 4242).unwrap();
        let peer = client.peer();
        let stream = client.get_stream().unwrap();
        assert_eq!(stream.peer(), Some(peer));
    }
}
