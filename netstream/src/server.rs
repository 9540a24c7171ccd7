//! Servers: bound sockets that produce streams.

use std::io::ErrorKind;
use std::net::{TcpListener as StdTcpListener, UdpSocket as StdUdpSocket};
use std::sync::Arc;
use std::time::Duration;

use mio::net::{TcpListener, UdpSocket};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::net::readiness::Readiness;
use crate::net::socket::{self, Established};
use crate::net::{Endpoint, Protocol};
use crate::signal;
use crate::stream::{TcpStream, UdpStream};
use crate::trace::{info, warn};

/// Listening TCP socket that hands out one owning [`TcpStream`] per
/// accepted connection.
///
/// The listening socket itself is never given away and is closed when the
/// server is dropped. Streams already accepted stay usable.
#[derive(Debug)]
pub struct TcpServer {
    listener: TcpListener,
    readiness: Readiness,
    local: Endpoint,
    config: Config,
}

impl TcpServer {
    /// Listens on `port` with the default [`Config`].
    ///
    /// # Errors
    ///
    /// See [`TcpServer::bind`].
    pub fn new(port: u16) -> Result<Self> {
        Self::bind(port, Config::default())
    }

    /// Listens on `port` on every wildcard address admitted by
    /// `config.ip_version`. Port 0 picks an ephemeral port, see
    /// [`TcpServer::local_addr`].
    ///
    /// # Errors
    ///
    /// - [`Error::Signal`] if the interrupt handler cannot be installed.
    /// - [`Error::Connection`] if no candidate address could be bound.
    pub fn bind(port: u16, config: Config) -> Result<Self> {
        if config.interrupt_handler {
            signal::install_interrupt_handler()?;
        }

        let Established { fd, .. } = socket::listen(port, Protocol::Tcp, &config)?;
        let listener = TcpListener::from_std(StdTcpListener::from(fd));
        let local = listener
            .local_addr()
            .map(|addr| Endpoint::new(addr, Protocol::Tcp))
            .map_err(Error::Connection)?;
        let readiness = Readiness::new(&listener).map_err(Error::Connection)?;

        info!(local = %local, backlog = config.backlog, "TCP server listening");
        Ok(Self {
            listener,
            readiness,
            local,
            config,
        })
    }

    /// The bound address.
    #[must_use]
    pub const fn local_addr(&self) -> Endpoint {
        self.local
    }

    /// Blocks until a client connects and returns a stream owning the new
    /// connection.
    ///
    /// # Errors
    ///
    /// - [`Error::Interrupted`] if a signal arrives while waiting (see
    ///   [`Config::interrupt_handler`]).
    /// - [`Error::Accept`] on any other OS failure.
    pub fn accept(&mut self) -> Result<TcpStream> {
        loop {
            match self.listener.accept() {
                Ok((socket, _)) => {
                    let stream = TcpStream::new(socket, &self.config)?;
                    info!(peer = ?stream.peer().ok(), "accepted connection");
                    return Ok(stream);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => return Err(interrupted()),
                Err(e) => return Err(Error::Accept(e)),
            }

            match self.readiness.wait(None) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => return Err(interrupted()),
                Err(e) => return Err(Error::Accept(e)),
            }
        }
    }

    /// Waits up to `timeout` for a pending connection, so that a following
    /// [`TcpServer::accept`] returns without blocking.
    ///
    /// # Errors
    ///
    /// Same as [`TcpServer::accept`].
    pub fn select(&mut self, timeout: Duration) -> Result<bool> {
        match self.readiness.wait(Some(timeout)) {
            Ok(ready) => Ok(ready),
            Err(e) if e.kind() == ErrorKind::Interrupted => Err(interrupted()),
            Err(e) => Err(Error::Accept(e)),
        }
    }
}

fn interrupted() -> Error {
    warn!("accept interrupted by signal");
    Error::Interrupted
}

/// Bound UDP socket shared by every stream it hands out.
///
/// Streams from [`UdpServer::get_stream`] do not take the socket away from
/// the server; any number of them may be requested.
#[derive(Debug)]
pub struct UdpServer {
    socket: Arc<UdpSocket>,
    readiness: Readiness,
    local: Endpoint,
    config: Config,
}

impl UdpServer {
    /// Binds `port` with the default [`Config`].
    ///
    /// # Errors
    ///
    /// See [`UdpServer::bind`].
    pub fn new(port: u16) -> Result<Self> {
        Self::bind(port, Config::default())
    }

    /// Binds `port` on the first wildcard address admitted by
    /// `config.ip_version`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if no candidate address could be bound.
    pub fn bind(port: u16, config: Config) -> Result<Self> {
        let Established { fd, .. } = socket::listen(port, Protocol::Udp, &config)?;
        let socket = UdpSocket::from_std(StdUdpSocket::from(fd));
        let local = socket
            .local_addr()
            .map(|addr| Endpoint::new(addr, Protocol::Udp))
            .map_err(Error::Connection)?;
        let readiness = Readiness::new(&socket).map_err(Error::Connection)?;

        info!(local = %local, "UDP server bound");
        Ok(Self {
            socket: Arc::new(socket),
            readiness,
            local,
            config,
        })
    }

    /// The bound address.
    #[must_use]
    pub const fn local_addr(&self) -> Endpoint {
        self.local
    }

    /// Returns a stream reading from the shared socket.
    ///
    /// The stream replies to the source of the last datagram it received.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the stream's poll instance cannot be
    /// created.
    pub fn get_stream(&self) -> Result<UdpStream> {
        UdpStream::on_shared(Arc::clone(&self.socket), &self.config)
    }

    /// Waits up to `timeout` for a datagram to arrive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recv`] if the readiness wait fails.
    pub fn select(&mut self, timeout: Duration) -> Result<bool> {
        crate::stream::ready_or_interrupted(self.readiness.wait(Some(timeout)))
    }
}
