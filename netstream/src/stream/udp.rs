//! UDP stream: datagrams to and from one peer.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use mio::net::UdpSocket as MioUdpSocket;

use crate::buffer::Buffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::net::readiness::Readiness;
use crate::net::{Endpoint, Protocol};
use crate::trace::trace;

use super::{RECV_CHUNK, Stream, deadline_after, flush, ready_or_interrupted};

/// Where a UDP stream sends to.
#[derive(Debug, Clone, Copy)]
enum Peer {
    /// Resolved at client construction; never changes.
    Fixed(Endpoint),
    /// Taken from the source of the most recent datagram (server side).
    Learned(Option<Endpoint>),
}

/// A buffered stream over a UDP socket.
///
/// Client streams own their socket outright. Server streams share the
/// server's bound socket, which stays open until the server and all of its
/// streams are dropped. Delivery is unreliable: a lost datagram is simply
/// never received.
#[derive(Debug)]
pub struct UdpStream {
    socket: Arc<MioUdpSocket>,
    readiness: Readiness,
    peer: Peer,
    buffer: Buffer,
    send_timeout: Duration,
    recv_timeout: Duration,
}

impl UdpStream {
    fn new(socket: Arc<MioUdpSocket>, peer: Peer, config: &Config) -> Result<Self> {
        let readiness = Readiness::new(&*socket).map_err(Error::Connection)?;
        Ok(Self {
            socket,
            readiness,
            peer,
            buffer: Buffer::new(),
            send_timeout: config.send_timeout,
            recv_timeout: config.recv_timeout,
        })
    }

    /// Stream that always sends to `peer`.
    pub(crate) fn with_peer(socket: MioUdpSocket, peer: Endpoint, config: &Config) -> Result<Self> {
        Self::new(Arc::new(socket), Peer::Fixed(peer), config)
    }

    /// Stream on a shared server socket that replies to whoever wrote last.
    pub(crate) fn on_shared(socket: Arc<MioUdpSocket>, config: &Config) -> Result<Self> {
        Self::new(socket, Peer::Learned(None), config)
    }

    /// Waits up to the receive timeout for one datagram and appends at most
    /// [`RECV_CHUNK`] bytes of it to the receive buffer.
    ///
    /// Returns the number of bytes appended; zero if nothing arrived in time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recv`] on a socket error other than would-block.
    pub fn recv(&mut self) -> Result<usize> {
        let wait = deadline_after(self.recv_timeout).map(|_| self.recv_timeout);
        if !ready_or_interrupted(self.readiness.wait(wait))? {
            return Ok(0);
        }

        let mut chunk = [0u8; RECV_CHUNK];
        match self.socket.recv_from(&mut chunk) {
            Ok((n, from)) => {
                trace!(n, from = %from, "received datagram");
                self.buffer.extend_received(&chunk[..n]);
                if let Peer::Learned(peer) = &mut self.peer {
                    *peer = Some(Endpoint::new(from, Protocol::Udp));
                }
                Ok(n)
            }
            // Another stream on the same socket took the datagram first.
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(0),
            Err(e) => Err(Error::Recv(e)),
        }
    }

    /// The endpoint [`Stream::send`] writes to, if known yet.
    #[must_use]
    pub const fn peer(&self) -> Option<Endpoint> {
        match self.peer {
            Peer::Fixed(peer) => Some(peer),
            Peer::Learned(peer) => peer,
        }
    }
}

impl Stream for UdpStream {
    fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// Sends the buffer to the peer, one datagram per write.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`Stream::send`], returns
    /// [`Error::NoPeer`] on a server stream that has not received anything.
    fn send(&mut self) -> Result<()> {
        let dest = self.peer().ok_or(Error::NoPeer)?.as_socket_addr();
        let socket = &self.socket;
        flush(self.buffer.pending(), self.send_timeout, |chunk| {
            socket.send_to(chunk, dest)
        })?;
        self.buffer.clear_pending();
        Ok(())
    }

    fn select(&mut self, timeout: Duration) -> Result<bool> {
        ready_or_interrupted(self.readiness.wait(Some(timeout)))
    }
}
