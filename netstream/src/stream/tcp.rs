//! TCP stream: connected byte stream with bounded receive.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use minstant::Instant;
use mio::net::TcpStream as MioTcpStream;

use crate::buffer::Buffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::net::readiness::Readiness;
use crate::net::{Endpoint, Protocol};
use crate::trace::{debug, trace};

use super::{RECV_CHUNK, Stream, deadline_after, flush, ready_or_interrupted};

/// A buffered stream over one connected TCP socket.
///
/// The socket is closed exactly once, when the stream is dropped.
#[derive(Debug)]
pub struct TcpStream {
    socket: MioTcpStream,
    readiness: Readiness,
    buffer: Buffer,
    send_timeout: Duration,
    recv_timeout: Duration,
}

impl TcpStream {
    pub(crate) fn new(socket: MioTcpStream, config: &Config) -> Result<Self> {
        let readiness = Readiness::new(&socket).map_err(Error::Connection)?;
        Ok(Self {
            socket,
            readiness,
            buffer: Buffer::new(),
            send_timeout: config.send_timeout,
            recv_timeout: config.recv_timeout,
        })
    }

    /// Receives up to `requested` bytes, appending them to the receive buffer.
    ///
    /// Returns as soon as `requested` bytes arrived, the peer closed the
    /// connection, or the receive timeout elapsed. The return value counts
    /// only the bytes appended by this call and may be less than `requested`
    /// (including zero); that is not an error. Unread bytes from earlier
    /// calls are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recv`] on a socket error other than would-block.
    pub fn recv(&mut self, requested: usize) -> Result<usize> {
        let deadline = deadline_after(self.recv_timeout);
        let mut chunk = [0u8; RECV_CHUNK];
        let mut remaining = requested;
        let mut received = 0;

        while remaining > 0 {
            let want = remaining.min(RECV_CHUNK);
            match (&self.socket).read(&mut chunk[..want]) {
                Ok(0) => {
                    debug!(received, "peer closed connection");
                    break;
                }
                Ok(n) => {
                    trace!(n, "received bytes");
                    self.buffer.extend_received(&chunk[..n]);
                    remaining -= n;
                    received += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    let wait = match deadline {
                        Some(deadline) => {
                            let now = Instant::now();
                            if now >= deadline {
                                break;
                            }
                            Some(deadline - now)
                        }
                        None => None,
                    };
                    ready_or_interrupted(self.readiness.wait(wait))?;
                }
                Err(e) => return Err(Error::Recv(e)),
            }
        }
        Ok(received)
    }

    /// Address of the remote end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the socket is no longer connected.
    pub fn peer(&self) -> Result<Endpoint> {
        self.socket
            .peer_addr()
            .map(|addr| Endpoint::new(addr, Protocol::Tcp))
            .map_err(Error::Connection)
    }
}

impl Stream for TcpStream {
    fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn send(&mut self) -> Result<()> {
        let socket = &self.socket;
        flush(self.buffer.pending(), self.send_timeout, |chunk| {
            let mut writer = socket;
            writer.write(chunk)
        })?;
        self.buffer.clear_pending();
        Ok(())
    }

    fn select(&mut self, timeout: Duration) -> Result<bool> {
        ready_or_interrupted(self.readiness.wait(Some(timeout)))
    }
}
