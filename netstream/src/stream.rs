//! Buffered streams over an established socket.
//!
//! A stream owns one send buffer, one receive buffer with its read cursor,
//! and its socket. Values are pushed into the send buffer, flushed with
//! [`Stream::send`], pulled in with the protocol-specific `recv`, and popped
//! back out through the cursor.
//!
//! Streams are only produced by servers and clients:
//!
//! | Producer | Stream |
//! |----------|--------|
//! | [`TcpServer::accept`], [`TcpClient::connect`] | [`TcpStream`] |
//! | [`UdpServer::get_stream`], [`UdpClient::get_stream`] | [`UdpStream`] |
//!
//! A stream is `Send` but must not be shared between threads.
//!
//! [`TcpServer::accept`]: crate::TcpServer::accept
//! [`TcpClient::connect`]: crate::TcpClient::connect
//! [`UdpServer::get_stream`]: crate::UdpServer::get_stream
//! [`UdpClient::get_stream`]: crate::UdpClient::get_stream

pub mod tcp;
pub mod udp;

use std::io::{self, ErrorKind};
use std::time::Duration;

use minstant::Instant;

use crate::buffer::Buffer;
use crate::codec::{Decode, Encode};
use crate::error::{Error, Result};
use crate::trace::warn;

pub use tcp::TcpStream;
pub use udp::UdpStream;

/// Largest number of bytes read from the socket in one call.
pub const RECV_CHUNK: usize = 1024;

/// Operations shared by TCP and UDP streams.
pub trait Stream {
    /// The stream's buffers.
    fn buffer(&self) -> &Buffer;

    /// The stream's buffers, mutably.
    fn buffer_mut(&mut self) -> &mut Buffer;

    /// Flushes the whole send buffer within the send timeout, then clears it.
    ///
    /// # Errors
    ///
    /// - [`Error::Send`] on a socket error other than would-block.
    /// - [`Error::Timeout`] if the deadline passes before the buffer drains.
    ///   Part of the buffer may already be on the wire.
    fn send(&mut self) -> Result<()>;

    /// Waits up to `timeout` for the socket to become readable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recv`] if the readiness wait itself fails.
    fn select(&mut self, timeout: Duration) -> Result<bool>;

    /// Encodes `value` onto the send buffer.
    fn push<T: Encode>(&mut self, value: T) -> &mut Self
    where
        Self: Sized,
    {
        value.encode(self.buffer_mut());
        self
    }

    /// Decodes one value at the read cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`] if fewer bytes are buffered than `T` needs.
    fn pop<T: Decode>(&mut self) -> Result<T>
    where
        Self: Sized,
    {
        T::decode(self.buffer_mut())
    }

    /// Decodes one value into `slot`, leaving it untouched on error.
    ///
    /// # Errors
    ///
    /// Same as [`Stream::pop`].
    fn pop_into<T: Decode>(&mut self, slot: &mut T) -> Result<()>
    where
        Self: Sized,
    {
        *slot = self.pop()?;
        Ok(())
    }

    /// Empties both buffers and rewinds the read cursor.
    fn clear(&mut self) {
        self.buffer_mut().clear();
    }

    /// Number of received bytes not yet popped.
    fn size(&self) -> usize {
        self.buffer().size()
    }

    /// Returns `true` when no received bytes remain unread.
    fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }
}

/// Deadline `timeout` from now; `None` when it lies beyond what an
/// [`Instant`] can represent, which callers treat as "no deadline".
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Writes all of `pending` through `write`, retrying on would-block until
/// `timeout` elapses.
///
/// A write that drains the buffer wins over an expired deadline.
pub(crate) fn flush(
    pending: &[u8],
    timeout: Duration,
    mut write: impl FnMut(&[u8]) -> io::Result<usize>,
) -> Result<()> {
    let deadline = deadline_after(timeout);
    let mut sent = 0;

    while sent < pending.len() {
        match write(&pending[sent..]) {
            Ok(0) => return Err(Error::Send(ErrorKind::WriteZero.into())),
            Ok(n) => sent += n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
            Err(e) => return Err(Error::Send(e)),
        }
        if sent < pending.len() && deadline.is_some_and(|d| Instant::now() > d) {
            warn!(sent, total = pending.len(), "send deadline reached");
            return Err(Error::Timeout);
        }
    }
    Ok(())
}

/// Classifies a readiness-wait error; signals count as "not ready".
pub(crate) fn ready_or_interrupted(result: io::Result<bool>) -> Result<bool> {
    match result {
        Ok(ready) => Ok(ready),
        Err(e) if e.kind() == ErrorKind::Interrupted => Ok(false),
        Err(e) => Err(Error::Recv(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_retries_partial_writes() {
        let mut wire = Vec::new();
        flush(b"abcdef", Duration::from_secs(1), |chunk| {
            let n = chunk.len().min(2);
            wire.extend_from_slice(&chunk[..n]);
            Ok(n)
        })
        .unwrap();
        assert_eq!(wire, b"abcdef");
    }

    #[test]
    fn flush_retries_would_block() {
        let mut blocked = 3;
        let mut wire = Vec::new();
        flush(b"xyz", Duration::from_secs(1), |chunk| {
            if blocked > 0 {
                blocked -= 1;
                return Err(ErrorKind::WouldBlock.into());
            }
            wire.extend_from_slice(chunk);
            Ok(chunk.len())
        })
        .unwrap();
        assert_eq!(wire, b"xyz");
    }

    #[test]
    fn flush_times_out_when_never_writable() {
        let err = flush(b"xyz", Duration::from_millis(5), |_| {
            Err(ErrorKind::WouldBlock.into())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[test]
    fn flush_surfaces_socket_errors() {
        let err = flush(b"xyz", Duration::from_secs(1), |_| {
            Err(ErrorKind::BrokenPipe.into())
        })
        .unwrap_err();
        match err {
            Error::Send(e) => assert_eq!(e.kind(), ErrorKind::BrokenPipe),
            other => panic!("expected send error, got {other:?}"),
        }
    }

    #[test]
    fn flush_with_unbounded_timeout_keeps_retrying() {
        let mut blocked = 3;
        let mut wire = Vec::new();
        flush(b"abc", Duration::MAX, |chunk| {
            if blocked > 0 {
                blocked -= 1;
                return Err(ErrorKind::WouldBlock.into());
            }
            wire.extend_from_slice(chunk);
            Ok(chunk.len())
        })
        .unwrap();
        assert_eq!(wire, b"abc");
    }

    #[test]
    fn huge_timeout_has_no_deadline() {
        assert!(deadline_after(Duration::MAX).is_none());
        assert!(deadline_after(Duration::from_secs(1)).is_some());
    }

    #[test]
    fn flush_of_nothing_is_ok() {
        flush(&[], Duration::ZERO, |_| unreachable!()).unwrap();
    }
}
