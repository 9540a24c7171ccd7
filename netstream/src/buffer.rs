//! Send and receive byte buffers with a read cursor.
//!
//! The send side is append-only until a flush drains it. The receive side
//! grows as data arrives and is read through a cursor kept as an offset, so
//! appending (and the reallocation it may cause) never invalidates it.
//!
//! Nothing is cleared between receive calls: unread bytes accumulate until
//! the caller invokes [`Buffer::clear`].

use crate::error::{Error, Result};

/// The paired outbound/inbound buffers owned by one stream.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    send: Vec<u8>,
    recv: Vec<u8>,
    cursor: usize,
}

impl Buffer {
    /// Creates empty buffers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            send: Vec::new(),
            recv: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends bytes to the tail of the send buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.send.extend_from_slice(bytes);
    }

    /// Advances the read cursor by `n` and returns the bytes passed over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underrun`] if fewer than `n` unread bytes are buffered.
    /// The cursor does not move in that case.
    pub fn consume(&mut self, n: usize) -> Result<&[u8]> {
        let available = self.size();
        if available < n {
            return Err(Error::Underrun {
                requested: n,
                available,
            });
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.recv[start..self.cursor])
    }

    /// Consumes bytes up to the next zero byte, or to the end of the buffer.
    ///
    /// The zero byte is consumed when present but not returned.
    pub fn consume_until_nul(&mut self) -> &[u8] {
        let start = self.cursor;
        let unread = &self.recv[start..];
        match unread.iter().position(|&b| b == 0) {
            Some(nul) => {
                self.cursor += nul + 1;
                &self.recv[start..start + nul]
            }
            None => {
                self.cursor = self.recv.len();
                &self.recv[start..]
            }
        }
    }

    /// Returns the unread part of the receive buffer without consuming it.
    #[must_use]
    pub fn unread(&self) -> &[u8] {
        &self.recv[self.cursor..]
    }

    /// Empties both buffers and rewinds the cursor.
    pub fn clear(&mut self) {
        self.send.clear();
        self.recv.clear();
        self.cursor = 0;
    }

    /// Number of unread bytes in the receive buffer.
    #[must_use]
    pub fn size(&self) -> usize {
        self.recv.len() - self.cursor
    }

    /// Returns `true` when no unread bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Bytes pushed but not yet flushed.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.send
    }

    pub(crate) fn clear_pending(&mut self) {
        self.send.clear();
    }

    pub(crate) fn extend_received(&mut self, bytes: &[u8]) {
        self.recv.extend_from_slice(bytes);
    }
}
