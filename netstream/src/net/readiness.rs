//! Bounded wait for a socket to become readable.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

const SOCKET: Token = Token(0);

/// A private poll instance watching one descriptor for readability.
///
/// mio registrations are edge-triggered; the registration is re-armed before
/// every wait so data left unread by an earlier call is reported again.
pub(crate) struct Readiness {
    poll: Poll,
    events: Events,
    fd: RawFd,
}

impl Readiness {
    /// Registers `source` with a fresh poll instance.
    ///
    /// The descriptor must stay open for as long as the returned value is
    /// used; owners keep both in the same struct.
    pub(crate) fn new(source: &impl AsRawFd) -> io::Result<Self> {
        let poll = Poll::new()?;
        let fd = source.as_raw_fd();
        poll.registry()
            .register(&mut SourceFd(&fd), SOCKET, Interest::READABLE)?;
        Ok(Self {
            poll,
            events: Events::with_capacity(1),
            fd,
        })
    }

    /// Blocks until the descriptor is readable or `timeout` elapses.
    ///
    /// `None` waits indefinitely. A closed or errored socket counts as
    /// readable, since the next read will report it.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if a signal arrives while waiting.
    pub(crate) fn wait(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        self.poll
            .registry()
            .reregister(&mut SourceFd(&self.fd), SOCKET, Interest::READABLE)?;
        self.poll.poll(&mut self.events, timeout)?;
        Ok(self.events.iter().any(|event| {
            event.token() == SOCKET
                && (event.is_readable() || event.is_read_closed() || event.is_error())
        }))
    }
}

impl std::fmt::Debug for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readiness").field("fd", &self.fd).finish()
    }
}
