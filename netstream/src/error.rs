//! Error taxonomy shared by every netstream operation.

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised by servers, clients and streams.
///
/// There is no receive timeout variant: a bounded `recv` returns whatever
/// arrived before its deadline, possibly nothing.
#[derive(Debug, Error)]
pub enum Error {
    /// The host/port pair produced no usable endpoint.
    #[error("failed to resolve {host}:{port}: {reason}")]
    Resolution {
        host: String,
        port: u16,
        reason: String,
    },
    /// Bind, listen or connect failed on every candidate endpoint.
    #[error("connection error: {0}")]
    Connection(io::Error),
    /// Accepting on, or waiting for, a listening socket failed.
    #[error("accept failed: {0}")]
    Accept(io::Error),
    /// OS-level write failure other than would-block.
    #[error("send failed: {0}")]
    Send(io::Error),
    /// OS-level read failure other than would-block.
    #[error("recv failed: {0}")]
    Recv(io::Error),
    /// The send buffer could not be flushed before the send deadline.
    #[error("timeout reached")]
    Timeout,
    /// A pop asked for more bytes than the receive buffer holds.
    #[error("tried to read {requested} bytes but only {available} are buffered")]
    Underrun { requested: usize, available: usize },
    /// A blocking accept was interrupted by a signal.
    #[error("interrupted system call")]
    Interrupted,
    /// A UDP stream has no peer to send to yet.
    #[error("no peer endpoint to send to")]
    NoPeer,
    /// A popped string was not valid UTF-8.
    #[error("invalid utf-8 in received string: {0}")]
    Utf8(#[from] FromUtf8Error),
    /// The interrupt handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
