//! Connection establishment over raw sockets.
//!
//! Walks the candidate endpoints in order and keeps the first one on which
//! every setup step succeeds. A candidate that fails at any step has its
//! socket closed (by dropping the [`OwnedFd`]) and the next candidate is
//! tried; the same candidate is never retried. The surviving socket is
//! switched to non-blocking mode before it is returned.

use std::io;
use std::os::fd::OwnedFd;

use rustix::net::sockopt;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::trace::{debug, info};

use super::{Endpoint, Protocol, resolve};

/// A socket that survived establishment, with the endpoint it used.
#[derive(Debug)]
pub(crate) struct Established {
    pub fd: OwnedFd,
    pub endpoint: Endpoint,
}

/// Binds a server socket on `port`.
///
/// TCP sockets additionally listen with the configured backlog.
pub(crate) fn listen(port: u16, protocol: Protocol, config: &Config) -> Result<Established> {
    let candidates = resolve::passive(port, protocol, config.ip_version);
    establish(candidates, |ep| {
        let fd = rustix::net::socket(ep.family(), ep.socket_type(), None)?;
        sockopt::set_socket_reuseaddr(&fd, true)?;
        rustix::net::bind(&fd, &ep.as_socket_addr())?;
        if protocol == Protocol::Tcp {
            rustix::net::listen(&fd, config.backlog)?;
        }
        Ok(fd)
    })
}

/// Opens a client socket towards `host:port`.
///
/// TCP sockets connect (blocking) before being made non-blocking. UDP
/// sockets are only created; the chosen endpoint becomes the stream's peer.
pub(crate) fn connect(
    host: &str,
    port: u16,
    protocol: Protocol,
    config: &Config,
) -> Result<Established> {
    let candidates = resolve::resolve(host, port, protocol, config.ip_version)?;
    establish(candidates, |ep| {
        let fd = rustix::net::socket(ep.family(), ep.socket_type(), None)?;
        if protocol == Protocol::Tcp {
            rustix::net::connect(&fd, &ep.as_socket_addr())?;
        }
        Ok(fd)
    })
}

fn establish(
    candidates: Vec<Endpoint>,
    mut attempt: impl FnMut(&Endpoint) -> io::Result<OwnedFd>,
) -> Result<Established> {
    let mut last_err = None;

    for endpoint in candidates {
        match attempt(&endpoint) {
            Ok(fd) => {
                rustix::io::ioctl_fionbio(&fd, true)
                    .map_err(|e| Error::Connection(e.into()))?;
                info!(endpoint = %endpoint, "socket established");
                return Ok(Established { fd, endpoint });
            }
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "candidate failed, trying next");
                last_err = Some(e);
            }
        }
    }

    Err(Error::Connection(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "no candidate endpoint")
    })))
}
