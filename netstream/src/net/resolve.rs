//! Host/port resolution into ordered candidate endpoints.

use std::net::ToSocketAddrs;

use crate::config::IpVersion;
use crate::error::{Error, Result};

use super::{Endpoint, Protocol};

/// Resolves `host:port` into candidate endpoints, in resolver order.
///
/// Candidates of a family excluded by `ip_version` are dropped.
///
/// # Errors
///
/// Returns [`Error::Resolution`] if the lookup fails or leaves no candidate.
pub fn resolve(
    host: &str,
    port: u16,
    protocol: Protocol,
    ip_version: IpVersion,
) -> Result<Vec<Endpoint>> {
    let resolution = |reason: String| Error::Resolution {
        host: host.to_owned(),
        port,
        reason,
    };

    let candidates: Vec<Endpoint> = (host, port)
        .to_socket_addrs()
        .map_err(|e| resolution(e.to_string()))?
        .filter(|addr| ip_version.admits(addr))
        .map(|addr| Endpoint::new(addr, protocol))
        .collect();

    if candidates.is_empty() {
        return Err(resolution(format!("no {ip_version:?} address")));
    }
    Ok(candidates)
}

/// Wildcard endpoints a server binds to on `port`.
#[must_use]
pub fn passive(port: u16, protocol: Protocol, ip_version: IpVersion) -> Vec<Endpoint> {
    match ip_version {
        IpVersion::V4 => vec![Endpoint::any_v4(port, protocol)],
        IpVersion::V6 => vec![Endpoint::any_v6(port, protocol)],
        IpVersion::Any => vec![
            Endpoint::any_v4(port, protocol),
            Endpoint::any_v6(port, protocol),
        ],
    }
}
