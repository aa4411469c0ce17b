use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, info};

use crate::error::SetupError;

const LISTEN_BACKLOG: u32 = 5;

/// Resolves `addr:port`, binds the first candidate that accepts it and starts
/// listening. Without an address, the IPv4 then the IPv6 wildcard is tried.
pub async fn bind(addr: Option<&str>, port: &str) -> Result<TcpListener, SetupError> {
    let display_addr = addr.unwrap_or("*");
    let resolve_error = |reason: String| SetupError::Resolve {
        addr: display_addr.to_string(),
        port: port.to_string(),
        reason,
    };

    let port_number: u16 = port
        .parse()
        .map_err(|_| resolve_error(format!("invalid port `{}`", port)))?;

    let candidates: Vec<SocketAddr> = match addr {
        Some(host) => tokio::net::lookup_host((host, port_number))
            .await
            .map_err(|e| resolve_error(e.to_string()))?
            .collect(),
        None => vec![
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, port_number)),
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, port_number)),
        ],
    };

    if candidates.is_empty() {
        return Err(resolve_error("no addresses found".into()));
    }

    let mut last_error = None;
    for candidate in candidates {
        let socket = match candidate {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        };
        let socket = match socket {
            Ok(socket) => socket,
            Err(e) => {
                debug!(addr = %candidate, error = %e, "Could not create socket");
                last_error = Some(e);
                continue;
            }
        };

        if cfg!(unix) {
            if let Err(e) = socket.set_reuseaddr(true) {
                debug!(addr = %candidate, error = %e, "Could not set SO_REUSEADDR");
            }
        }

        if let Err(e) = socket.bind(candidate) {
            debug!(addr = %candidate, error = %e, "Bind failed");
            last_error = Some(e);
            continue;
        }

        let listener = socket.listen(LISTEN_BACKLOG).map_err(SetupError::Listen)?;
        info!("Listening on {}", candidate);
        return Ok(listener);
    }

    Err(SetupError::Bind {
        addr: display_addr.to_string(),
        port: port.to_string(),
        source: last_error,
    })
}
