use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use super::error::EmitterError;

/// Outbound datagram channel. One call is one datagram; no delivery feedback.
pub trait Transport {
    async fn send(&mut self, payload: &[u8]) -> std::io::Result<usize>;
}

// ═══════════════════════════════════════════════════════════════
//  UDP
// ═══════════════════════════════════════════════════════════════

/// Unconnected UDP socket on an ephemeral local port, sending to a fixed target.
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Resolves `host:port` once and binds the wildcard address of the same family.
    pub async fn open(host: &str, port: u16) -> Result<Self, EmitterError> {
        let target_str = format!("{host}:{port}");
        let target = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| EmitterError::Resolve {
                target: target_str.clone(),
                source,
            })?
            .next()
            .ok_or(EmitterError::NoAddress(target_str))?;
        Self::bind(target).await
    }

    pub async fn bind(target: SocketAddr) -> Result<Self, EmitterError> {
        let local = match target {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| EmitterError::SocketAcquisition { local, source })?;
        if let Ok(addr) = socket.local_addr() {
            tracing::debug!(local = %addr, dest = %target, "udp socket bound");
        }
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    async fn send(&mut self, payload: &[u8]) -> std::io::Result<usize> {
        self.socket.send_to(payload, self.target).await
    }
}
