// Local address detection for client auto-discovery

use std::net::{IpAddr, Ipv4Addr};
use tokio::net::UdpSocket;

/// Public address used only to pick the outbound interface; nothing is sent
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// Best guess at the LAN address phones should use to reach this server.
///
/// A concrete bind host wins; for wildcard binds the address of the default
/// route's interface is used, falling back to loopback when there is no route.
pub async fn advertised_ip(bind_host: &str) -> IpAddr {
    if let Ok(ip) = bind_host.parse::<IpAddr>() {
        if !ip.is_unspecified() {
            return ip;
        }
    }

    match route_local_ip().await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!(error = %e, "Could not determine LAN address, advertising loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

async fn route_local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect(ROUTE_PROBE_ADDR).await?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_concrete_bind_host_is_advertised() {
        let ip = advertised_ip("192.168.1.20").await;
        assert_eq!(ip, "192.168.1.20".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_bind_resolves_to_concrete_address() {
        let ip = advertised_ip("0.0.0.0").await;
        assert!(!ip.is_unspecified());
    }

    #[tokio::test]
    async fn test_hostname_bind_still_resolves() {
        let ip = advertised_ip("localhost").await;
        assert!(!ip.is_unspecified());
    }
}
