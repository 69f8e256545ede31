// Network address discovery
// Finds the LAN address a phone on the same network should use

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-guess LAN address of this machine
///
/// Connecting a UDP socket only selects a route; no packet is sent. Falls back
/// to loopback when there is no route (offline machine, sandbox).
pub fn local_ip() -> IpAddr {
    discover_local_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn discover_local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
    Ok(socket.local_addr()?.ip())
}
