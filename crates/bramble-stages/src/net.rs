//! Small network helpers

use std::net::UdpSocket;

/// Get this machine's local IP address (first non-loopback IPv4).
///
/// Connects a UDP socket to a public IP (nothing is sent) to discover the
/// outbound interface address. Used only for the endpoint summary.
pub fn local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    Some(addr.ip().to_string())
}
