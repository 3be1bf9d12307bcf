//! Cross-platform TCP socket configuration for RCON connections.
//!
//! [`SocketConfig`] holds the socket options applied right after connecting.
//! [`bytes_available`] is the zero-wait readability probe the session uses to
//! decide whether a response continues in another packet.

use std::io;
use std::mem::MaybeUninit;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;

/// TCP socket options applied to every RCON connection.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketConfig {
    /// Disable Nagle's algorithm so small command frames go out at once. Default: true.
    pub tcp_nodelay: bool,
    /// Enable TCP keepalive. Default: true.
    pub keepalive_enabled: bool,
    /// Idle time before the first keepalive probe. Default: 60s.
    pub keepalive_idle: Duration,
    /// Keepalive probe interval. Default: 10s.
    pub keepalive_interval: Duration,
    /// Number of keepalive probes before declaring the connection dead. Default: 3.
    pub keepalive_retries: u32,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            tcp_nodelay: true,
            keepalive_enabled: true,
            keepalive_idle: Duration::from_secs(60),
            keepalive_interval: Duration::from_secs(10),
            keepalive_retries: 3,
        }
    }
}

/// Apply `config` to a freshly connected RCON stream.
pub fn configure_stream(stream: &TcpStream, config: &SocketConfig) -> io::Result<()> {
    stream.set_nodelay(config.tcp_nodelay)?;

    if config.keepalive_enabled {
        let probes = TcpKeepalive::new()
            .with_time(config.keepalive_idle)
            .with_interval(config.keepalive_interval);

        // No probe count on macOS.
        #[cfg(any(target_os = "linux", target_os = "windows"))]
        let probes = probes.with_retries(config.keepalive_retries);

        SockRef::from(stream).set_tcp_keepalive(&probes)?;
    }

    Ok(())
}

/// Report whether at least one byte can be read from `stream` right now.
///
/// Peeks the socket directly instead of going through tokio's cached
/// readiness, so bytes the reactor has not seen yet still count. The socket
/// is non-blocking, so the peek never waits. A closed peer reports `false`.
pub fn bytes_available(stream: &TcpStream) -> io::Result<bool> {
    let sock_ref = SockRef::from(stream);
    let mut probe = [MaybeUninit::<u8>::uninit(); 1];
    loop {
        match sock_ref.peek(&mut probe) {
            Ok(n) => return Ok(n > 0),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
