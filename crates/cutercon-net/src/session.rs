//! RCON session: connection lifecycle, login, and command execution.
//!
//! Tracks the state machine for one connection: Disconnected → Connected →
//! Authenticated → Disconnected. The protocol is strictly one request at a
//! time, and every operation that touches the transport takes `&mut self`,
//! so a session can never have two requests in flight.

use std::fmt;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::packet::{self, FrameError, PacketType};
use crate::platform::{self, SocketConfig};
use crate::transport::{self, RconTransport};

/// Default RCON port.
pub const DEFAULT_PORT: u16 = 25575;

/// Default upper bound on a single frame, in bytes.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1_048_576;

/// Lifecycle state of a [`RconSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport is open.
    Disconnected,
    /// A transport is open but commands are not accepted: login has not
    /// succeeded yet, it failed, or the last exchange broke off.
    Connected,
    /// Login succeeded; commands may be sent.
    Authenticated,
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum RconError {
    /// The transport could not be opened, or failed mid-operation.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The server answered the login with the failure request id.
    #[error("authentication failed: wrong password")]
    Authentication,

    /// A received frame was malformed; the stream position can no longer be trusted.
    #[error("framing error: {0}")]
    Framing(#[source] FrameError),

    /// A received body was not valid UTF-8.
    #[error("decoding error: {0}")]
    Decoding(#[source] std::string::FromUtf8Error),

    /// An outgoing request could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[source] FrameError),

    /// The operation requires an authenticated session.
    #[error("session is not authenticated")]
    NotConnected,
}

impl From<FrameError> for RconError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::InvalidUtf8(e) => Self::Decoding(e),
            other => Self::Framing(other),
        }
    }
}

/// Connection parameters, fixed for the lifetime of a session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Server host name or IP address.
    pub host: String,
    /// Server RCON port.
    pub port: u16,
    /// RCON password.
    pub password: String,
    /// Upper bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Largest frame accepted or sent, counted after the length prefix.
    pub max_frame_length: usize,
    /// Socket options applied after connecting.
    pub socket: SocketConfig,
}

impl SessionConfig {
    /// Parameters for `host` on the default port, with default limits.
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            password: password.into(),
            connect_timeout: Duration::from_secs(10),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            socket: SocketConfig::default(),
        }
    }

    /// Replace the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port`, as passed to the resolver.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("max_frame_length", &self.max_frame_length)
            .field("socket", &self.socket)
            .finish()
    }
}

/// A client session with one RCON server.
///
/// Owns its transport exclusively. Dropping the session closes the transport,
/// so the connection is released on every exit path.
pub struct RconSession<T = TcpStream> {
    config: SessionConfig,
    transport: Option<T>,
    state: SessionState,
}

impl RconSession<TcpStream> {
    /// Open a TCP connection to the configured server and log in.
    ///
    /// Any previous connection is closed first. If the connection cannot be
    /// established the session stays [`SessionState::Disconnected`]. If the
    /// password is rejected the session stays [`SessionState::Connected`]
    /// and should be disconnected before retrying.
    pub async fn connect(&mut self) -> Result<(), RconError> {
        self.disconnect();

        let address = self.config.address();
        tracing::debug!("Connecting to {address}");

        let connecting = TcpStream::connect(address.as_str());
        let stream = tokio::time::timeout(self.config.connect_timeout, connecting)
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connecting to {address} timed out"),
                )
            })??;
        platform::configure_stream(&stream, &self.config.socket)?;

        self.authenticate(stream).await
    }
}

impl<T: RconTransport> RconSession<T> {
    /// Create a disconnected session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            transport: None,
            state: SessionState::Disconnected,
        }
    }

    /// The connection parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether commands may be sent.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// The open transport, if any.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Log in over an already-open transport.
    ///
    /// Takes ownership of `transport`, replacing any previous one. Same
    /// outcomes as [`RconSession::connect`] from the login step onwards.
    pub async fn authenticate(&mut self, transport: T) -> Result<(), RconError> {
        self.disconnect();
        let transport = self.transport.insert(transport);
        self.state = SessionState::Connected;

        let frame = packet::encode_with_limit(
            PacketType::Login,
            &self.config.password,
            self.config.max_frame_length,
        )
        .map_err(RconError::Encoding)?;

        match exchange(transport, &frame, self.config.max_frame_length).await {
            Ok(_) => {
                self.state = SessionState::Authenticated;
                tracing::info!("Authenticated with {}", self.config.address());
                Ok(())
            }
            Err(RconError::Authentication) => {
                tracing::warn!("Server {} rejected the password", self.config.address());
                Err(RconError::Authentication)
            }
            Err(e) => Err(e),
        }
    }

    /// Run a command and return its complete output.
    ///
    /// Fails with [`RconError::NotConnected`] without writing anything unless
    /// the session is authenticated. On any other failure, or if this future
    /// is dropped before completing, the session drops back to
    /// [`SessionState::Connected`] because the stream may hold an unread
    /// remainder of the response; disconnect and reconnect to continue.
    pub async fn send_command(&mut self, command: &str) -> Result<String, RconError> {
        if self.state != SessionState::Authenticated {
            return Err(RconError::NotConnected);
        }
        let transport = self.transport.as_mut().ok_or(RconError::NotConnected)?;
        let frame = packet::encode_with_limit(
            PacketType::Command,
            command,
            self.config.max_frame_length,
        )
        .map_err(RconError::Encoding)?;

        // Restored only once the whole response has been consumed.
        self.state = SessionState::Connected;
        let output = exchange(transport, &frame, self.config.max_frame_length).await?;
        self.state = SessionState::Authenticated;

        Ok(output)
    }

    /// Close the transport if open. Idempotent and infallible.
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            tracing::info!("Disconnected from {}", self.config.address());
        }
        self.state = SessionState::Disconnected;
    }
}

impl<T> Drop for RconSession<T> {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            tracing::info!("Disconnecting from {}", self.config.address());
        }
    }
}

/// Send one request and collect its possibly fragmented response.
///
/// The server gives no continuation flag, so the response is considered
/// complete as soon as no further bytes are immediately readable. A final
/// fragment delayed in transit ends the response early; this is inherent to
/// the protocol.
async fn exchange<T: RconTransport>(
    transport: &mut T,
    frame: &[u8],
    max_frame_length: usize,
) -> Result<String, RconError> {
    transport::write_frame(transport, frame).await?;
    tracing::debug!(bytes = frame.len(), "Request sent");

    let mut response = String::new();
    let mut fragments = 0usize;
    loop {
        let packet = transport::read_packet(transport, max_frame_length).await?;
        if packet.is_auth_failure() {
            return Err(RconError::Authentication);
        }

        fragments += 1;
        tracing::trace!(
            packet_type = packet.packet_type,
            bytes = packet.body.len(),
            "Response packet received"
        );
        response.push_str(&packet.body);

        if !transport.has_pending_data()? {
            tracing::debug!(fragments, bytes = response.len(), "Response complete");
            return Ok(response);
        }
    }
}
