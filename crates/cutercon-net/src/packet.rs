//! RCON packet encoding and decoding.
//!
//! Every packet on the wire is a length-prefixed frame:
//!
//! ```text
//! +-----------------+-----------------+-----------------+-----------------+------------+
//! | length (4 B)    | request id (4 B)| type (4 B)      | body            | 0x00 0x00  |
//! | i32 little-end. | i32 little-end. | i32 little-end. | UTF-8 text      | terminator |
//! +-----------------+-----------------+-----------------+-----------------+------------+
//! ```
//!
//! The length counts everything after the length field itself, so it is
//! always `4 + 4 + body.len() + 2`. This module is pure: it never touches a
//! socket. See [`crate::transport`] for reading and writing frames.

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Size of the request id and type fields together.
pub const FIELDS_LEN: usize = 8;

/// Two zero bytes closing every packet.
pub const TERMINATOR: [u8; 2] = [0x00, 0x00];

/// Smallest valid frame length: request id, type and terminator with an empty body.
pub const MIN_FRAME_LENGTH: usize = FIELDS_LEN + TERMINATOR.len();

/// Request id sent with every outgoing packet.
pub const REQUEST_ID: i32 = 0;

/// Request id the server returns in place of ours when the password is wrong.
pub const AUTH_FAILURE_ID: i32 = -1;

/// Packet type codes.
///
/// The protocol reuses code `2` for an outgoing command and for the
/// incoming acknowledgement of a successful login ([`PacketType::AUTH_RESPONSE`]).
/// The session never branches on the incoming code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PacketType {
    /// Incoming output of a command. Commands may produce no output.
    CommandResponse = 0,
    /// Outgoing command to run, e.g. `time set 0`.
    Command = 2,
    /// Outgoing login carrying the RCON password.
    Login = 3,
}

impl PacketType {
    /// Incoming code acknowledging a successful login.
    pub const AUTH_RESPONSE: i32 = 2;

    /// Numeric code written to the wire.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Errors raised while building or parsing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The length prefix decoded to a negative value.
    #[error("frame length {0} is negative")]
    NegativeLength(i32),

    /// The frame cannot hold a request id, a type and a terminator.
    #[error("frame length {len} is below the minimum of {min}")]
    TooShort {
        /// The declared or supplied length.
        len: usize,
        /// [`MIN_FRAME_LENGTH`].
        min: usize,
    },

    /// The frame exceeds the configured maximum.
    #[error("frame length {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// The actual frame length.
        size: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The last two bytes of the frame were not `0x00 0x00`.
    #[error("incorrect packet terminator {0:02x?}")]
    BadTerminator([u8; 2]),

    /// The body is not valid UTF-8.
    #[error("packet body is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Correlation id echoed by the server; [`AUTH_FAILURE_ID`] on a failed login.
    pub request_id: i32,
    /// Raw type code. Advisory only, see [`PacketType`].
    pub packet_type: i32,
    /// Text payload.
    pub body: String,
}

impl Packet {
    /// Create a packet from its parts.
    pub fn new(request_id: i32, packet_type: i32, body: impl Into<String>) -> Self {
        Self {
            request_id,
            packet_type,
            body: body.into(),
        }
    }

    /// Whether the server rejected the login that this packet answers.
    pub fn is_auth_failure(&self) -> bool {
        self.request_id == AUTH_FAILURE_ID
    }

    /// Serialize to a complete frame, length prefix included.
    ///
    /// Unlike [`encode`], no size limit is applied; bodies longer than
    /// `i32::MAX` bytes are not representable and must not be passed.
    pub fn to_bytes(&self) -> Vec<u8> {
        build_frame(self.request_id, self.packet_type, self.body.as_bytes())
    }
}

/// Encode an outgoing request with the fixed [`REQUEST_ID`].
pub fn encode(packet_type: PacketType, payload: &str) -> Result<Vec<u8>, FrameError> {
    encode_with_limit(packet_type, payload, i32::MAX as usize)
}

/// Encode an outgoing request, rejecting frames longer than `max_frame_length`.
pub fn encode_with_limit(
    packet_type: PacketType,
    payload: &str,
    max_frame_length: usize,
) -> Result<Vec<u8>, FrameError> {
    let length = MIN_FRAME_LENGTH + payload.len();
    let max = max_frame_length.min(i32::MAX as usize);
    if length > max {
        return Err(FrameError::PayloadTooLarge { size: length, max });
    }

    Ok(build_frame(REQUEST_ID, packet_type.code(), payload.as_bytes()))
}

fn build_frame(request_id: i32, packet_type: i32, body: &[u8]) -> Vec<u8> {
    let length = MIN_FRAME_LENGTH + body.len();

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + length);
    frame.extend_from_slice(&(length as i32).to_le_bytes());
    frame.extend_from_slice(&request_id.to_le_bytes());
    frame.extend_from_slice(&packet_type.to_le_bytes());
    frame.extend_from_slice(body);
    frame.extend_from_slice(&TERMINATOR);
    frame
}

/// Interpret the 4-byte length prefix.
pub fn decode_header(bytes: [u8; LENGTH_PREFIX_LEN]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// Check a decoded length before any body bytes are read.
///
/// Returns the number of bytes that follow the prefix.
pub fn validate_length(length: i32, max_frame_length: usize) -> Result<usize, FrameError> {
    let len = usize::try_from(length).map_err(|_| FrameError::NegativeLength(length))?;
    if len < MIN_FRAME_LENGTH {
        return Err(FrameError::TooShort {
            len,
            min: MIN_FRAME_LENGTH,
        });
    }
    if len > max_frame_length {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: max_frame_length,
        });
    }
    Ok(len)
}

/// Decode the bytes following the length prefix.
///
/// The terminator is checked before the body is decoded as text.
pub fn decode_body(bytes: &[u8]) -> Result<Packet, FrameError> {
    if bytes.len() < MIN_FRAME_LENGTH {
        return Err(FrameError::TooShort {
            len: bytes.len(),
            min: MIN_FRAME_LENGTH,
        });
    }

    let end = bytes.len();
    let terminator = [bytes[end - 2], bytes[end - 1]];
    if terminator != TERMINATOR {
        return Err(FrameError::BadTerminator(terminator));
    }

    let body = String::from_utf8(bytes[FIELDS_LEN..end - 2].to_vec())
        .map_err(FrameError::InvalidUtf8)?;

    Ok(Packet {
        request_id: read_i32(&bytes[0..4]),
        packet_type: read_i32(&bytes[4..8]),
        body,
    })
}

fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
