//! RCON client core: packet framing, password login, and reassembly of
//! command responses that the server splits across several packets.

pub mod packet;
pub mod platform;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use packet::{FrameError, Packet, PacketType, decode_body, decode_header, encode};
pub use platform::SocketConfig;
pub use session::{
    DEFAULT_MAX_FRAME_LENGTH, DEFAULT_PORT, RconError, RconSession, SessionConfig, SessionState,
};
pub use transport::{RconTransport, read_packet, write_frame};
