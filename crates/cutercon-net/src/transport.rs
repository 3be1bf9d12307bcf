//! Byte-stream transport used by the RCON session.
//!
//! [`RconTransport`] is any ordered, two-way byte stream that can also answer
//! "is more data readable right now?" without waiting. [`TcpStream`] is the
//! production implementation; tests substitute scripted in-memory streams.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::packet::{self, LENGTH_PREFIX_LEN, Packet};
use crate::platform;
use crate::session::RconError;

/// An ordered byte stream carrying RCON frames.
pub trait RconTransport: AsyncRead + AsyncWrite + Unpin + Send {
    /// Non-blocking check for bytes that can be read immediately.
    ///
    /// Must never wait. A closed stream reports `false`.
    fn has_pending_data(&self) -> io::Result<bool>;
}

impl RconTransport for TcpStream {
    fn has_pending_data(&self) -> io::Result<bool> {
        platform::bytes_available(self)
    }
}

/// Write a complete frame and flush it.
///
/// Returns only once every byte has been accepted by the transport.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> io::Result<()> {
    writer.write_all(frame).await?;
    writer.flush().await
}

/// Read one packet: the length prefix, then exactly that many bytes.
///
/// Short reads are accumulated until the frame is complete. A stream that
/// ends mid-frame yields [`RconError::Connection`].
pub async fn read_packet<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_frame_length: usize,
) -> Result<Packet, RconError> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    reader.read_exact(&mut prefix).await?;

    let length = packet::validate_length(packet::decode_header(prefix), max_frame_length)?;

    let mut frame = vec![0u8; length];
    reader.read_exact(&mut frame).await?;

    Ok(packet::decode_body(&frame)?)
}
