//! In-memory transport for deterministic session tests.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::transport::RconTransport;

/// A scripted server.
///
/// Each queued reply becomes readable when the client flushes a request,
/// which mirrors one request followed by its response. Reads and writes can
/// be capped to a chunk size to exercise partial I/O. Once everything queued
/// has been read the stream reports end-of-file.
pub(crate) struct ScriptedTransport {
    incoming: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    read_chunk: usize,
    write_chunk: usize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            incoming: VecDeque::new(),
            replies: VecDeque::new(),
            written: Vec::new(),
            read_chunk: usize::MAX,
            write_chunk: usize::MAX,
        }
    }

    /// A transport with `bytes` readable before anything is written.
    pub(crate) fn preloaded(bytes: Vec<u8>) -> Self {
        let mut transport = Self::new();
        transport.incoming.extend(bytes);
        transport
    }

    /// Queue the bytes answering the next flushed request.
    pub(crate) fn reply(mut self, bytes: Vec<u8>) -> Self {
        self.replies.push_back(bytes);
        self
    }

    /// Deliver at most `size` bytes per read.
    pub(crate) fn read_chunk(mut self, size: usize) -> Self {
        self.read_chunk = size;
        self
    }

    /// Accept at most `size` bytes per write.
    pub(crate) fn write_chunk(mut self, size: usize) -> Self {
        self.write_chunk = size;
        self
    }

    /// Everything the client has written so far.
    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }
}

impl AsyncRead for ScriptedTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = this
            .incoming
            .len()
            .min(buf.remaining())
            .min(this.read_chunk);
        let chunk: Vec<u8> = this.incoming.drain(..n).collect();
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ScriptedTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let n = buf.len().min(this.write_chunk);
        this.written.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(reply) = this.replies.pop_front() {
            this.incoming.extend(reply);
        }
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl RconTransport for ScriptedTransport {
    fn has_pending_data(&self) -> io::Result<bool> {
        Ok(!self.incoming.is_empty())
    }
}
