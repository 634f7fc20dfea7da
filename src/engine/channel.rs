// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Backpressured single-producer/single-consumer byte channel.
//!
//! Built on [`tokio::io::duplex`]: at most `capacity` bytes may be in flight,
//! so a writer can never get further ahead of its reader than that. The two
//! halves own their ends of the pipe:
//!
//! * dropping or closing the [`ByteWriter`] is seen by the reader as end-of-stream
//!   once buffered bytes are drained;
//! * dropping the [`ByteReader`] makes every later write fail with
//!   [`io::ErrorKind::BrokenPipe`].

use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context as TaskContext, Poll};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};

#[derive(Debug)]
struct Fault {
    kind: io::ErrorKind,
    message: String,
}

/// Create a connected reader/writer pair bounded to `capacity` in-flight bytes.
pub fn byte_channel(capacity: usize) -> (ByteReader, ByteWriter) {
    let (reader_end, writer_end) = tokio::io::duplex(capacity.max(1));
    let fault = Arc::new(OnceLock::new());
    (
        ByteReader {
            inner: reader_end,
            fault: fault.clone(),
        },
        ByteWriter {
            inner: writer_end,
            fault,
        },
    )
}

/// Consuming end of a byte channel.
#[derive(Debug)]
pub struct ByteReader {
    inner: DuplexStream,
    fault: Arc<OnceLock<Fault>>,
}

/// Producing end of a byte channel.
#[derive(Debug)]
pub struct ByteWriter {
    inner: DuplexStream,
    fault: Arc<OnceLock<Fault>>,
}

impl ByteWriter {
    /// Mark end-of-stream. The reader sees a normal EOF after draining.
    pub async fn close(&mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }

    /// End the stream with an error. The reader receives every byte written so
    /// far and then fails with an error of `kind` instead of reaching EOF.
    pub async fn close_with_error(
        &mut self,
        kind: io::ErrorKind,
        message: impl Into<String>,
    ) -> io::Result<()> {
        let _ = self.fault.set(Fault {
            kind,
            message: message.into(),
        });
        self.inner.shutdown().await
    }
}

impl AsyncRead for ByteReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let filled_before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) if buf.filled().len() == filled_before && buf.remaining() > 0 => {
                match this.fault.get() {
                    Some(fault) => Poll::Ready(Err(io::Error::new(fault.kind, fault.message.clone()))),
                    None => Poll::Ready(Ok(())),
                }
            }
            other => other,
        }
    }
}

impl AsyncWrite for ByteWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
