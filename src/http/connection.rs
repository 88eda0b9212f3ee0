use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};

use crate::error::{DavError, DavResult};
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::{BodyLength, StatusCode};
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 1024;

/// Byte stream a connection can run on: a TCP socket, or an in-memory pipe
/// in tests.
pub trait Socket: AsyncRead + AsyncWrite + Unpin {}

impl<T: AsyncRead + AsyncWrite + Unpin> Socket for T {}

/// One client connection.
///
/// Owns the socket, the bytes read past the request head and the response
/// being written. A connection serves exactly one request and is then closed.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    writer: ResponseWriter,
    read_timeout: Duration,
}

impl<S: Socket> Connection<S> {
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            writer: ResponseWriter::new(),
            read_timeout,
        }
    }

    /// Reads and parses the request head.
    ///
    /// Gives up with [`DavError::MalformedRequest`] when the head is
    /// unparsable, the client hangs up, or nothing complete arrives within the
    /// read timeout.
    pub async fn read_request(&mut self) -> DavResult<Request> {
        let deadline = Instant::now() + self.read_timeout;
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(request);
                }
                Err(ParseError::Incomplete) => {}
                Err(ParseError::InvalidRequest) => {
                    return Err(DavError::MalformedRequest("invalid request line"));
                }
                Err(ParseError::HeadTooLarge) => {
                    return Err(DavError::MalformedRequest("request head too large"));
                }
            }

            self.buffer.reserve(READ_CHUNK);
            let n = match timeout_at(deadline, self.stream.read_buf(&mut self.buffer)).await {
                Ok(res) => res?,
                Err(_) => return Err(DavError::MalformedRequest("timed out reading request")),
            };
            if n == 0 {
                return Err(DavError::MalformedRequest("client closed connection"));
            }
        }
    }

    /// Fills `buf` with request body bytes.
    ///
    /// Returns how many bytes were stored. Less than `buf.len()` means the
    /// client hung up or stopped sending for longer than the read timeout.
    pub async fn read_body(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = self.drain_buffered(buf);
        let deadline = Instant::now() + self.read_timeout;

        while filled < buf.len() {
            match timeout_at(deadline, self.stream.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    tracing::debug!(filled, wanted = buf.len(), "body read timed out");
                    break;
                }
            }
        }
        Ok(filled)
    }

    fn drain_buffered(&mut self, buf: &mut [u8]) -> usize {
        let n = self.buffer.len().min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[..n]);
        self.buffer.advance(n);
        n
    }

    pub fn send_header(&mut self, name: &str, value: &str) {
        self.writer.set_header(name, value, false);
    }

    pub fn set_content_length(&mut self, length: BodyLength) {
        self.writer.set_content_length(length);
    }

    pub async fn send(
        &mut self,
        status: StatusCode,
        content_type: Option<&str>,
        content: &[u8],
    ) -> std::io::Result<()> {
        self.writer
            .send(&mut self.stream, status, content_type, content)
            .await
    }

    pub async fn send_content(&mut self, content: &[u8]) -> std::io::Result<()> {
        self.writer.send_content(&mut self.stream, content).await
    }

    /// Terminates the response and shuts the socket down.
    pub async fn close(mut self) -> std::io::Result<()> {
        self.writer.finish(&mut self.stream).await?;
        self.stream.shutdown().await
    }
}
