use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{BodyLength, ResponseHead, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

fn serialize_head(status: StatusCode, head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(CRLF);
    }

    // Header/body separator
    buf.extend_from_slice(CRLF);
    buf
}

/// Streams one response onto a connection.
///
/// Headers are queued with [`set_header`](Self::set_header) and go out with
/// the status line in [`send`](Self::send). After that the body is written
/// with [`send_content`](Self::send_content), framed according to the
/// configured [`BodyLength`]. [`finish`](Self::finish) closes a chunked body.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    head: ResponseHead,
    head_sent: bool,
    chunked: bool,
    terminated: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a header. `first` puts it ahead of everything queued so far.
    pub fn set_header(&mut self, name: &str, value: &str, first: bool) {
        if first {
            self.head.prepend(name, value);
        } else {
            self.head.push(name, value);
        }
    }

    pub fn set_content_length(&mut self, length: BodyLength) {
        self.head.length = length;
    }

    pub fn head_sent(&self) -> bool {
        self.head_sent
    }

    /// Writes the status line and headers, then `content` as the first part
    /// of the body.
    ///
    /// `content_type` is placed ahead of all queued headers. Without an
    /// explicit [`BodyLength`], `Content-Length` is the size of `content`.
    pub async fn send<W>(
        &mut self,
        stream: &mut W,
        status: StatusCode,
        content_type: Option<&str>,
        content: &[u8],
    ) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if self.head_sent {
            tracing::warn!(status = status.as_u16(), "response head already sent, ignoring");
            return Ok(());
        }

        if let Some(content_type) = content_type {
            self.set_header("Content-Type", content_type, true);
        }
        match self.head.length {
            BodyLength::NotSet => {
                self.set_header("Content-Length", &content.len().to_string(), false)
            }
            BodyLength::Fixed(len) => self.set_header("Content-Length", &len.to_string(), false),
            BodyLength::Unknown => {
                self.chunked = true;
                self.set_header("Accept-Ranges", "none", false);
                self.set_header("Transfer-Encoding", "chunked", false);
            }
        }
        self.set_header("Connection", "close", false);

        let buf = serialize_head(status, &self.head);
        stream.write_all(&buf).await?;
        self.head_sent = true;

        if !content.is_empty() {
            self.send_content(stream, content).await?;
        }
        Ok(())
    }

    /// Writes a piece of the body. In chunked mode every non-empty call is
    /// one chunk; empty calls are skipped so the body is never terminated
    /// early.
    pub async fn send_content<W>(&mut self, stream: &mut W, content: &[u8]) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if !self.chunked {
            return stream.write_all(content).await;
        }
        if content.is_empty() || self.terminated {
            return Ok(());
        }

        let size_line = format!("{:x}\r\n", content.len());
        stream.write_all(size_line.as_bytes()).await?;
        stream.write_all(content).await?;
        stream.write_all(CRLF).await
    }

    /// Ends the response: emits the zero-length chunk exactly once for a
    /// chunked body, then flushes.
    pub async fn finish<W>(&mut self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if self.chunked && !self.terminated {
            stream.write_all(LAST_CHUNK).await?;
            self.terminated = true;
        }
        stream.flush().await
    }
}
