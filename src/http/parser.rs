use crate::http::request::{Depth, Method, Request};
use percent_encoding::percent_decode_str;

/// Upper bound for the request line plus header block.
pub const MAX_HEAD_SIZE: usize = 8 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request line has fewer than two spaces, or the head is not UTF-8.
    InvalidRequest,
    /// Header block grew past [`MAX_HEAD_SIZE`].
    HeadTooLarge,
    /// No blank line yet; more bytes are needed.
    Incomplete,
}

/// Parses a request head out of `buf`.
///
/// Returns the request and the number of bytes consumed (head plus the
/// terminating blank line). Anything after that is body and is left to the
/// caller.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = match find_headers_end(buf) {
        Some(end) => end,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    if headers_end > MAX_HEAD_SIZE {
        return Err(ParseError::HeadTooLarge);
    }

    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidRequest)?;
    let mut lines = head.split("\r\n");

    // "METHOD SP path SP version"
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.splitn(3, ' ');
    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let mut request = Request {
        method: Method::from_token(method),
        path: url_decode(target),
        version: version.to_string(),
        content_length: None,
        depth: Depth::None,
        destination: None,
        host: None,
    };

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("Host") {
            request.host = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("Depth") {
            request.depth = Depth::from_header(value);
        } else if name.eq_ignore_ascii_case("Content-Length") {
            request.content_length = value.parse().ok();
        } else if name.eq_ignore_ascii_case("Destination") {
            request.destination = Some(value.to_string());
        }
    }

    Ok((request, headers_end + 4))
}

/// Decodes `%XX` escapes and `+` as space.
pub fn url_decode(text: &str) -> String {
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
