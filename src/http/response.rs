/// HTTP status codes used by the WebDAV engine.
///
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created
/// - `NoContent` (204): Success without a body (UNLOCK)
/// - `MultiStatus` (207): WebDAV multistatus body (PROPFIND)
/// - `NotFound` (404): Resource absent or method/resource mismatch
/// - `InternalServerError` (500): Storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 207 Multi-Status
    MultiStatus,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sdwebdav::http::response::StatusCode;
    /// assert_eq!(StatusCode::MultiStatus.as_u16(), 207);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::MultiStatus => 207,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::MultiStatus => "Multi-Status",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// How the body of a response is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyLength {
    /// Nothing set: `Content-Length` is taken from the inline content.
    #[default]
    NotSet,
    /// Length known up front.
    Fixed(u64),
    /// Chunked transfer encoding.
    Unknown,
}

/// Status line and header block of a response under construction.
///
/// Headers keep insertion order and may repeat. Created fresh for every
/// connection.
#[derive(Debug, Default)]
pub struct ResponseHead {
    /// Queued headers, in the order they will be written
    pub headers: Vec<(String, String)>,
    /// Body framing
    pub length: BodyLength,
}

impl ResponseHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a header after the ones already queued.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Queues a header ahead of the ones already queued.
    pub fn prepend(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(0, (name.into(), value.into()));
    }

    /// Value of the first header called `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
