/// Request methods understood by the dispatcher.
///
/// Anything else is kept as [`Method::Extension`] so that it can still be
/// answered with the generic 404 instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Download a file
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// PUT - Create or overwrite a file
    PUT,
    /// DELETE - Remove a file or an empty directory
    DELETE,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PROPFIND - Describe a resource and optionally its children
    PROPFIND,
    /// PROPPATCH - Accepted, answered like PROPFIND
    PROPPATCH,
    /// MKCOL - Create a collection
    MKCOL,
    /// MOVE - Rename a resource
    MOVE,
    /// LOCK - Hand out the fixed lock token
    LOCK,
    /// UNLOCK - Release the fixed lock token
    UNLOCK,
    /// Any other token, e.g. POST or COPY
    Extension(String),
}

impl Method {
    /// Every method with a dedicated handler, in the order `Allow` lists them.
    pub const SUPPORTED: &'static [&'static str] = &[
        "OPTIONS", "PROPFIND", "PROPPATCH", "GET", "HEAD", "PUT", "DELETE", "MKCOL", "MOVE",
        "LOCK", "UNLOCK",
    ];

    /// Parses a method token. Matching is case-sensitive, as on the wire.
    ///
    /// ```
    /// # use sdwebdav::http::request::Method;
    /// assert_eq!(Method::from_token("PROPFIND"), Method::PROPFIND);
    /// assert_eq!(Method::from_token("get"), Method::Extension("get".into()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            "PROPFIND" => Method::PROPFIND,
            "PROPPATCH" => Method::PROPPATCH,
            "MKCOL" => Method::MKCOL,
            "MOVE" => Method::MOVE,
            "LOCK" => Method::LOCK,
            "UNLOCK" => Method::UNLOCK,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PROPFIND => "PROPFIND",
            Method::PROPPATCH => "PROPPATCH",
            Method::MKCOL => "MKCOL",
            Method::MOVE => "MOVE",
            Method::LOCK => "LOCK",
            Method::UNLOCK => "UNLOCK",
            Method::Extension(s) => s,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Header absent or `0`
    #[default]
    None,
    /// `1`
    Child,
    /// `infinity`
    All,
}

impl Depth {
    pub fn from_header(value: &str) -> Self {
        match value {
            "1" => Depth::Child,
            "infinity" => Depth::All,
            _ => Depth::None,
        }
    }
}

/// A parsed request head.
///
/// Only the headers the WebDAV engine acts on are retained. The body stays on
/// the connection for the handlers that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request method
    pub method: Method,
    /// URL-decoded absolute path, e.g. "/prints/benchy.gcode"
    pub path: String,
    /// HTTP version as sent by the client
    pub version: String,
    /// `Content-Length`, if present and numeric
    pub content_length: Option<u64>,
    /// `Depth`
    pub depth: Depth,
    /// `Destination`, raw as sent (absolute URL or path)
    pub destination: Option<String>,
    /// `Host`
    pub host: Option<String>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    content_length: Option<u64>,
    depth: Depth,
    destination: Option<String>,
    host: Option<String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            content_length: None,
            depth: Depth::None,
            destination: None,
            host: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            content_length: self.content_length,
            depth: self.depth,
            destination: self.destination,
            host: self.host,
        })
    }
}

impl Request {
    /// Declared body length, 0 when the header was missing or unparsable.
    pub fn body_len(&self) -> u64 {
        self.content_length.unwrap_or(0)
    }

    /// Path of the `Destination` header.
    ///
    /// An absolute URL has its scheme and authority stripped; the remaining
    /// path is URL-decoded like the request path.
    pub fn destination_path(&self) -> Option<String> {
        let dest = self.destination.as_deref()?.trim();
        if dest.is_empty() {
            return None;
        }
        let raw_path = match url::Url::parse(dest) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ => dest.to_string(),
        };
        Some(crate::http::parser::url_decode(&raw_path))
    }
}
