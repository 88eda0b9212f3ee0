//! MIME type lookup by file extension.

pub const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TABLE: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".htm", "text/html"),
    (".css", "text/css"),
    (".txt", "text/plain"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".jpg", "image/jpeg"),
    (".ico", "image/x-icon"),
    (".svg", "image/svg+xml"),
    (".ttf", "application/x-font-ttf"),
    (".otf", "application/x-font-opentype"),
    (".woff", "application/font-woff"),
    (".woff2", "application/font-woff2"),
    (".eot", "application/vnd.ms-fontobject"),
    (".sfnt", "application/font-sfnt"),
    (".xml", "text/xml"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/x-gzip"),
    (".appcache", "text/cache-manifest"),
];

/// MIME type for `path`. Suffix match, case-sensitive.
pub fn mime_type(path: &str) -> &'static str {
    MIME_TABLE
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}
