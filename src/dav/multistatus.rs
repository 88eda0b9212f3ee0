//! Multistatus XML for PROPFIND.
//!
//! A document is written piecewise: [`XML_PROLOG`], [`MULTISTATUS_OPEN`], one
//! [`encode_response`] per resource, [`MULTISTATUS_CLOSE`]. Each piece is
//! suitable as one chunk of a chunked body.

use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::http::mime::mime_type;
use crate::http::request::Depth;
use crate::storage::Entry;

pub const CONTENT_TYPE_XML: &str = "application/xml;charset=utf-8";
pub const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";
pub const MULTISTATUS_OPEN: &str = "<D:multistatus xmlns:D=\"DAV:\">";
pub const MULTISTATUS_CLOSE: &str = "</D:multistatus>";

// Characters that may not appear raw in an href. XML specials are included,
// so an encoded href needs no further escaping.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Everything PROPFIND reports about one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Decoded path as reported to the client
    pub href: String,
    pub modified: DateTime<Utc>,
    /// File size, `None` for collections
    pub size: Option<u64>,
    pub is_collection: bool,
}

impl ResourceDescriptor {
    pub fn from_entry(href: String, entry: &Entry) -> Self {
        Self {
            href,
            modified: DateTime::<Utc>::from(entry.modified),
            size: (!entry.is_dir).then_some(entry.size),
            is_collection: entry.is_dir,
        }
    }

    /// `Www, dd Mon yyyy HH:MM:SS GMT`
    pub fn last_modified(&self) -> String {
        http_date(self.modified)
    }

    /// Quoted entity tag: SHA-256 over the href and the formatted
    /// modification time.
    pub fn etag(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.href.as_bytes());
        hasher.update(self.last_modified().as_bytes());
        format!("\"{}\"", hex::encode(hasher.finalize()))
    }
}

pub fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Href of a child entry below `parent`.
pub fn child_href(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

pub fn encode_href(path: &str) -> String {
    utf8_percent_encode(path, HREF).to_string()
}

/// One `<D:response>` element.
pub fn encode_response(resource: &ResourceDescriptor) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str("<D:response><D:href>");
    xml.push_str(&encode_href(&resource.href));
    xml.push_str("</D:href><D:propstat><D:status>HTTP/1.1 200 OK</D:status><D:prop>");
    xml.push_str("<D:getlastmodified>");
    xml.push_str(&resource.last_modified());
    xml.push_str("</D:getlastmodified><D:getetag>");
    xml.push_str(&resource.etag());
    xml.push_str("</D:getetag>");

    match resource.size {
        Some(size) if !resource.is_collection => {
            xml.push_str("<D:resourcetype/><D:getcontentlength>");
            xml.push_str(&size.to_string());
            xml.push_str("</D:getcontentlength><D:getcontenttype>");
            xml.push_str(mime_type(&resource.href));
            xml.push_str("</D:getcontenttype>");
        }
        _ => xml.push_str("<D:resourcetype><D:collection/></D:resourcetype>"),
    }

    xml.push_str("</D:prop></D:propstat></D:response>");
    xml
}

/// A complete multistatus document.
pub fn encode_multistatus(resources: &[ResourceDescriptor]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_PROLOG);
    xml.push_str(MULTISTATUS_OPEN);
    for resource in resources {
        xml.push_str(&encode_response(resource));
    }
    xml.push_str(MULTISTATUS_CLOSE);
    xml
}

fn fixed_time(secs: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from(UNIX_EPOCH + Duration::from_secs(secs))
}

/// Stand-in listing served while storage cannot be touched.
///
/// The root collection, plus for depth 1 an empty pseudo-file named after
/// `message` so the reason shows up in the client's file browser.
pub fn rejection_listing(message: &str, depth: Depth) -> Vec<ResourceDescriptor> {
    let mut resources = vec![ResourceDescriptor {
        href: "/".to_string(),
        // Fri, 30 Nov 1979 00:00:00 GMT
        modified: fixed_time(312_768_000),
        size: None,
        is_collection: true,
    }];
    if depth != Depth::None {
        resources.push(ResourceDescriptor {
            href: child_href("/", message),
            // Fri, 01 Apr 2016 16:07:40 GMT
            modified: fixed_time(1_459_526_860),
            size: Some(0),
            is_collection: false,
        });
    }
    resources
}

