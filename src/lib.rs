//! sdwebdav - WebDAV access to an SD card shared with a printer controller
//!
//! Core library: HTTP subset, WebDAV handlers, storage access and bus
//! arbitration.

pub mod bus;
pub mod config;
pub mod dav;
pub mod error;
pub mod http;
pub mod server;
pub mod storage;
