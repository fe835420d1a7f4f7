//! Built-in elements.
//!
//! ## Sources
//! - [`DebugHttpSrc`]: Streams an HTTP response body, logging every chunk

pub mod http;

pub use http::DebugHttpSrc;
