//! Debug HTTP source.
//!
//! - [`DebugHttpSrc`]: pull-based source streaming an HTTP response body
//! - [`Connector`] / [`Upstream`]: where the bytes come from
//! - [`register`] / [`register_static`]: plugin entry points
//!
//! The default connector uses `ureq` for simple blocking HTTP and requires
//! the `http` feature flag. Without it, inject a connector with
//! [`DebugHttpSrc::set_connector`].

mod plugin;
mod src;
mod upstream;

pub use plugin::{ELEMENT_NAME, PLUGIN_NAME, RANK, metadata, register, register_static};
pub use src::{DebugHttpSrc, PROP_LOCATION, PROTOCOLS};
#[cfg(feature = "http")]
pub use upstream::HttpConnector;
pub use upstream::{Connector, HttpConfig, ReaderUpstream, Upstream};
