//! Error types for debughttp.

use crate::value::ConversionError;
use thiserror::Error;

/// Result type alias using debughttp's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for element, registry and buffer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Illegal lifecycle transition (e.g. reconfiguring while started).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Failed to open the upstream connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Generic value did not match the expected type.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Host supplied a property index outside the installed table.
    #[error("property index {index} out of range (element has {len} properties)")]
    PropertyIndex {
        /// The offending index.
        index: usize,
        /// Number of installed properties.
        len: usize,
    },

    /// No property with this name is installed.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// The property is not writable (or not writable in the current state).
    #[error("property '{0}' is not writable")]
    NotWritable(String),

    /// The property is not readable.
    #[error("property '{0}' is not readable")]
    NotReadable(String),

    /// Mid-stream I/O failure while copying from upstream.
    #[error("copy from upstream failed: {0}")]
    Copy(std::io::Error),

    /// A buffer could not be mapped for writing.
    #[error("buffer map failed: {0}")]
    MapFailed(String),

    /// A buffer size exceeds the buffer's capacity.
    #[error("invalid buffer size {size} (capacity {capacity})")]
    InvalidSize {
        /// Requested size.
        size: usize,
        /// Available capacity.
        capacity: usize,
    },

    /// Plugin or element registration failed.
    #[error("registration failed: {0}")]
    Registration(String),

    /// A plugin or element with this name is already registered.
    #[error("'{0}' is already registered")]
    AlreadyRegistered(String),

    /// No element factory with this name.
    #[error("element '{0}' not found")]
    ElementNotFound(String),

    /// The URI could not be parsed.
    #[error("bad URI '{0}'")]
    BadUri(String),

    /// No handler supports the URI's protocol.
    #[error("unsupported protocol in URI '{0}'")]
    UnsupportedProtocol(String),

    /// The element does not implement the URI handler capability.
    #[error("element '{0}' is not a URI handler")]
    NoUriHandler(String),
}
