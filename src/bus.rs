//! Structured messages from elements to the application.
//!
//! Elements never unwind errors into the host's control flow. Failures that
//! the application must hear about are posted here as [`ErrorMessage`]s
//! carrying a domain, a code, a human message and a debug string.

use std::fmt;
use std::time::Duration;

/// Error domain of an [`ErrorMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Core host errors.
    Core,
    /// Errors from a library the element uses.
    Library,
    /// Errors accessing a resource (file, network, device).
    Resource,
    /// Errors in the data stream.
    Stream,
}

impl ErrorDomain {
    /// Domain name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorDomain::Core => "core",
            ErrorDomain::Library => "library",
            ErrorDomain::Resource => "resource",
            ErrorDomain::Stream => "stream",
        }
    }
}

/// Codes of the [`ErrorDomain::Library`] domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LibraryError {
    /// Generic failure.
    Failed = 1,
    /// Settings were rejected.
    Settings = 5,
}

/// Codes of the [`ErrorDomain::Resource`] domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResourceError {
    /// Generic failure.
    Failed = 1,
    /// Resource does not exist (HTTP 404).
    NotFound = 3,
    /// Resource could not be opened for reading.
    OpenRead = 5,
    /// Reading from the resource failed.
    Read = 9,
}

/// A structured error or warning posted by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Name of the posting element.
    pub source: String,
    /// Error domain.
    pub domain: ErrorDomain,
    /// Domain-specific code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Machine-oriented debug string.
    pub debug: String,
}

impl ErrorMessage {
    /// A library-domain message.
    pub fn library(
        code: LibraryError,
        message: impl Into<String>,
        debug: impl Into<String>,
    ) -> Self {
        Self {
            source: String::new(),
            domain: ErrorDomain::Library,
            code: code as i32,
            message: message.into(),
            debug: debug.into(),
        }
    }

    /// A resource-domain message.
    pub fn resource(
        code: ResourceError,
        message: impl Into<String>,
        debug: impl Into<String>,
    ) -> Self {
        Self {
            source: String::new(),
            domain: ErrorDomain::Resource,
            code: code as i32,
            message: message.into(),
            debug: debug.into(),
        }
    }

    /// Check domain and library code.
    pub fn is_library(&self, code: LibraryError) -> bool {
        self.domain == ErrorDomain::Library && self.code == code as i32
    }

    /// Check domain and resource code.
    pub fn is_resource(&self, code: ResourceError) -> bool {
        self.domain == ErrorDomain::Resource && self.code == code as i32
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}): {}",
            self.source,
            self.domain.name(),
            self.code,
            self.message
        )?;
        if !self.debug.is_empty() {
            write!(f, " [{}]", self.debug)?;
        }
        Ok(())
    }
}

/// Messages delivered over a [`Bus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// An error occurred.
    Error(ErrorMessage),
    /// A non-fatal issue.
    Warning(ErrorMessage),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Error(e) => write!(f, "Error from {e}"),
            Message::Warning(w) => write!(f, "Warning from {w}"),
        }
    }
}

/// Sending side of the message bus.
///
/// Cheap to clone; every element of a pipeline holds one.
#[derive(Clone)]
pub struct Bus {
    sender: kanal::Sender<Message>,
}

impl Bus {
    /// Create a bus and its receiving end.
    pub fn new() -> (Self, BusReceiver) {
        let (sender, receiver) = kanal::unbounded();
        (Self { sender }, BusReceiver { receiver })
    }

    /// Post a message.
    ///
    /// Returns `false` if the receiver is gone (which is fine).
    pub fn post(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("pending", &self.sender.len())
            .finish()
    }
}

/// Receiving side of the message bus.
pub struct BusReceiver {
    receiver: kanal::Receiver<Message>,
}

impl BusReceiver {
    /// Take the next message without blocking.
    pub fn try_recv(&self) -> Option<Message> {
        self.receiver.try_recv().ok().flatten()
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Take every pending message.
    pub fn drain(&self) -> Vec<Message> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Take the pending error messages, discarding everything else.
    pub fn errors(&self) -> Vec<ErrorMessage> {
        self.drain()
            .into_iter()
            .filter_map(|m| match m {
                Message::Error(e) => Some(e),
                Message::Warning(_) => None,
            })
            .collect()
    }
}

impl fmt::Debug for BusReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusReceiver")
            .field("pending", &self.receiver.len())
            .finish()
    }
}
