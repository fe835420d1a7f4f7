//! Byte-stream upstreams for the HTTP source.
//!
//! The source never talks HTTP itself. A [`Connector`] turns a location
//! into an open [`Upstream`], which the streaming thread reads from and the
//! application thread may close at any time.

use crate::error::Result;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An open byte stream.
pub trait Upstream: Send + Sync {
    /// Read into `buf`. `Ok(0)` signals end of data.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the stream. Reads after close fail.
    fn close(&self);

    /// Protocol status of the response, if the protocol has one.
    fn status(&self) -> Option<u16> {
        None
    }
}

/// Opens upstreams for locations.
pub trait Connector: Send + Sync {
    /// Open `location`.
    fn connect(&self, location: &str) -> Result<Arc<dyn Upstream>>;
}

/// Adapts any [`Read`] into an [`Upstream`].
pub struct ReaderUpstream<R> {
    reader: Mutex<Option<R>>,
    closed: AtomicBool,
    status: Option<u16>,
}

impl<R: Read + Send> ReaderUpstream<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
            closed: AtomicBool::new(false),
            status: None,
        }
    }

    /// Attach a protocol status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if [`Upstream::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "upstream closed")
}

impl<R: Read + Send> Upstream for ReaderUpstream<R> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Err(closed_error());
        }
        let mut reader = self.reader.lock().unwrap();
        let result = match reader.as_mut() {
            Some(r) => r.read(buf),
            None => return Err(closed_error()),
        };
        // Closed while the read was in flight.
        if self.is_closed() {
            reader.take();
            return Err(closed_error());
        }
        result
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        // Drop the reader now unless a read holds it; that read drops it.
        if let Ok(mut reader) = self.reader.try_lock() {
            reader.take();
        }
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,
    /// Time allowed for a single read.
    ///
    /// Also bounds how long a read already in flight when `stop()` closes
    /// the upstream can keep the streaming thread blocked; that read then
    /// fails instead of returning data.
    pub read_timeout: Duration,
    /// `User-Agent` header.
    pub user_agent: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            user_agent: concat!("debughttp/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: Vec::new(),
        }
    }
}

impl HttpConfig {
    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a custom header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[cfg(feature = "http")]
pub use self::http::HttpConnector;

#[cfg(feature = "http")]
mod http {
    use super::{Connector, HttpConfig, ReaderUpstream, Upstream};
    use crate::error::{Error, Result};
    use std::sync::Arc;

    /// Blocking HTTP GET connector built on `ureq`.
    ///
    /// Error statuses (4xx/5xx) still stream their body; the status is
    /// reported through [`Upstream::status`]. Transport failures are
    /// connection errors.
    pub struct HttpConnector {
        agent: ureq::Agent,
        config: HttpConfig,
    }

    impl HttpConnector {
        /// Create a connector.
        pub fn new(config: HttpConfig) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.read_timeout)
                .user_agent(&config.user_agent)
                .build();
            Self { agent, config }
        }

        /// The connector's configuration.
        pub fn config(&self) -> &HttpConfig {
            &self.config
        }
    }

    impl Default for HttpConnector {
        fn default() -> Self {
            Self::new(HttpConfig::default())
        }
    }

    impl Connector for HttpConnector {
        fn connect(&self, location: &str) -> Result<Arc<dyn Upstream>> {
            let mut request = self.agent.get(location);
            for (name, value) in &self.config.headers {
                request = request.set(name, value);
            }

            let response = match request.call() {
                Ok(response) => response,
                Err(ureq::Error::Status(code, response)) => {
                    tracing::warn!(location = location, status = code, "HTTP error status, streaming body anyway");
                    response
                }
                Err(ureq::Error::Transport(transport)) => {
                    return Err(Error::Connection(format!("{location}: {transport}")));
                }
            };

            let status = response.status();
            tracing::debug!(
                location = location,
                status = status,
                content_type = response.content_type(),
                "HTTP response"
            );
            Ok(Arc::new(
                ReaderUpstream::new(response.into_reader()).with_status(status),
            ))
        }
    }

    impl std::fmt::Debug for HttpConnector {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("HttpConnector")
                .field("config", &self.config)
                .finish()
        }
    }
}
