//! The debug HTTP source.

use super::upstream::{Connector, Upstream};
use crate::buffer::Buffer;
use crate::bus::{ErrorMessage, LibraryError, ResourceError};
use crate::element::{
    BaseSrcImpl, Caps, ClassBuilder, ElementContext, ElementImpl, ObjectSubclass, PadTemplate,
    SourceEvent, SourceState, UriHandlerImpl,
};
use crate::error::{Error, Result};
use crate::flow::FlowStatus;
use crate::observability::trace_state_change;
use crate::property::PropertySpec;
use crate::uri::UriType;
use crate::value::{ToValue, Value, ValueType, from_generic_or_default};
use std::io;
use std::sync::{Arc, Mutex, RwLock};

/// Index of the `location` property.
pub const PROP_LOCATION: usize = 0;

/// URI protocols handled by the source.
pub const PROTOCOLS: [&str; 2] = ["http", "https"];

#[derive(Default)]
struct State {
    lifecycle: SourceState,
    location: Option<String>,
    upstream: Option<Arc<dyn Upstream>>,
}

/// Pull-based source reading the body of an HTTP GET.
///
/// Every `fill` copies exactly what was asked for (or what is left) from
/// the response body; there is no read-ahead. Each chunk is logged at
/// `trace` level, which is the "debug" in the name: run a pipeline with
/// `RUST_LOG=debughttp=trace` to watch the traffic.
///
/// # Properties
///
/// | Name | Type | Default | Flags |
/// |---|---|---|---|
/// | `location` | string | none | read/write, not while started |
pub struct DebugHttpSrc {
    state: Mutex<State>,
    connector: RwLock<Option<Arc<dyn Connector>>>,
}

impl DebugHttpSrc {
    /// Replace the connector used by the next `start`.
    pub fn set_connector(&self, connector: Arc<dyn Connector>) {
        *self.connector.write().unwrap() = Some(connector);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SourceState {
        self.state.lock().unwrap().lifecycle
    }

    /// Configured location.
    pub fn location(&self) -> Option<String> {
        self.state.lock().unwrap().location.clone()
    }

    /// Check if an upstream is open.
    pub fn has_upstream(&self) -> bool {
        self.state.lock().unwrap().upstream.is_some()
    }

    /// Set (or clear, with an empty string) the location.
    ///
    /// Fails while started, leaving the location unchanged.
    pub fn set_location(&self, ctx: &ElementContext, location: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let next = state.lifecycle.transition(SourceEvent::SetLocation {
            empty: location.is_empty(),
        })?;

        state.location = (!location.is_empty()).then(|| location.to_string());
        tracing::debug!(element = %ctx.name(), location = location, "location set");
        if next != state.lifecycle {
            trace_state_change(ctx.name(), state.lifecycle.name(), next.name());
            state.lifecycle = next;
        }
        Ok(())
    }
}

#[cfg(feature = "http")]
fn default_connector() -> Option<Arc<dyn Connector>> {
    Some(Arc::new(super::upstream::HttpConnector::default()))
}

#[cfg(not(feature = "http"))]
fn default_connector() -> Option<Arc<dyn Connector>> {
    None
}

impl ObjectSubclass for DebugHttpSrc {
    const NAME: &'static str = "DebugHttpSrc";

    fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            connector: RwLock::new(default_connector()),
        }
    }

    fn class_init(klass: &mut ClassBuilder) {
        klass.set_metadata(
            "Debug HTTP Source",
            "Source/Network",
            "Read stream from an HTTP server and snoop while the pipeline is doing its thing",
            "Cognitive-i Ltd",
        );
        klass.add_pad_template(PadTemplate::src("src", Caps::any()));
        klass.install_properties(vec![
            PropertySpec::builder("location", ValueType::String)
                .nick("Location")
                .blurb("Location of the file to read from")
                .readwrite()
                .mutable_ready()
                .build(),
        ]);
        klass.set_uri_handler(UriType::Src, &PROTOCOLS);
    }
}

impl ElementImpl for DebugHttpSrc {
    fn set_property(
        &self,
        ctx: &ElementContext,
        id: usize,
        value: Option<&Value>,
        _pspec: &PropertySpec,
    ) -> Result<()> {
        match id {
            PROP_LOCATION => {
                let location: String = from_generic_or_default(value)?;
                self.set_location(ctx, &location)
            }
            _ => unimplemented!(),
        }
    }

    fn property(&self, ctx: &ElementContext, id: usize, _pspec: &PropertySpec) -> Option<Value> {
        match id {
            PROP_LOCATION => {
                let location = self.location()?;
                match location.try_to_value() {
                    Ok(value) => Some(value),
                    Err(err) => {
                        ctx.post_error(ErrorMessage::library(
                            LibraryError::Failed,
                            format!("Could not convert {location:?} to a string value"),
                            err.to_string(),
                        ));
                        None
                    }
                }
            }
            _ => unimplemented!(),
        }
    }

    fn as_base_src(&self) -> Option<&dyn BaseSrcImpl> {
        Some(self)
    }

    fn as_uri_handler(&self) -> Option<&dyn UriHandlerImpl> {
        Some(self)
    }
}

impl BaseSrcImpl for DebugHttpSrc {
    fn start(&self, ctx: &ElementContext) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let location = state.location.clone();
        let opened = state
            .lifecycle
            .transition(SourceEvent::Start {
                has_location: location.is_some(),
            })
            .and_then(|next| {
                let location = location.as_deref().unwrap_or_default();
                let connector = self.connector.read().unwrap().clone();
                let upstream = match connector {
                    Some(connector) => connector.connect(location)?,
                    None => return Err(Error::Connection("no connector".into())),
                };
                Ok((next, upstream))
            });

        match opened {
            Ok((next, upstream)) => {
                let location = location.unwrap_or_default();
                if let Some(status) = upstream.status().filter(|s| *s >= 400) {
                    let code = match status {
                        404 => ResourceError::NotFound,
                        _ => ResourceError::Failed,
                    };
                    ctx.post_warning(ErrorMessage::resource(
                        code,
                        format!("HTTP status {status} from {location}"),
                        "streaming the error body",
                    ));
                }
                tracing::debug!(element = %ctx.name(), location = %location, "upstream opened");
                trace_state_change(ctx.name(), state.lifecycle.name(), next.name());
                state.upstream = Some(upstream);
                state.lifecycle = next;
                Ok(())
            }
            // Already started: the open upstream stays untouched.
            Err(err @ Error::InvalidState(_)) => Err(err),
            Err(err) => {
                if state.lifecycle != SourceState::Idle {
                    state.lifecycle = state.lifecycle.transition(SourceEvent::StartFailed)?;
                }
                ctx.post_error(ErrorMessage::resource(
                    ResourceError::OpenRead,
                    format!(
                        "Could not open {}",
                        location.as_deref().unwrap_or("(no location)")
                    ),
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    fn stop(&self, ctx: &ElementContext) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let next = state.lifecycle.transition(SourceEvent::Stop)?;
        if let Some(upstream) = state.upstream.take() {
            upstream.close();
            tracing::debug!(element = %ctx.name(), "upstream closed");
        }
        if next != state.lifecycle {
            trace_state_change(ctx.name(), state.lifecycle.name(), next.name());
            state.lifecycle = next;
        }
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn fill(&self, ctx: &ElementContext, offset: u64, size: usize, buffer: &mut Buffer) -> FlowStatus {
        let Some(upstream) = self.state.lock().unwrap().upstream.clone() else {
            tracing::debug!(element = %ctx.name(), "fill without an open upstream");
            return FlowStatus::Error;
        };
        if offset != 0 {
            tracing::debug!(element = %ctx.name(), offset = offset, "fill at non-zero offset");
            return FlowStatus::Error;
        }

        let want = size.min(buffer.capacity());
        let (n, end) = match buffer.map_writable() {
            Ok(mut map) => {
                let end = copy_from(upstream.as_ref(), &mut map, want);
                (map.written(), end)
            }
            Err(err) => {
                tracing::warn!(element = %ctx.name(), error = %err, "could not map buffer");
                return FlowStatus::Error;
            }
        };
        if buffer.set_size(n).is_err() {
            return FlowStatus::Error;
        }

        tracing::trace!(element = %ctx.name(), requested = size, read = n, "copied from upstream");
        match end {
            CopyEnd::Complete => FlowStatus::Ok,
            CopyEnd::EndOfData if n == 0 => FlowStatus::EndOfStream,
            CopyEnd::EndOfData => FlowStatus::Ok,
            CopyEnd::Failed(err) => {
                let err = Error::Copy(err);
                ctx.post_error(ErrorMessage::resource(
                    ResourceError::Read,
                    "Could not read from upstream",
                    err.to_string(),
                ));
                FlowStatus::Error
            }
        }
    }
}

impl UriHandlerImpl for DebugHttpSrc {
    fn uri(&self) -> Option<String> {
        self.location()
    }

    fn set_uri(&self, ctx: &ElementContext, uri: &str) -> Result<()> {
        self.set_location(ctx, uri)
    }
}

enum CopyEnd {
    /// `want` bytes were copied.
    Complete,
    /// The upstream ran out first.
    EndOfData,
    Failed(io::Error),
}

/// Copy up to `want` bytes into the mapping, looping over short reads.
fn copy_from(upstream: &dyn Upstream, map: &mut crate::buffer::BufferMapWrite<'_>, want: usize) -> CopyEnd {
    while map.written() < want {
        let limit = want - map.written();
        match upstream.read(&mut map.remaining_mut()[..limit]) {
            Ok(0) => return CopyEnd::EndOfData,
            Ok(k) => map.advance(k),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return CopyEnd::Failed(err),
        }
    }
    CopyEnd::Complete
}
