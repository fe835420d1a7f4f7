//! Integration tests for the debug HTTP source lifecycle.
//!
//! These tests drive the element through the host-facing API with an
//! in-memory connector, so byte counts and failures are deterministic.

use debughttp::buffer::Buffer;
use debughttp::bus::{Bus, LibraryError, Message, ResourceError};
use debughttp::element::{Element, SourceState};
use debughttp::elements::http::{
    Connector, DebugHttpSrc, ELEMENT_NAME, PROP_LOCATION, ReaderUpstream, Upstream,
};
use debughttp::error::{Error, Result};
use debughttp::flow::FlowStatus;
use debughttp::plugin::Registry;
use debughttp::uri::UriType;
use debughttp::value::Value;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// Serves a fixed body and counts connections.
struct MemoryConnector {
    body: Vec<u8>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    fn new(body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_vec(),
            connects: AtomicUsize::new(0),
        })
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _location: &str) -> Result<Arc<dyn Upstream>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ReaderUpstream::new(Cursor::new(self.body.clone()))))
    }
}

/// Refuses every connection.
struct Unreachable;

impl Connector for Unreachable {
    fn connect(&self, location: &str) -> Result<Arc<dyn Upstream>> {
        Err(Error::Connection(format!("{location}: connection refused")))
    }
}

/// Endless stream where every read takes a while.
struct SlowReader;

impl Read for SlowReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        thread::sleep(Duration::from_millis(5));
        let n = buf.len().min(16);
        buf[..n].fill(b'x');
        Ok(n)
    }
}

struct SlowConnector;

impl Connector for SlowConnector {
    fn connect(&self, _location: &str) -> Result<Arc<dyn Upstream>> {
        Ok(Arc::new(ReaderUpstream::new(SlowReader)))
    }
}

fn make_source(registry: &Registry, connector: Arc<dyn Connector>) -> Element {
    let element = registry.make_element(ELEMENT_NAME, None).unwrap();
    element
        .imp::<DebugHttpSrc>()
        .unwrap()
        .set_connector(connector);
    element
}

fn registry() -> Registry {
    let registry = Registry::new();
    debughttp::register(&registry).unwrap();
    registry
}

fn state(element: &Element) -> SourceState {
    element.imp::<DebugHttpSrc>().unwrap().state()
}

// ============================================================================
// Lifecycle Scenarios
// ============================================================================

/// Configure, start and read a first chunk.
#[test]
fn test_configure_start_fill() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(&[0x42; 300]));

    assert_eq!(state(&src), SourceState::Idle);
    src.set_property("location", "http://host/a").unwrap();
    assert_eq!(state(&src), SourceState::Configured);
    src.start().unwrap();
    assert_eq!(state(&src), SourceState::Started);

    let mut buffer = Buffer::with_capacity(100);
    assert_eq!(src.fill(0, 100, &mut buffer), FlowStatus::Ok);
    assert!(buffer.size() > 0 && buffer.size() <= 100);
}

/// A 50-byte body: one short Ok, then EndOfStream with zero bytes.
#[test]
fn test_partial_read_then_eos() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(&[1u8; 50]));
    src.set_property("location", "http://host/fifty").unwrap();
    src.start().unwrap();

    let mut buffer = Buffer::with_capacity(100);
    assert_eq!(src.fill(0, 100, &mut buffer), FlowStatus::Ok);
    assert_eq!(buffer.size(), 50);

    assert_eq!(src.fill(0, 100, &mut buffer), FlowStatus::EndOfStream);
    assert_eq!(buffer.size(), 0);
}

/// Failed start leaves the element configured and reconfigurable.
#[test]
fn test_failed_start_stays_configured() {
    let registry = registry();
    let src = make_source(&registry, Arc::new(Unreachable));
    let (bus, rx) = Bus::new();
    src.set_bus(Some(bus));

    src.set_property("location", "http://unreachable/").unwrap();
    assert!(matches!(src.start(), Err(Error::Connection(_))));
    assert_eq!(state(&src), SourceState::Configured);
    assert!(!src.is_started());

    src.set_property("location", "http://other/").unwrap();
    assert_eq!(
        src.property_as::<String>("location").unwrap().as_deref(),
        Some("http://other/")
    );

    let errors = rx.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_resource(ResourceError::OpenRead));
}

/// A second start keeps the first connection.
#[test]
fn test_double_start_keeps_connection() {
    let registry = registry();
    let connector = MemoryConnector::new(b"0123456789");
    let src = make_source(&registry, connector.clone());
    src.set_property("location", "http://host/digits").unwrap();

    src.start().unwrap();
    let mut buffer = Buffer::with_capacity(4);
    assert_eq!(src.fill(0, 4, &mut buffer), FlowStatus::Ok);
    assert_eq!(buffer.as_slice(), b"0123");

    assert!(matches!(src.start(), Err(Error::InvalidState(_))));
    assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    assert_eq!(state(&src), SourceState::Started);

    // Still reading from the first connection.
    assert_eq!(src.fill(0, 4, &mut buffer), FlowStatus::Ok);
    assert_eq!(buffer.as_slice(), b"4567");
}

/// An unset location reads as absent, not as an empty string.
#[test]
fn test_unset_location_is_absent() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b""));

    assert_eq!(src.property("location").unwrap(), None);
    assert_eq!(src.property_value(PROP_LOCATION), None);
    assert!(src.uri_handler().unwrap().uri().is_none());
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_location_locked_while_started() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let (bus, rx) = Bus::new();
    src.set_bus(Some(bus));

    src.set_property("location", "http://host/a").unwrap();
    src.start().unwrap();

    assert!(matches!(
        src.set_property("location", "http://host/b"),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(
        src.uri_handler().unwrap().set_uri("http://host/c"),
        Err(Error::InvalidState(_))
    ));

    src.set_property_value(PROP_LOCATION, Some(Value::String("http://host/d".into())));
    let errors = rx.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_library(LibraryError::Settings));
    assert_eq!(
        errors[0].message,
        "Could not set location on object: invalid state: cannot change location whilst running"
    );

    assert_eq!(
        src.property_as::<String>("location").unwrap().as_deref(),
        Some("http://host/a")
    );

    src.stop().unwrap();
    src.set_property("location", "http://host/b").unwrap();
    assert_eq!(state(&src), SourceState::Configured);
}

#[test]
fn test_never_seekable() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    assert!(!src.is_seekable());
    src.set_property("location", "http://host/a").unwrap();
    src.start().unwrap();
    assert!(!src.is_seekable());
}

#[test]
fn test_fill_nonzero_offset_is_error() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let mut buffer = Buffer::with_capacity(8);

    assert_eq!(src.fill(3, 8, &mut buffer), FlowStatus::Error);
    src.set_property("location", "http://host/a").unwrap();
    src.start().unwrap();
    assert_eq!(src.fill(3, 8, &mut buffer), FlowStatus::Error);
    src.stop().unwrap();
    assert_eq!(src.fill(3, 8, &mut buffer), FlowStatus::Error);
}

#[test]
fn test_fill_without_connection_is_error() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let mut buffer = Buffer::with_capacity(8);
    assert_eq!(src.fill(0, 8, &mut buffer), FlowStatus::Error);

    src.set_property("location", "http://host/a").unwrap();
    assert_eq!(src.fill(0, 8, &mut buffer), FlowStatus::Error);
}

#[test]
fn test_clear_location() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));

    src.set_property("location", "http://host/a").unwrap();
    src.set_property_value(PROP_LOCATION, None);
    assert_eq!(src.property("location").unwrap(), None);
    assert_eq!(state(&src), SourceState::Idle);

    src.set_property("location", "http://host/a").unwrap();
    src.clear_property("location").unwrap();
    assert_eq!(src.property("location").unwrap(), None);
    assert!(matches!(src.start(), Err(Error::Connection(_))));
}

#[test]
fn test_wrong_value_type_is_rejected() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    src.set_property("location", "http://host/a").unwrap();

    assert!(matches!(
        src.set_property("location", 42i32),
        Err(Error::Conversion(_))
    ));
    assert!(matches!(
        src.set_property("no-such-property", "x"),
        Err(Error::UnknownProperty(_))
    ));
    assert_eq!(
        src.property_as::<String>("location").unwrap().as_deref(),
        Some("http://host/a")
    );
}

/// Test that generic sets report type and representability problems as
/// `Library/Failed` and leave the stored location alone.
#[test]
fn test_generic_set_conversion_failures() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let (bus, rx) = Bus::new();
    src.set_bus(Some(bus));
    src.set_property("location", "http://host/a").unwrap();

    src.set_property_value(PROP_LOCATION, Some(Value::Int(42)));
    src.set_property_value(PROP_LOCATION, Some(Value::String("http://a/\0b".into())));

    let errors = rx.errors();
    assert_eq!(errors.len(), 2);
    for error in &errors {
        assert!(error.is_library(LibraryError::Failed));
        assert!(!error.is_library(LibraryError::Settings));
    }
    assert_eq!(errors[0].message, "Could not convert value to set location");
    assert_eq!(
        src.property_value(PROP_LOCATION),
        Some(Value::String("http://host/a".into()))
    );
    assert!(rx.try_recv().is_none());
}

#[test]
fn test_create_stamps_sequence() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(&[9u8; 10]));
    src.set_property("location", "http://host/a").unwrap();
    src.start().unwrap();

    let first = src.create(0, 6).unwrap();
    let second = src.create(0, 6).unwrap();
    assert_eq!(first.size(), 6);
    assert_eq!(second.size(), 4);
    assert_eq!(first.metadata().sequence, 0);
    assert_eq!(second.metadata().sequence, 1);
    assert!(first.metadata().discont && !second.metadata().discont);
    assert_eq!(second.metadata().offset_end, Some(4));
    assert!(matches!(src.create(0, 6), Err(FlowStatus::EndOfStream)));
}

/// Hands out one shared upstream so tests can watch it being closed.
struct SharedConnector(Arc<ReaderUpstream<Cursor<Vec<u8>>>>);

impl Connector for SharedConnector {
    fn connect(&self, _location: &str) -> Result<Arc<dyn Upstream>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_drop_releases_upstream() {
    let registry = registry();
    let upstream = Arc::new(ReaderUpstream::new(Cursor::new(b"data".to_vec())));
    let src = make_source(&registry, Arc::new(SharedConnector(upstream.clone())));
    src.set_property("location", "http://host/a").unwrap();
    src.start().unwrap();
    assert!(!upstream.is_closed());

    drop(src);
    assert!(upstream.is_closed());
}

// ============================================================================
// URI Handler
// ============================================================================

/// Test that the URI handler and the location property are one value.
#[test]
fn test_uri_round_trip() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let handler = src.uri_handler().unwrap();

    assert_eq!(handler.uri_type(), UriType::Src);
    assert_eq!(handler.protocols(), ["http", "https"]);

    handler.set_uri("https://example.com/live.ts").unwrap();
    assert_eq!(handler.uri().as_deref(), Some("https://example.com/live.ts"));
    assert_eq!(
        src.property_as::<String>("location").unwrap().as_deref(),
        Some("https://example.com/live.ts")
    );
    assert_eq!(state(&src), SourceState::Configured);

    src.set_property("location", "http://example.com/other").unwrap();
    assert_eq!(handler.uri().as_deref(), Some("http://example.com/other"));
}

#[test]
fn test_set_uri_rejects_foreign_schemes() {
    let registry = registry();
    let src = make_source(&registry, MemoryConnector::new(b"data"));
    let handler = src.uri_handler().unwrap();

    assert!(matches!(
        handler.set_uri("ftp://x"),
        Err(Error::UnsupportedProtocol(_))
    ));
    assert!(matches!(handler.set_uri("example.com"), Err(Error::BadUri(_))));
    assert!(handler.uri().is_none());
    assert_eq!(state(&src), SourceState::Idle);
}

// ============================================================================
// Concurrency
// ============================================================================

/// A setter racing an in-flight fill never changes the location, and a stop
/// from the application thread ends streaming cleanly.
#[test]
fn test_setter_races_fill() {
    let registry = registry();
    let src = make_source(&registry, Arc::new(SlowConnector));
    let (bus, rx) = Bus::new();
    src.set_bus(Some(bus));
    src.set_property("location", "http://host/slow").unwrap();
    src.start().unwrap();

    let flows = thread::scope(|s| {
        let streaming = s.spawn(|| {
            let mut buffer = Buffer::with_capacity(64);
            let mut flows = Vec::new();
            loop {
                let flow = src.fill(0, 64, &mut buffer);
                flows.push(flow);
                if flow != FlowStatus::Ok {
                    break;
                }
            }
            flows
        });

        for _ in 0..20 {
            assert!(src.set_property("location", "http://host/other").is_err());
            thread::sleep(Duration::from_millis(2));
        }
        src.stop().unwrap();
        streaming.join().unwrap()
    });

    assert!(flows.len() > 1);
    assert_eq!(flows.last(), Some(&FlowStatus::Error));
    assert_eq!(
        src.property_as::<String>("location").unwrap().as_deref(),
        Some("http://host/slow")
    );

    // The read cut short by stop is reported, nothing else.
    for message in rx.drain() {
        match message {
            Message::Error(e) => assert!(e.is_resource(ResourceError::Read)),
            Message::Warning(w) => panic!("unexpected warning {w}"),
        }
    }
}
