//! Host-side element instances.
//!
//! [`Element`] is what the application holds. It owns the boxed
//! implementation, shares the type's [`ElementClass`], and performs every
//! host-side check (property index, access flags, value types, URI
//! protocols) before dispatching into the implementation hooks.

use super::class::ElementClass;
use super::context::ElementContext;
use super::pad::{Pad, PadList};
use super::traits::{BaseSrcImpl, ElementImpl, UriHandlerImpl};
use crate::buffer::Buffer;
use crate::bus::{Bus, ErrorMessage, LibraryError};
use crate::error::{Error, Result};
use crate::flow::FlowStatus;
use crate::metadata::Metadata;
use crate::observability::{instrument_element, trace_fill};
use crate::property::PropertySpec;
use crate::uri::{UriInfo, UriType};
use crate::value::{ConversionError, FromValue, ToValue, Value, check_representable, from_generic};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An element instance.
pub struct Element {
    class: Arc<ElementClass>,
    factory: Option<String>,
    ctx: ElementContext,
    imp: Box<dyn ElementImpl>,
    pads: PadList,
    started: AtomicBool,
    sequence: AtomicU64,
}

impl Element {
    pub(crate) fn new(
        class: Arc<ElementClass>,
        name: impl Into<String>,
        imp: Box<dyn ElementImpl>,
    ) -> Self {
        let pads = PadList::from_templates(class.pad_templates());
        Self {
            ctx: ElementContext::new(name),
            pads,
            class,
            factory: None,
            imp,
            started: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    pub(crate) fn with_factory(mut self, factory: &str) -> Self {
        self.factory = Some(factory.to_string());
        self
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Name of the factory that created this element.
    pub fn factory_name(&self) -> Option<&str> {
        self.factory.as_deref()
    }

    /// Shared class record.
    pub fn class(&self) -> &Arc<ElementClass> {
        &self.class
    }

    /// The instance's pads.
    pub fn pads(&self) -> &PadList {
        &self.pads
    }

    /// Look up an always-present pad by name.
    pub fn static_pad(&self, name: &str) -> Option<&Pad> {
        self.pads.get(name)
    }

    /// Attach the application's message bus.
    pub fn set_bus(&self, bus: Option<Bus>) {
        self.ctx.set_bus(bus);
    }

    /// Downcast to the concrete implementation.
    pub fn imp<T: ElementImpl>(&self) -> Option<&T> {
        let imp: &dyn ElementImpl = &*self.imp;
        let imp: &dyn Any = imp;
        imp.downcast_ref::<T>()
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    /// Set a property by index from a generic value.
    ///
    /// Failures are posted on the bus and never returned: a value of the
    /// wrong type or one the host cannot carry as `Library/Failed`, anything
    /// else as `Library/Settings`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the installed property table.
    pub fn set_property_value(&self, index: usize, value: Option<Value>) {
        let pspec = self.resolve(index);
        let result = self
            .check_write(pspec, value.as_ref())
            .and_then(|()| self.dispatch_set(pspec, value.as_ref()));

        match result {
            Ok(()) => {}
            Err(Error::Conversion(err)) => self.ctx.post_error(ErrorMessage::library(
                LibraryError::Failed,
                format!("Could not convert value to set {}", pspec.name()),
                err.to_string(),
            )),
            Err(err) => self.ctx.post_error(ErrorMessage::library(
                LibraryError::Settings,
                format!("Could not set {} on object: {err}", pspec.name()),
                format!("{err:?}"),
            )),
        }
    }

    /// Read a property by index as a generic value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the installed property table.
    pub fn property_value(&self, index: usize) -> Option<Value> {
        let pspec = self.resolve(index);
        if !pspec.is_readable() {
            tracing::warn!(element = %self.name(), property = pspec.name(), "property is not readable");
            return None;
        }
        self.imp.property(&self.ctx, index, pspec)
    }

    /// Set a property by name.
    pub fn set_property(&self, name: &str, value: impl ToValue) -> Result<()> {
        let pspec = self.find_property(name)?;
        let value = value.try_to_value()?;
        self.check_write(pspec, Some(&value))?;
        self.dispatch_set(pspec, Some(&value))
    }

    /// Clear a property to its empty form.
    pub fn clear_property(&self, name: &str) -> Result<()> {
        let pspec = self.find_property(name)?;
        self.check_write(pspec, None)?;
        self.dispatch_set(pspec, None)
    }

    /// Read a property by name.
    pub fn property(&self, name: &str) -> Result<Option<Value>> {
        let pspec = self.find_property(name)?;
        if !pspec.is_readable() {
            return Err(Error::NotReadable(name.to_string()));
        }
        Ok(self.imp.property(&self.ctx, pspec.index(), pspec))
    }

    /// Read a property by name as a typed value.
    pub fn property_as<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        let value = self.property(name)?;
        Ok(from_generic(value.as_ref())?)
    }

    fn resolve(&self, index: usize) -> &PropertySpec {
        match self.class.properties().resolve(index) {
            Ok(pspec) => pspec,
            Err(err) => panic!("{}: {err}", self.name()),
        }
    }

    fn find_property(&self, name: &str) -> Result<&PropertySpec> {
        self.class
            .properties()
            .find(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    fn check_write(&self, pspec: &PropertySpec, value: Option<&Value>) -> Result<()> {
        if !pspec.is_writable() {
            return Err(Error::NotWritable(pspec.name().to_string()));
        }
        if pspec.flags().mutable_ready && self.started.load(Ordering::Acquire) {
            return Err(Error::InvalidState(format!(
                "cannot change {} whilst running",
                pspec.name()
            )));
        }
        if let Some(value) = value {
            if !value.conforms_to(pspec.value_type()) {
                return Err(ConversionError::TypeMismatch {
                    expected: pspec.value_type(),
                    actual: value.value_type(),
                }
                .into());
            }
            check_representable(value)?;
        }
        Ok(())
    }

    fn dispatch_set(&self, pspec: &PropertySpec, value: Option<&Value>) -> Result<()> {
        self.imp.set_property(&self.ctx, pspec.index(), value, pspec)?;
        tracing::debug!(
            element = %self.name(),
            property = pspec.name(),
            value = ?value,
            "property set"
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Source lifecycle and data flow
    // ------------------------------------------------------------------------

    fn base_src(&self) -> Result<&dyn BaseSrcImpl> {
        self.imp
            .as_base_src()
            .ok_or_else(|| Error::InvalidState(format!("{} is not a source", self.name())))
    }

    /// Open the upstream resource.
    pub fn start(&self) -> Result<()> {
        let _guard = instrument_element(self.name(), self.class.type_name());
        self.base_src()?.start(&self.ctx)?;
        self.started.store(true, Ordering::Release);
        Ok(())
    }

    /// Release the upstream resource. Idempotent.
    pub fn stop(&self) -> Result<()> {
        let _guard = instrument_element(self.name(), self.class.type_name());
        let result = self.base_src()?.stop(&self.ctx);
        self.started.store(false, Ordering::Release);
        result
    }

    /// Check if the element was started and not stopped since.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Whether the source supports random access.
    pub fn is_seekable(&self) -> bool {
        self.imp.as_base_src().is_some_and(|b| b.is_seekable())
    }

    /// Fill a caller-provided buffer.
    pub fn fill(&self, offset: u64, size: usize, buffer: &mut Buffer) -> FlowStatus {
        let Some(base) = self.imp.as_base_src() else {
            return FlowStatus::NotLinked;
        };
        let flow = base.fill(&self.ctx, offset, size, buffer);
        trace_fill(self.name(), offset, size, buffer.size(), flow);
        flow
    }

    /// Allocate a buffer of `size` bytes and fill it.
    ///
    /// On success the buffer carries a sequence number and its byte range.
    pub fn create(&self, offset: u64, size: usize) -> std::result::Result<Buffer, FlowStatus> {
        let mut buffer = Buffer::with_capacity(size);
        self.fill(offset, size, &mut buffer).into_result()?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        *buffer.metadata_mut() =
            Metadata::with_sequence(sequence).with_range(offset, buffer.size() as u64);
        Ok(buffer)
    }

    // ------------------------------------------------------------------------
    // URI handler
    // ------------------------------------------------------------------------

    /// URI handler view, if the element type declared the capability.
    pub fn uri_handler(&self) -> Option<UriHandler<'_>> {
        let info = self.class.uri_info()?;
        let imp = self.imp.as_uri_handler()?;
        Some(UriHandler {
            element: self,
            info,
            imp,
        })
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        if let Some(base) = self.imp.as_base_src() {
            if let Err(err) = base.stop(&self.ctx) {
                tracing::warn!(element = %self.name(), error = %err, "stop on drop failed");
            }
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .field("type", &self.class.type_name())
            .field("started", &self.is_started())
            .field("pads", &self.pads.len())
            .finish()
    }
}

/// URI handler view of an [`Element`].
pub struct UriHandler<'a> {
    element: &'a Element,
    info: &'a UriInfo,
    imp: &'a dyn UriHandlerImpl,
}

impl UriHandler<'_> {
    /// Handler direction.
    pub fn uri_type(&self) -> UriType {
        self.info.uri_type()
    }

    /// Supported protocols.
    pub fn protocols(&self) -> &[String] {
        self.info.protocols()
    }

    /// Current URI.
    pub fn uri(&self) -> Option<String> {
        self.imp.uri()
    }

    /// Configure the element from a URI.
    pub fn set_uri(&self, uri: &str) -> Result<()> {
        self.info.check_uri(uri)?;
        self.imp.set_uri(&self.element.ctx, uri)?;
        tracing::debug!(element = %self.element.name(), uri = uri, "URI set");
        Ok(())
    }
}

impl fmt::Debug for UriHandler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriHandler")
            .field("element", &self.element.name())
            .field("info", self.info)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Message;
    use crate::element::{
        Caps, ClassBuilder, ElementKind, Interfaces, ObjectSubclass, PadTemplate,
    };
    use crate::value::ValueType;
    use std::sync::Mutex;

    /// Source producing a fixed byte pattern, with a writable label and a
    /// read-only counter.
    #[derive(Default)]
    struct PatternSrc {
        label: Mutex<Option<String>>,
        running: AtomicBool,
        uri: Mutex<Option<String>>,
    }

    impl ObjectSubclass for PatternSrc {
        const NAME: &'static str = "PatternSrc";

        fn new() -> Self {
            Self::default()
        }

        fn class_init(klass: &mut ClassBuilder) {
            klass.set_metadata("Pattern", "Source", "Test pattern", "tests");
            klass.add_pad_template(PadTemplate::src("src", Caps::any()));
            klass.install_properties(vec![
                PropertySpec::builder("label", ValueType::String)
                    .mutable_ready()
                    .build(),
                PropertySpec::builder("count", ValueType::UInt)
                    .read_only()
                    .build(),
            ]);
            klass.set_uri_handler(UriType::Src, &["pattern"]);
        }
    }

    impl ElementImpl for PatternSrc {
        fn set_property(
            &self,
            _ctx: &ElementContext,
            id: usize,
            value: Option<&Value>,
            _pspec: &PropertySpec,
        ) -> Result<()> {
            match id {
                0 => {
                    let label: Option<String> = from_generic(value)?;
                    if label.as_deref() == Some("reject") {
                        return Err(Error::InvalidState("rejected".into()));
                    }
                    *self.label.lock().unwrap() = label;
                    Ok(())
                }
                _ => unimplemented!(),
            }
        }

        fn property(&self, _ctx: &ElementContext, id: usize, _pspec: &PropertySpec) -> Option<Value> {
            match id {
                0 => self.label.lock().unwrap().as_deref().map(|l| l.to_value()),
                1 => Some(7u32.to_value()),
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

    impl BaseSrcImpl for PatternSrc {
        fn start(&self, _ctx: &ElementContext) -> Result<()> {
            if self.running.swap(true, Ordering::SeqCst) {
                return Err(Error::InvalidState("already started".into()));
            }
            Ok(())
        }

        fn stop(&self, _ctx: &ElementContext) -> Result<()> {
            self.running.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn fill(&self, _ctx: &ElementContext, _offset: u64, size: usize, buffer: &mut Buffer) -> FlowStatus {
            let n = size.min(buffer.capacity());
            match buffer.map_writable() {
                Ok(mut map) => map[..n].fill(0xAB),
                Err(_) => return FlowStatus::Error,
            }
            match buffer.set_size(n) {
                Ok(()) => FlowStatus::Ok,
                Err(_) => FlowStatus::Error,
            }
        }
    }

    impl UriHandlerImpl for PatternSrc {
        fn uri(&self) -> Option<String> {
            self.uri.lock().unwrap().clone()
        }

        fn set_uri(&self, _ctx: &ElementContext, uri: &str) -> Result<()> {
            *self.uri.lock().unwrap() = Some(uri.to_string());
            Ok(())
        }
    }

    fn make(name: &str) -> Element {
        let mut klass = ClassBuilder::new();
        PatternSrc::class_init(&mut klass);
        let class = klass
            .build(PatternSrc::NAME, ElementKind::BaseSrc, Interfaces::URI_HANDLER)
            .unwrap();
        Element::new(Arc::new(class), name, Box::new(PatternSrc::new()))
    }

    #[test]
    fn test_property_by_name() {
        let element = make("p0");
        assert_eq!(element.property("label").unwrap(), None);

        element.set_property("label", "hello").unwrap();
        assert_eq!(element.property_as::<String>("label").unwrap().as_deref(), Some("hello"));

        element.clear_property("label").unwrap();
        assert_eq!(element.property("label").unwrap(), None);

        assert_eq!(element.property_as::<u32>("count").unwrap(), Some(7));
    }

    #[test]
    fn test_property_by_name_errors() {
        let element = make("p0");
        assert!(matches!(
            element.set_property("nope", 1i32),
            Err(Error::UnknownProperty(_))
        ));
        assert!(matches!(
            element.set_property("count", 1u32),
            Err(Error::NotWritable(_))
        ));
        assert!(matches!(
            element.set_property("label", 5i32),
            Err(Error::Conversion(_))
        ));
        assert!(matches!(
            element.set_property("label", "a\0b"),
            Err(Error::Conversion(_))
        ));

        element.set_property("label", "kept").unwrap();
        element.start().unwrap();
        assert!(matches!(
            element.set_property("label", "other"),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(element.property_as::<String>("label").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_set_property_value_posts_settings_error() {
        let element = make("p0");
        let (bus, rx) = Bus::new();
        element.set_bus(Some(bus));

        element.set_property_value(0, Some("reject".to_value()));
        element.start().unwrap();
        element.set_property_value(0, Some("late".to_value()));

        let errors = rx.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is_library(LibraryError::Settings)));
        assert_eq!(errors[0].source, "p0");
        assert!(errors[0].message.starts_with("Could not set label on object: "));
        assert!(errors[1].message.contains("whilst running"));
        assert_eq!(element.property_value(0), None);

        element.stop().unwrap();
        element.set_property_value(0, Some("ok".to_value()));
        assert!(rx.try_recv().is_none());
        assert_eq!(element.property_value(0), Some(Value::String("ok".into())));
    }

    #[test]
    fn test_set_property_value_posts_failed_on_conversion() {
        let element = make("p0");
        let (bus, rx) = Bus::new();
        element.set_bus(Some(bus));
        element.set_property_value(0, Some("kept".to_value()));

        element.set_property_value(0, Some(Value::Int(3)));
        element.set_property_value(0, Some(Value::String("a\0b".into())));

        let errors = rx.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is_library(LibraryError::Failed)));
        assert_eq!(errors[0].message, "Could not convert value to set label");
        assert_eq!(errors[0].debug, "type mismatch: expected string, got int");
        assert!(errors[1].debug.contains("interior NUL"));

        // Both write paths agree, and the old value survives.
        assert!(matches!(
            element.set_property("label", Value::String("a\0b".into())),
            Err(Error::Conversion(_))
        ));
        assert_eq!(element.property_value(0), Some(Value::String("kept".into())));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bad_property_index_is_fatal() {
        let element = make("p0");
        element.set_property_value(9, None);
    }

    #[test]
    fn test_create_stamps_metadata() {
        let element = make("p0");
        element.start().unwrap();

        let first = element.create(0, 16).unwrap();
        assert_eq!(first.size(), 16);
        assert!(first.as_slice().iter().all(|b| *b == 0xAB));
        assert_eq!(first.metadata().sequence, 0);
        assert_eq!(first.metadata().offset, Some(0));
        assert_eq!(first.metadata().offset_end, Some(16));

        let second = element.create(0, 4).unwrap();
        assert_eq!(second.metadata().sequence, 1);
        assert!(!element.is_seekable());
    }

    #[test]
    fn test_start_stop_flags() {
        let element = make("p0");
        element.start().unwrap();
        assert!(element.is_started());
        assert!(element.start().is_err());
        assert!(element.is_started());
        element.stop().unwrap();
        element.stop().unwrap();
        assert!(!element.is_started());
    }

    #[test]
    fn test_uri_handler_checks_protocol() {
        let element = make("p0");
        let handler = element.uri_handler().unwrap();
        assert_eq!(handler.uri_type(), UriType::Src);
        assert_eq!(handler.protocols(), ["pattern"]);

        handler.set_uri("pattern://zeros").unwrap();
        assert_eq!(handler.uri().as_deref(), Some("pattern://zeros"));
        assert!(matches!(
            handler.set_uri("http://host"),
            Err(Error::UnsupportedProtocol(_))
        ));
        assert_eq!(handler.uri().as_deref(), Some("pattern://zeros"));
    }

    #[test]
    fn test_pads_and_downcast() {
        let element = make("p0");
        assert_eq!(element.pads().len(), 1);
        assert!(element.static_pad("src").is_some());
        assert!(element.imp::<PatternSrc>().is_some());
    }

    #[test]
    fn test_bus_messages_are_errors() {
        let element = make("p0");
        let (bus, rx) = Bus::new();
        element.set_bus(Some(bus));
        element.set_property_value(1, Some(Value::UInt(1)));
        assert!(matches!(rx.try_recv(), Some(Message::Error(_))));
    }
}
