//! Element implementation traits.
//!
//! An element type is split in two halves. The static half,
//! [`ObjectSubclass`], constructs instances and describes the class once.
//! The dynamic half is a set of object-safe hook traits called by the host
//! wrapper [`Element`](super::Element) with the per-instance
//! [`ElementContext`]:
//!
//! - [`ElementImpl`]: generic property access, always present
//! - [`BaseSrcImpl`]: pull-based source hooks (`start`, `stop`, `fill`)
//! - [`UriHandlerImpl`]: per-instance URI get/set
//!
//! # Example
//!
//! ```rust
//! use debughttp::buffer::Buffer;
//! use debughttp::element::{
//!     BaseSrcImpl, Caps, ClassBuilder, ElementContext, ElementImpl, ObjectSubclass, PadTemplate,
//! };
//! use debughttp::error::Result;
//! use debughttp::flow::FlowStatus;
//!
//! struct ZeroSrc;
//!
//! impl ObjectSubclass for ZeroSrc {
//!     const NAME: &'static str = "ZeroSrc";
//!
//!     fn new() -> Self {
//!         ZeroSrc
//!     }
//!
//!     fn class_init(klass: &mut ClassBuilder) {
//!         klass.set_metadata("Zero Source", "Source", "Produces zeros", "docs");
//!         klass.add_pad_template(PadTemplate::src("src", Caps::any()));
//!     }
//! }
//!
//! impl ElementImpl for ZeroSrc {
//!     fn as_base_src(&self) -> Option<&dyn BaseSrcImpl> {
//!         Some(self)
//!     }
//! }
//!
//! impl BaseSrcImpl for ZeroSrc {
//!     fn start(&self, _ctx: &ElementContext) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&self, _ctx: &ElementContext) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn fill(&self, _ctx: &ElementContext, _offset: u64, size: usize, buffer: &mut Buffer) -> FlowStatus {
//!         let n = size.min(buffer.capacity());
//!         match buffer.map_writable() {
//!             Ok(mut map) => map[..n].fill(0),
//!             Err(_) => return FlowStatus::Error,
//!         }
//!         match buffer.set_size(n) {
//!             Ok(()) => FlowStatus::Ok,
//!             Err(_) => FlowStatus::Error,
//!         }
//!     }
//! }
//! ```

use super::class::ClassBuilder;
use super::context::ElementContext;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::flow::FlowStatus;
use crate::property::PropertySpec;
use crate::value::Value;
use std::any::Any;

/// Static half of an element type.
pub trait ObjectSubclass: ElementImpl + Sized {
    /// Type name, used in logs and class validation errors.
    const NAME: &'static str;

    /// Construct a fresh instance.
    fn new() -> Self;

    /// Describe the class. Called once, at registration.
    fn class_init(klass: &mut ClassBuilder);
}

/// Generic hooks every element implements.
pub trait ElementImpl: Any + Send + Sync {
    /// Set a property from a generic value.
    ///
    /// `id` is the property's index in the class table, `pspec` its
    /// descriptor. The host has already checked writability and that
    /// `value`, if present, has the declared type. `None` clears the
    /// property to its empty form.
    fn set_property(
        &self,
        _ctx: &ElementContext,
        _id: usize,
        _value: Option<&Value>,
        pspec: &PropertySpec,
    ) -> Result<()> {
        Err(Error::UnknownProperty(pspec.name().to_string()))
    }

    /// Read a property as a generic value.
    ///
    /// `None` means the property has no value.
    fn property(&self, _ctx: &ElementContext, _id: usize, _pspec: &PropertySpec) -> Option<Value> {
        None
    }

    /// Source hooks, if this element is a [`ElementKind::BaseSrc`](super::ElementKind::BaseSrc).
    fn as_base_src(&self) -> Option<&dyn BaseSrcImpl> {
        None
    }

    /// URI hooks, if this element declares [`Interfaces::URI_HANDLER`](super::Interfaces::URI_HANDLER).
    fn as_uri_handler(&self) -> Option<&dyn UriHandlerImpl> {
        None
    }
}

/// Hooks of a pull-based source.
///
/// # Lifecycle
///
/// - `start()` opens the upstream resource
/// - `fill()` is called repeatedly by the streaming thread
/// - `stop()` releases the resource; it must be idempotent
pub trait BaseSrcImpl: Send + Sync {
    /// Open the upstream resource.
    fn start(&self, ctx: &ElementContext) -> Result<()>;

    /// Release the upstream resource.
    fn stop(&self, ctx: &ElementContext) -> Result<()>;

    /// Whether random access is supported.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Fill `buffer` with up to `size` bytes read at `offset`.
    ///
    /// The implementation sets the buffer's size to the number of bytes
    /// written on every return path.
    fn fill(&self, ctx: &ElementContext, offset: u64, size: usize, buffer: &mut Buffer)
    -> FlowStatus;
}

/// Per-instance half of the URI handler capability.
pub trait UriHandlerImpl: Send + Sync {
    /// Current URI, if one is configured.
    fn uri(&self) -> Option<String>;

    /// Configure the element from `uri`.
    ///
    /// The host has already checked the protocol against the class.
    fn set_uri(&self, ctx: &ElementContext, uri: &str) -> Result<()>;
}
