//! Element adapter layer.
//!
//! This module defines how an element type plugs into the host:
//!
//! - [`ObjectSubclass`]: constructs instances and describes the class once
//! - [`ElementImpl`]: generic property hooks
//! - [`BaseSrcImpl`]: pull-based source hooks (`start`, `stop`, `fill`)
//! - [`UriHandlerImpl`]: per-instance URI get/set
//! - [`ElementClass`]: the frozen, shared class record
//! - [`Element`]: the host-side instance wrapper
//! - [`SourceState`]: the checked lifecycle state machine of a source
//!
//! # Design
//!
//! Class data (metadata, pad templates, properties, URI info) is built once
//! per type and shared by every instance through an `Arc`. Instance state
//! lives in the implementation behind `&self`, so hooks can be called
//! concurrently from an application thread and a streaming thread; each
//! implementation guards its own state.

mod class;
mod context;
mod instance;
mod pad;
mod state;
mod traits;

pub use class::{ClassBuilder, ElementClass, ElementKind, ElementMetadata, Interfaces};
pub use context::ElementContext;
pub use instance::{Element, UriHandler};
pub use pad::{Caps, Pad, PadDirection, PadList, PadPresence, PadTemplate};
pub use state::{SourceEvent, SourceState};
pub use traits::{BaseSrcImpl, ElementImpl, ObjectSubclass, UriHandlerImpl};
