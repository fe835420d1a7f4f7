//! # debughttp
//!
//! A pull-based HTTP source element, plus the small element-adapter layer it
//! plugs into: typed properties behind a generic value boundary, shared class
//! records, a checked source lifecycle, the buffer-fill protocol and a plugin
//! registry with URI-based element lookup.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use debughttp::prelude::*;
//!
//! # fn main() -> debughttp::Result<()> {
//! let factory = debughttp::register_static()?;
//! let src = Registry::global().make_element(factory, Some("src"))?;
//! src.set_property("location", "https://www.example.com")?;
//! src.start()?;
//!
//! loop {
//!     match src.create(0, 4096) {
//!         Ok(buffer) => println!("{} bytes", buffer.size()),
//!         Err(FlowStatus::EndOfStream) => break,
//!         Err(flow) => panic!("streaming stopped: {flow}"),
//!     }
//! }
//! src.stop()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod bus;
pub mod element;
pub mod elements;
pub mod error;
pub mod flow;
pub mod metadata;
pub mod observability;
pub mod plugin;
pub mod property;
pub mod uri;
pub mod value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::bus::{Bus, BusReceiver, Message};
    pub use crate::element::{BaseSrcImpl, Element, ElementImpl, ObjectSubclass, UriHandlerImpl};
    pub use crate::error::{Error, Result};
    pub use crate::flow::FlowStatus;
    pub use crate::plugin::{Rank, Registry};
    pub use crate::uri::UriType;
    pub use crate::value::{FromValue, ToValue, Value};
}

pub use elements::http::{register, register_static};
pub use error::{Error, Result};
