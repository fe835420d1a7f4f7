//! Plugin system for registering element types.
//!
//! A plugin is a named bundle of element types, registered once through an
//! explicit init function:
//!
//! ```rust,ignore
//! use debughttp::element::{ElementKind, Interfaces};
//! use debughttp::plugin::{Plugin, PluginMetadata, Rank, Registry};
//!
//! fn plugin_init(plugin: &mut Plugin) -> debughttp::Result<()> {
//!     plugin.register_element::<MySrc>("mysrc", Rank::PRIMARY, ElementKind::BaseSrc, Interfaces::NONE)
//! }
//!
//! Registry::global().register_plugin(PluginMetadata::new("my", "My elements"), plugin_init)?;
//! let src = Registry::global().make_element("mysrc", None)?;
//! ```
//!
//! Shared-library loading is not supported; plugins are linked statically.

mod factory;
mod metadata;
mod registry;

pub use factory::{ElementFactory, Rank};
pub use metadata::{ABI_VERSION_MAJOR, ABI_VERSION_MINOR, License, PluginMetadata};
pub use registry::{Plugin, PluginInitFn, Registry};
