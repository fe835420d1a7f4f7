//! Registration of the `debughttp` plugin.

use super::src::DebugHttpSrc;
use crate::element::{ElementKind, Interfaces};
use crate::error::Result;
use crate::plugin::{License, Plugin, PluginMetadata, Rank, Registry};

/// Plugin name.
pub const PLUGIN_NAME: &str = "debughttp";

/// Element (factory) name of [`DebugHttpSrc`].
pub const ELEMENT_NAME: &str = "debughttpsrc";

/// Rank of the source; above [`Rank::PRIMARY`] so it wins URI lookups.
pub const RANK: Rank = Rank(512);

/// Metadata of the `debughttp` plugin.
pub fn metadata() -> PluginMetadata {
    PluginMetadata::new(PLUGIN_NAME, "HTTP Client with debug capabilities")
        .version("v0.0.1")
        .license(License::Lgpl)
        .source("debug-http", "Debug")
        .origin("https://github.com/cognitive-i/go-gst")
        .release_date("2021-08-17")
}

fn plugin_init(plugin: &mut Plugin) -> Result<()> {
    plugin.register_element::<DebugHttpSrc>(
        ELEMENT_NAME,
        RANK,
        ElementKind::BaseSrc,
        Interfaces::URI_HANDLER,
    )
}

/// Register the plugin into `registry`.
///
/// Returns the element name to create sources with. A second call on the
/// same registry fails with [`Error::AlreadyRegistered`](crate::Error::AlreadyRegistered).
pub fn register(registry: &Registry) -> Result<&'static str> {
    registry.register_plugin(metadata(), plugin_init)?;
    Ok(ELEMENT_NAME)
}

/// Register the plugin into the process-wide registry.
pub fn register_static() -> Result<&'static str> {
    register(Registry::global())
}
