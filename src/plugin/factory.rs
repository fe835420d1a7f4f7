//! Element factories.

use crate::element::{Element, ElementClass, ElementImpl, ElementKind, Interfaces, ObjectSubclass};
use crate::uri::UriType;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type alias for element constructor functions.
type ElementConstructor = fn() -> Box<dyn ElementImpl>;

fn construct<T: ObjectSubclass>() -> Box<dyn ElementImpl> {
    Box::new(T::new())
}

/// Priority of a factory when several can handle the same request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(pub u32);

impl Rank {
    /// Never chosen automatically.
    pub const NONE: Rank = Rank(0);
    /// Chosen only if nothing better exists.
    pub const MARGINAL: Rank = Rank(64);
    /// Fallback choice.
    pub const SECONDARY: Rank = Rank(128);
    /// Preferred choice.
    pub const PRIMARY: Rank = Rank(256);
}

impl From<u32> for Rank {
    fn from(rank: u32) -> Self {
        Rank(rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered element type.
///
/// Immutable after registration; shared through an `Arc`.
pub struct ElementFactory {
    name: String,
    plugin: String,
    rank: Rank,
    class: Arc<ElementClass>,
    constructor: ElementConstructor,
    instances: AtomicU64,
}

impl ElementFactory {
    pub(crate) fn new<T: ObjectSubclass>(
        name: &str,
        plugin: &str,
        rank: Rank,
        class: Arc<ElementClass>,
    ) -> Self {
        Self {
            name: name.to_string(),
            plugin: plugin.to_string(),
            rank,
            class,
            constructor: construct::<T>,
            instances: AtomicU64::new(0),
        }
    }

    /// Registered element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the plugin that registered this factory.
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    /// Priority.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Base behaviour of the element type.
    pub fn kind(&self) -> ElementKind {
        self.class.kind()
    }

    /// Declared optional capabilities.
    pub fn interfaces(&self) -> Interfaces {
        self.class.interfaces()
    }

    /// Shared class record.
    pub fn class(&self) -> &Arc<ElementClass> {
        &self.class
    }

    /// Check whether this factory handles `uri` in direction `uri_type`.
    ///
    /// Answered from class data, without creating an instance.
    pub fn supports_uri(&self, uri_type: UriType, uri: &str) -> bool {
        self.class
            .uri_info()
            .is_some_and(|info| info.uri_type() == uri_type && info.supports_uri(uri))
    }

    /// Create a fresh instance.
    ///
    /// Unnamed instances are called `<factory><n>`.
    pub fn create(&self, name: Option<&str>) -> Element {
        let n = self.instances.fetch_add(1, Ordering::Relaxed);
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{}{n}", self.name),
        };
        tracing::debug!(factory = %self.name, element = %name, "creating element");
        Element::new(self.class.clone(), name, (self.constructor)()).with_factory(&self.name)
    }
}

impl fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementFactory")
            .field("name", &self.name)
            .field("plugin", &self.plugin)
            .field("rank", &self.rank)
            .field("type", &self.class.type_name())
            .finish()
    }
}
