//! Plugin registry for registered plugins and their element factories.

use super::factory::{ElementFactory, Rank};
use super::metadata::{ABI_VERSION_MAJOR, PluginMetadata};
use crate::element::{ClassBuilder, Element, ElementKind, ElementImpl, Interfaces, ObjectSubclass};
use crate::error::{Error, Result};
use crate::uri::{UriType, uri_protocol};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Plugin initialization function, run once at registration.
pub type PluginInitFn = fn(&mut Plugin) -> Result<()>;

/// A plugin being registered, or registered already.
///
/// Passed to the [`PluginInitFn`], which adds the plugin's element types.
#[derive(Debug)]
pub struct Plugin {
    metadata: PluginMetadata,
    factories: Vec<Arc<ElementFactory>>,
}

impl Plugin {
    fn new(metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            factories: Vec::new(),
        }
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Plugin metadata.
    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Names of the element types this plugin provides.
    pub fn element_names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    /// Register an element type under `name`.
    ///
    /// Builds and validates the class once; the resulting factory is
    /// published when the whole plugin initialized successfully.
    pub fn register_element<T: ObjectSubclass>(
        &mut self,
        name: &str,
        rank: impl Into<Rank>,
        kind: ElementKind,
        interfaces: Interfaces,
    ) -> Result<()> {
        if self.factories.iter().any(|f| f.name() == name) {
            return Err(Error::AlreadyRegistered(name.to_string()));
        }

        let mut klass = ClassBuilder::new();
        T::class_init(&mut klass);
        let class = klass.build(T::NAME, kind, interfaces)?;

        let probe = T::new();
        check_hooks(&probe, T::NAME, kind, interfaces)?;

        let rank = rank.into();
        tracing::debug!(
            plugin = %self.metadata.name,
            element = name,
            rank = rank.0,
            "registering element"
        );
        self.factories.push(Arc::new(ElementFactory::new::<T>(
            name,
            &self.metadata.name,
            rank,
            Arc::new(class),
        )));
        Ok(())
    }
}

/// Check that an implementation provides the hooks its declaration promises.
fn check_hooks(
    imp: &dyn ElementImpl,
    type_name: &str,
    kind: ElementKind,
    interfaces: Interfaces,
) -> Result<()> {
    if kind == ElementKind::BaseSrc && imp.as_base_src().is_none() {
        return Err(Error::Registration(format!(
            "{type_name}: declared as a source but provides no source hooks"
        )));
    }
    if interfaces.uri_handler && imp.as_uri_handler().is_none() {
        return Err(Error::Registration(format!(
            "{type_name}: declared as a URI handler but provides no URI hooks"
        )));
    }
    Ok(())
}

/// Registry for plugins and their element factories.
///
/// Plugins go in whole or not at all. Lookups by factory name and by URI
/// read the element index only; each factory is owned by its plugin.
pub struct Registry {
    /// Registered plugins indexed by name.
    plugins: RwLock<HashMap<String, Arc<Plugin>>>,
    /// Element name -> factory for quick lookup.
    element_index: RwLock<HashMap<String, Arc<ElementFactory>>>,
}

impl Registry {
    /// A registry with nothing registered. Tests use private ones.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            element_index: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a plugin.
    ///
    /// Runs `init` to collect the plugin's elements. Nothing is published
    /// unless `init` succeeds and none of its names clash with what is
    /// already registered.
    pub fn register_plugin(&self, metadata: PluginMetadata, init: PluginInitFn) -> Result<()> {
        if !metadata.is_abi_compatible() {
            return Err(Error::Registration(format!(
                "plugin '{}' built for ABI {}.{}, host is {}",
                metadata.name, metadata.major_version, metadata.minor_version, ABI_VERSION_MAJOR
            )));
        }
        if self.has_plugin(&metadata.name) {
            return Err(Error::AlreadyRegistered(metadata.name));
        }

        let mut plugin = Plugin::new(metadata);
        if let Err(err) = init(&mut plugin) {
            tracing::error!(plugin = %plugin.name(), error = %err, "plugin initialization failed");
            return Err(err);
        }

        let plugin_name = plugin.name().to_string();
        let plugin = Arc::new(plugin);

        let mut plugins = self.plugins.write().unwrap();
        let mut index = self.element_index.write().unwrap();

        if plugins.contains_key(&plugin_name) {
            return Err(Error::AlreadyRegistered(plugin_name));
        }
        if let Some(clash) = plugin.factories.iter().find(|f| index.contains_key(f.name())) {
            return Err(Error::AlreadyRegistered(clash.name().to_string()));
        }

        for factory in &plugin.factories {
            index.insert(factory.name().to_string(), factory.clone());
        }
        tracing::debug!(
            plugin = %plugin_name,
            elements = plugin.factories.len(),
            "plugin registered"
        );
        plugins.insert(plugin_name, plugin);
        Ok(())
    }

    /// Check if a plugin is registered.
    pub fn has_plugin(&self, name: &str) -> bool {
        let plugins = self.plugins.read().unwrap();
        plugins.contains_key(name)
    }

    /// Get the metadata of a registered plugin.
    pub fn plugin_metadata(&self, name: &str) -> Option<PluginMetadata> {
        let plugins = self.plugins.read().unwrap();
        plugins.get(name).map(|p| p.metadata().clone())
    }

    /// List all registered plugins, sorted by name.
    pub fn list_plugins(&self) -> Vec<String> {
        let plugins = self.plugins.read().unwrap();
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all available elements, sorted by name.
    pub fn list_elements(&self) -> Vec<String> {
        let index = self.element_index.read().unwrap();
        let mut names: Vec<String> = index.keys().cloned().collect();
        names.sort();
        names
    }

    /// True if some plugin provides `name`.
    pub fn has_element(&self, name: &str) -> bool {
        let index = self.element_index.read().unwrap();
        index.contains_key(name)
    }

    /// Look up an element factory by name.
    pub fn find_factory(&self, name: &str) -> Option<Arc<ElementFactory>> {
        let index = self.element_index.read().unwrap();
        index.get(name).cloned()
    }

    /// Factories handling `uri` in direction `uri_type`, highest rank first.
    ///
    /// Ties are broken by factory name.
    pub fn factories_for_uri(&self, uri_type: UriType, uri: &str) -> Vec<Arc<ElementFactory>> {
        let index = self.element_index.read().unwrap();
        let mut factories: Vec<Arc<ElementFactory>> = index
            .values()
            .filter(|f| f.supports_uri(uri_type, uri))
            .cloned()
            .collect();
        factories.sort_by(|a, b| b.rank().cmp(&a.rank()).then_with(|| a.name().cmp(b.name())));
        factories
    }

    /// Create an element by factory name.
    pub fn make_element(&self, factory: &str, name: Option<&str>) -> Result<Element> {
        let factory = self
            .find_factory(factory)
            .ok_or_else(|| Error::ElementNotFound(factory.to_string()))?;
        Ok(factory.create(name))
    }

    /// Create an element that handles `uri`, configured with it.
    ///
    /// Factories are tried by rank; rank [`Rank::NONE`] is never chosen.
    /// The first instance whose URI handler accepts `uri` is returned.
    pub fn make_element_from_uri(
        &self,
        uri_type: UriType,
        uri: &str,
        name: Option<&str>,
    ) -> Result<Element> {
        let protocol = uri_protocol(uri)?;

        for factory in self
            .factories_for_uri(uri_type, uri)
            .into_iter()
            .filter(|f| f.rank() > Rank::NONE)
        {
            let element = factory.create(name);
            let accepted = match element.uri_handler() {
                Some(handler) => handler.set_uri(uri),
                None => Err(Error::NoUriHandler(factory.name().to_string())),
            };
            match accepted {
                Ok(()) => return Ok(element),
                Err(err) => {
                    tracing::debug!(factory = %factory.name(), uri = uri, error = %err, "factory rejected URI");
                }
            }
        }

        tracing::warn!(uri = uri, protocol = %protocol, direction = %uri_type, "no element handles URI");
        Err(Error::UnsupportedProtocol(uri.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugins = self.plugins.read().unwrap();
        let elements = self.element_index.read().unwrap();
        f.debug_struct("Registry")
            .field("plugins", &plugins.len())
            .field("elements", &elements.len())
            .finish()
    }
}
