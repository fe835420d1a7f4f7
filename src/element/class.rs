//! Element class records.
//!
//! An [`ElementClass`] holds everything that is shared by all instances of
//! an element type: human metadata, pad templates, the property table and,
//! for URI handlers, the URI direction and protocols. It is built exactly
//! once per type by [`ObjectSubclass::class_init`] through a
//! [`ClassBuilder`], validated, and then frozen behind an `Arc`.
//!
//! [`ObjectSubclass::class_init`]: super::ObjectSubclass::class_init

use super::pad::{PadDirection, PadPresence, PadTemplate};
use crate::error::{Error, Result};
use crate::property::{PropertySpec, PropertyTable};
use crate::uri::{UriInfo, UriType};
use smallvec::SmallVec;
use std::sync::Arc;

/// Human-readable element metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMetadata {
    /// Display name (e.g. "Debug HTTP Source").
    pub long_name: String,
    /// Slash-separated category (e.g. "Source/Network").
    pub classification: String,
    /// What the element does.
    pub description: String,
    /// Author or origin.
    pub author: String,
}

impl ElementMetadata {
    /// Create element metadata.
    pub fn new(
        long_name: impl Into<String>,
        classification: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            long_name: long_name.into(),
            classification: classification.into(),
            description: description.into(),
            author: author.into(),
        }
    }
}

/// Base behaviour an element type extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Plain element with no data-flow hooks.
    Element,
    /// Pull-based source with start/stop/fill hooks.
    BaseSrc,
}

/// Optional capabilities an element type implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Interfaces {
    /// The element can be created and configured from a URI.
    pub uri_handler: bool,
}

impl Interfaces {
    /// No optional capabilities.
    pub const NONE: Self = Self { uri_handler: false };

    /// URI handler capability.
    pub const URI_HANDLER: Self = Self { uri_handler: true };
}

/// Collects class data during [`ObjectSubclass::class_init`].
///
/// [`ObjectSubclass::class_init`]: super::ObjectSubclass::class_init
#[derive(Debug, Default)]
pub struct ClassBuilder {
    metadata: Option<ElementMetadata>,
    pad_templates: SmallVec<[PadTemplate; 2]>,
    properties: Option<Vec<PropertySpec>>,
    uri: Option<UriInfo>,
    errors: Vec<String>,
}

impl ClassBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the human metadata.
    pub fn set_metadata(
        &mut self,
        long_name: &str,
        classification: &str,
        description: &str,
        author: &str,
    ) {
        self.metadata = Some(ElementMetadata::new(
            long_name,
            classification,
            description,
            author,
        ));
    }

    /// Declare a pad template.
    pub fn add_pad_template(&mut self, template: PadTemplate) {
        if self.pad_templates.iter().any(|t| t.name == template.name) {
            self.errors
                .push(format!("duplicate pad template '{}'", template.name));
            return;
        }
        self.pad_templates.push(template);
    }

    /// Install the property set. Can only be done once.
    pub fn install_properties(&mut self, properties: Vec<PropertySpec>) {
        if self.properties.is_some() {
            self.errors.push("properties installed twice".into());
            return;
        }
        self.properties = Some(properties);
    }

    /// Register the URI handler direction and protocols.
    pub fn set_uri_handler(&mut self, uri_type: UriType, protocols: &[&str]) {
        self.uri = Some(UriInfo::new(uri_type, protocols));
    }

    /// Validate and freeze into an [`ElementClass`].
    pub(crate) fn build(
        self,
        type_name: &'static str,
        kind: ElementKind,
        interfaces: Interfaces,
    ) -> Result<ElementClass> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(Error::Registration(format!("{type_name}: {err}")));
        }

        let metadata = self.metadata.ok_or_else(|| {
            Error::Registration(format!("{type_name}: element metadata not set"))
        })?;

        if kind == ElementKind::BaseSrc {
            let has_always_src = self
                .pad_templates
                .iter()
                .any(|t| t.direction == PadDirection::Src && t.presence == PadPresence::Always);
            if !has_always_src {
                return Err(Error::Registration(format!(
                    "{type_name}: a source needs an always-present src pad template"
                )));
            }
            if self
                .pad_templates
                .iter()
                .any(|t| t.direction == PadDirection::Sink)
            {
                return Err(Error::Registration(format!(
                    "{type_name}: a source cannot have sink pad templates"
                )));
            }
        }

        let uri = match (interfaces.uri_handler, self.uri) {
            (true, Some(info)) if !info.protocols().is_empty() => Some(info),
            (true, Some(_)) => {
                return Err(Error::Registration(format!(
                    "{type_name}: URI handler declares no protocols"
                )));
            }
            (true, None) => {
                return Err(Error::Registration(format!(
                    "{type_name}: URI handler capability declared without URI info"
                )));
            }
            (false, Some(_)) => {
                return Err(Error::Registration(format!(
                    "{type_name}: URI info set but URI handler capability not declared"
                )));
            }
            (false, None) => None,
        };

        let properties = PropertyTable::new(self.properties.unwrap_or_default())
            .map_err(|e| Error::Registration(format!("{type_name}: {e}")))?;

        Ok(ElementClass {
            type_name,
            kind,
            interfaces,
            metadata,
            pad_templates: self.pad_templates.into_iter().map(Arc::new).collect(),
            properties,
            uri,
        })
    }
}

/// Immutable, shared description of an element type.
#[derive(Debug)]
pub struct ElementClass {
    type_name: &'static str,
    kind: ElementKind,
    interfaces: Interfaces,
    metadata: ElementMetadata,
    pad_templates: SmallVec<[Arc<PadTemplate>; 2]>,
    properties: PropertyTable,
    uri: Option<UriInfo>,
}

impl ElementClass {
    /// Rust type name of the implementation.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Base behaviour.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Declared optional capabilities.
    pub fn interfaces(&self) -> Interfaces {
        self.interfaces
    }

    /// Human metadata.
    pub fn metadata(&self) -> &ElementMetadata {
        &self.metadata
    }

    /// Declared pad templates.
    pub fn pad_templates(&self) -> &[Arc<PadTemplate>] {
        &self.pad_templates
    }

    /// Look up a pad template by name.
    pub fn pad_template(&self, name: &str) -> Option<&Arc<PadTemplate>> {
        self.pad_templates.iter().find(|t| t.name == name)
    }

    /// Installed properties.
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// URI information, if the type is a URI handler.
    pub fn uri_info(&self) -> Option<&UriInfo> {
        self.uri.as_ref()
    }

    /// URI handler direction, if any.
    pub fn uri_type(&self) -> Option<UriType> {
        self.uri.as_ref().map(UriInfo::uri_type)
    }

    /// Supported URI protocols (empty if not a URI handler).
    pub fn protocols(&self) -> &[String] {
        self.uri.as_ref().map(UriInfo::protocols).unwrap_or(&[])
    }
}
