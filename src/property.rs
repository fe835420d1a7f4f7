//! Property descriptors.
//!
//! Every element type installs an ordered [`PropertyTable`] once, at class
//! initialization. The host then addresses properties by their position in
//! that table, so the order is part of the element's contract and never
//! changes after installation.

use crate::error::{Error, Result};
use crate::value::{Value, ValueType};

/// Access flags of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    /// The property can be read.
    pub readable: bool,
    /// The property can be written.
    pub writable: bool,
    /// The property can only be written while the element is not started.
    pub mutable_ready: bool,
}

impl PropertyFlags {
    /// Readable and writable.
    pub const READWRITE: Self = Self {
        readable: true,
        writable: true,
        mutable_ready: false,
    };

    /// Readable only.
    pub const READABLE: Self = Self {
        readable: true,
        writable: false,
        mutable_ready: false,
    };

    /// Writable only.
    pub const WRITABLE: Self = Self {
        readable: false,
        writable: true,
        mutable_ready: false,
    };
}

/// Describes one configurable attribute of an element type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    index: usize,
    name: String,
    nick: String,
    blurb: String,
    value_type: ValueType,
    default: Option<Value>,
    flags: PropertyFlags,
}

impl PropertySpec {
    /// Start describing a property.
    pub fn builder(name: impl Into<String>, value_type: ValueType) -> PropertySpecBuilder {
        let name = name.into();
        PropertySpecBuilder {
            nick: name.clone(),
            name,
            blurb: String::new(),
            value_type,
            default: None,
            flags: PropertyFlags::READWRITE,
        }
    }

    /// Position in the installed table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Canonical name (e.g. `"location"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short human label.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Longer human description.
    pub fn blurb(&self) -> &str {
        &self.blurb
    }

    /// Declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Default value (`None` = absent).
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Access flags.
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Whether the property can be read.
    pub fn is_readable(&self) -> bool {
        self.flags.readable
    }

    /// Whether the property can be written (in some state).
    pub fn is_writable(&self) -> bool {
        self.flags.writable
    }
}

/// Builder for [`PropertySpec`].
#[derive(Debug, Clone)]
pub struct PropertySpecBuilder {
    name: String,
    nick: String,
    blurb: String,
    value_type: ValueType,
    default: Option<Value>,
    flags: PropertyFlags,
}

impl PropertySpecBuilder {
    /// Set the short human label.
    pub fn nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = nick.into();
        self
    }

    /// Set the longer description.
    pub fn blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Readable and writable (the default).
    pub fn readwrite(mut self) -> Self {
        self.flags.readable = true;
        self.flags.writable = true;
        self
    }

    /// Readable only.
    pub fn read_only(mut self) -> Self {
        self.flags.readable = true;
        self.flags.writable = false;
        self
    }

    /// Writable only.
    pub fn write_only(mut self) -> Self {
        self.flags.readable = false;
        self.flags.writable = true;
        self
    }

    /// Only writable while the element is not started.
    pub fn mutable_ready(mut self) -> Self {
        self.flags.mutable_ready = true;
        self
    }

    /// Finish the descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the default value does not match the declared type. This is
    /// a bug in the element's class definition.
    pub fn build(self) -> PropertySpec {
        if let Some(default) = &self.default {
            assert!(
                default.conforms_to(self.value_type),
                "default for property '{}' is {}, declared {}",
                self.name,
                default.value_type(),
                self.value_type
            );
        }

        PropertySpec {
            index: 0,
            name: self.name,
            nick: self.nick,
            blurb: self.blurb,
            value_type: self.value_type,
            default: self.default,
            flags: self.flags,
        }
    }
}

/// The ordered, immutable property set of an element type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    specs: Vec<PropertySpec>,
}

impl PropertyTable {
    /// Install properties, assigning indices in order.
    ///
    /// Fails if two properties share a name.
    pub fn new(specs: Vec<PropertySpec>) -> Result<Self> {
        let mut installed: Vec<PropertySpec> = Vec::with_capacity(specs.len());
        for (index, mut spec) in specs.into_iter().enumerate() {
            if installed.iter().any(|s| s.name == spec.name) {
                return Err(Error::Registration(format!(
                    "duplicate property '{}'",
                    spec.name
                )));
            }
            spec.index = index;
            installed.push(spec);
        }
        Ok(Self { specs: installed })
    }

    /// The full ordered sequence.
    pub fn describe(&self) -> &[PropertySpec] {
        &self.specs
    }

    /// Recover the descriptor for a host-supplied index.
    pub fn resolve(&self, index: usize) -> Result<&PropertySpec> {
        self.specs.get(index).ok_or(Error::PropertyIndex {
            index,
            len: self.specs.len(),
        })
    }

    /// Look up a descriptor by name.
    pub fn find(&self, name: &str) -> Option<&PropertySpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Number of installed properties.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if no properties are installed.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
