//! Plugin metadata and host ABI version.

use std::fmt;

/// Major version of the host ABI. Plugins built against another major
/// version are rejected.
pub const ABI_VERSION_MAJOR: u32 = 1;

/// Minor version of the host ABI.
pub const ABI_VERSION_MINOR: u32 = 0;

/// License of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum License {
    /// GNU Lesser General Public License.
    Lgpl,
    /// GNU General Public License.
    Gpl,
    /// MIT license.
    Mit,
    /// BSD license.
    Bsd,
    /// Mozilla Public License 2.0.
    Mpl,
    /// Proprietary license.
    Proprietary,
}

impl License {
    /// License tag as shown in plugin listings.
    pub fn tag(&self) -> &'static str {
        match self {
            License::Lgpl => "LGPL",
            License::Gpl => "GPL",
            License::Mit => "MIT/X11",
            License::Bsd => "BSD",
            License::Mpl => "MPL",
            License::Proprietary => "Proprietary",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Static description of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Host ABI major version the plugin was built against.
    pub major_version: u32,
    /// Host ABI minor version the plugin was built against.
    pub minor_version: u32,
    /// Unique plugin name.
    pub name: String,
    /// What the plugin provides.
    pub description: String,
    /// Plugin version string.
    pub version: String,
    /// License.
    pub license: License,
    /// Source module name.
    pub source: String,
    /// Package name.
    pub package: String,
    /// Where the plugin comes from.
    pub origin: String,
    /// Release date (`YYYY-MM-DD`).
    pub release_date: String,
}

impl PluginMetadata {
    /// Create metadata for the current host ABI.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            major_version: ABI_VERSION_MAJOR,
            minor_version: ABI_VERSION_MINOR,
            name: name.into(),
            description: description.into(),
            version: String::new(),
            license: License::Lgpl,
            source: String::new(),
            package: String::new(),
            origin: String::new(),
            release_date: String::new(),
        }
    }

    /// Set the version string.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the license.
    pub fn license(mut self, license: License) -> Self {
        self.license = license;
        self
    }

    /// Set the source module and package names.
    pub fn source(mut self, source: impl Into<String>, package: impl Into<String>) -> Self {
        self.source = source.into();
        self.package = package.into();
        self
    }

    /// Set the origin.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the release date.
    pub fn release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = date.into();
        self
    }

    /// Check if the plugin was built against a compatible host ABI.
    pub fn is_abi_compatible(&self) -> bool {
        self.major_version == ABI_VERSION_MAJOR
    }
}
