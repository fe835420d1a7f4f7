//! Pads and pad templates.
//!
//! A type declares its pads once, as [`PadTemplate`]s in `class_init`. Each
//! [`Element`](super::Element) materializes the `Always` templates into
//! [`Pad`]s when it is created; other presences are never instantiated here.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Which way data crosses a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadDirection {
    /// Data leaves the element.
    Src,
    /// Data enters the element.
    Sink,
}

/// When instances of a template exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadPresence {
    /// From creation to drop.
    Always,
    /// Appears once the element has seen its input.
    Sometimes,
    /// Only when the host asks for one.
    Request,
}

/// Media formats a pad can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caps {
    /// Unconstrained. Sources that don't inspect their bytes use this.
    Any,
    /// A set of media types, e.g. `"application/x-hls"`.
    MediaTypes(SmallVec<[String; 2]>),
}

impl Caps {
    /// Unconstrained caps.
    pub fn any() -> Self {
        Caps::Any
    }

    /// Caps with exactly one media type.
    pub fn media_type(media_type: impl Into<String>) -> Self {
        Caps::MediaTypes(SmallVec::from_iter([media_type.into()]))
    }

    /// True for [`Caps::Any`].
    pub fn is_any(&self) -> bool {
        matches!(self, Caps::Any)
    }

    /// True when both sides share at least one media type.
    pub fn can_intersect(&self, other: &Caps) -> bool {
        match (self, other) {
            (Caps::Any, _) | (_, Caps::Any) => true,
            (Caps::MediaTypes(ours), Caps::MediaTypes(theirs)) => {
                ours.iter().any(|t| theirs.contains(t))
            }
        }
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caps::Any => f.write_str("ANY"),
            Caps::MediaTypes(types) => f.write_str(&types.join("; ")),
        }
    }
}

/// Class-level pad declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadTemplate {
    /// Pad name, or a pattern such as `"src_%u"` for dynamic pads.
    pub name: String,
    /// Data direction.
    pub direction: PadDirection,
    /// Lifetime of pads made from this template.
    pub presence: PadPresence,
    /// Carried formats.
    pub caps: Caps,
}

impl PadTemplate {
    /// Declare a template.
    pub fn new(
        name: impl Into<String>,
        direction: PadDirection,
        presence: PadPresence,
        caps: Caps,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            presence,
            caps,
        }
    }

    /// `Always` output template; what every source declares.
    pub fn src(name: impl Into<String>, caps: Caps) -> Self {
        Self::new(name, PadDirection::Src, PadPresence::Always, caps)
    }

    /// `Always` input template.
    pub fn sink(name: impl Into<String>, caps: Caps) -> Self {
        Self::new(name, PadDirection::Sink, PadPresence::Always, caps)
    }

    /// `Sometimes` output template.
    pub fn sometimes_src(name: impl Into<String>, caps: Caps) -> Self {
        Self::new(name, PadDirection::Src, PadPresence::Sometimes, caps)
    }
}

/// A materialized pad of one element.
#[derive(Debug, Clone)]
pub struct Pad {
    name: String,
    template: Arc<PadTemplate>,
}

impl Pad {
    /// Materialize `template` under `name`.
    pub fn from_template(template: Arc<PadTemplate>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }

    /// Pad name, unique within its element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data direction, taken from the template.
    pub fn direction(&self) -> PadDirection {
        self.template.direction
    }

    /// True for output pads.
    pub fn is_src(&self) -> bool {
        self.direction() == PadDirection::Src
    }

    /// Declaring template.
    pub fn template(&self) -> &Arc<PadTemplate> {
        &self.template
    }

    /// Carried formats.
    pub fn caps(&self) -> &Caps {
        &self.template.caps
    }
}

/// Pads of one element. Sources have exactly one.
#[derive(Debug, Default, Clone)]
pub struct PadList {
    pads: SmallVec<[Pad; 2]>,
}

impl PadList {
    /// Materialize the `Always` templates of a class.
    pub fn from_templates(templates: &[Arc<PadTemplate>]) -> Self {
        let pads = templates
            .iter()
            .filter(|t| t.presence == PadPresence::Always)
            .map(|t| Pad::from_template(Arc::clone(t), t.name.clone()))
            .collect();
        Self { pads }
    }

    /// Look up a pad by name.
    pub fn get(&self, name: &str) -> Option<&Pad> {
        self.pads.iter().find(|pad| pad.name == name)
    }

    /// Output pads only.
    pub fn srcs(&self) -> impl Iterator<Item = &Pad> {
        self.pads.iter().filter(|pad| pad.is_src())
    }

    /// All pads, in template order.
    pub fn iter(&self) -> impl Iterator<Item = &Pad> {
        self.pads.iter()
    }

    /// Number of pads.
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    /// True when the element has no pads.
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}
