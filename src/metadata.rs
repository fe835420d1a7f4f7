//! Per-buffer stream position.

/// Where a buffer sits in its stream.
///
/// Stamped by [`Element::create`](crate::element::Element::create); a
/// caller-provided buffer passed to `fill` keeps whatever it had.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Buffers produced since the element was created, starting at 0.
    pub sequence: u64,

    /// First byte covered, when known.
    pub offset: Option<u64>,

    /// One past the last byte covered.
    pub offset_end: Option<u64>,

    /// Data before this buffer is missing or unrelated.
    pub discont: bool,
}

impl Metadata {
    /// Metadata for the `sequence`-th buffer.
    pub fn with_sequence(sequence: u64) -> Self {
        Self {
            sequence,
            discont: sequence == 0,
            ..Default::default()
        }
    }

    /// Cover `len` bytes starting at `offset`.
    pub fn with_range(mut self, offset: u64, len: u64) -> Self {
        self.offset = Some(offset);
        self.offset_end = Some(offset.saturating_add(len));
        self
    }

    /// Number of bytes covered, when the range is known.
    pub fn byte_len(&self) -> Option<u64> {
        match (self.offset, self.offset_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
