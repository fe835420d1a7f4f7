//! Flow status returned by pull operations.
//!
//! The streaming thread keeps pulling from a source until it sees anything
//! other than [`FlowStatus::Ok`].

use std::fmt;

/// Outcome of a fill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStatus {
    /// Bytes were produced.
    Ok,
    /// No more data; the stream concluded cleanly.
    EndOfStream,
    /// Unrecoverable condition; the stream is terminated.
    Error,
    /// Downstream is not linked (host-defined, passed through).
    NotLinked,
    /// The pad is flushing (host-defined, passed through).
    Flushing,
}

impl FlowStatus {
    /// Whether the streaming thread should keep pulling.
    pub fn is_ok(&self) -> bool {
        matches!(self, FlowStatus::Ok)
    }

    /// Whether this status terminates the stream.
    pub fn is_terminal(&self) -> bool {
        !self.is_ok()
    }

    /// `Ok(())` for [`FlowStatus::Ok`], `Err(self)` for everything else.
    pub fn into_result(self) -> Result<(), FlowStatus> {
        match self {
            FlowStatus::Ok => Ok(()),
            other => Err(other),
        }
    }

    /// Short name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            FlowStatus::Ok => "ok",
            FlowStatus::EndOfStream => "eos",
            FlowStatus::Error => "error",
            FlowStatus::NotLinked => "not-linked",
            FlowStatus::Flushing => "flushing",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
