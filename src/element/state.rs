//! Source lifecycle state machine.
//!
//! ```text
//!   Idle ──SetLocation──▶ Configured ──Start──▶ Started ──Stop──▶ Stopped
//!                              ▲                                    │
//!                              └───────────── SetLocation ──────────┘
//! ```
//!
//! Setting an empty location from any non-started state goes back to
//! `Idle`. `Stopped` can also be started again directly.
//!
//! All legality checks live in [`SourceState::transition`]; callers apply the
//! returned state only once the side effect (connect, close) succeeded.

use crate::error::{Error, Result};
use std::fmt;

/// Lifecycle state of a source element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SourceState {
    /// No location configured.
    #[default]
    Idle,
    /// Location configured, no upstream open.
    Configured,
    /// Upstream open, streaming.
    Started,
    /// Upstream closed after streaming.
    Stopped,
}

/// Input to [`SourceState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// The location is being replaced.
    SetLocation {
        /// The new location is absent or empty.
        empty: bool,
    },
    /// An upstream connection is requested.
    Start {
        /// A location is configured.
        has_location: bool,
    },
    /// Opening the upstream failed.
    StartFailed,
    /// The upstream is being released.
    Stop,
}

impl SourceState {
    /// Compute the state following `event`, or the reason it is illegal.
    pub fn transition(self, event: SourceEvent) -> Result<SourceState> {
        use SourceEvent::*;
        use SourceState::*;

        match (self, event) {
            (Started, SetLocation { .. }) => Err(Error::InvalidState(
                "cannot change location whilst running".into(),
            )),
            (_, SetLocation { empty: true }) => Ok(Idle),
            (_, SetLocation { empty: false }) => Ok(Configured),

            (Started, Start { .. }) => Err(Error::InvalidState("already started".into())),
            (_, Start { has_location: false }) | (Idle, Start { .. }) => {
                Err(Error::Connection("no location".into()))
            }
            (Configured | Stopped, Start { has_location: true }) => Ok(Started),

            (Configured | Stopped, StartFailed) => Ok(self),
            (Idle | Started, StartFailed) => Err(Error::InvalidState(format!(
                "start cannot have failed in state {self}"
            ))),

            (Started, Stop) => Ok(Stopped),
            (_, Stop) => Ok(self),
        }
    }

    /// Check if an upstream is open.
    pub fn is_started(self) -> bool {
        self == SourceState::Started
    }

    /// State name as used in logs.
    pub fn name(self) -> &'static str {
        match self {
            SourceState::Idle => "idle",
            SourceState::Configured => "configured",
            SourceState::Started => "started",
            SourceState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
