//! Presence states and their static classifications

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Enumerated availability status of an agent
///
/// Wire names are the platform's upper-case strings. Anything the platform
/// sends that is not listed here decodes to [`PresenceState::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceState {
    /// Transitional login state
    Login,
    /// Logged out of the platform
    Logout,
    /// Ready for work
    Ready,
    /// Logged in but not ready
    NotReady,
    /// Available for a task
    Available,
    /// On a call
    Talking,
    /// Wrap-up, ready afterwards
    WorkReady,
    /// Wrap-up, not ready afterwards
    WorkNotReady,
    /// Reserved for an incoming task
    Reserved,
    /// Call on hold
    Hold,
    /// Active on a non-voice task
    Active,
    /// Task paused
    Paused,
    /// Task interrupted
    Interrupted,
    /// Not active on a non-voice task
    NotActive,
    /// State not reported or not recognized
    #[default]
    #[serde(other)]
    Unknown,
}

/// Every state in wire order
pub const ALL_STATES: [PresenceState; 15] = [
    PresenceState::Login,
    PresenceState::Logout,
    PresenceState::Ready,
    PresenceState::NotReady,
    PresenceState::Available,
    PresenceState::Talking,
    PresenceState::WorkNotReady,
    PresenceState::WorkReady,
    PresenceState::Reserved,
    PresenceState::Unknown,
    PresenceState::Hold,
    PresenceState::Active,
    PresenceState::Paused,
    PresenceState::Interrupted,
    PresenceState::NotActive,
];

/// States in which the agent is available for or busy with work
pub const READY_STATES: &[PresenceState] = &[
    PresenceState::Ready,
    PresenceState::Available,
    PresenceState::Talking,
    PresenceState::WorkReady,
    PresenceState::Reserved,
    PresenceState::Hold,
    PresenceState::Active,
];

/// States in which the agent is logged in but not ready
pub const NOT_READY_STATES: &[PresenceState] =
    &[PresenceState::NotReady, PresenceState::WorkNotReady];

/// States in which the agent is logged in to the platform
pub const LOGGED_IN_STATES: &[PresenceState] = &[
    PresenceState::Login,
    PresenceState::Ready,
    PresenceState::NotReady,
    PresenceState::Available,
    PresenceState::Talking,
    PresenceState::WorkNotReady,
    PresenceState::WorkReady,
    PresenceState::Reserved,
    PresenceState::Hold,
    PresenceState::Active,
    PresenceState::Paused,
    PresenceState::Interrupted,
    PresenceState::NotActive,
];

/// States in which the agent is not logged in
pub const LOGGED_OUT_STATES: &[PresenceState] = &[PresenceState::Logout, PresenceState::Unknown];

impl PresenceState {
    /// Wire name of the state
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Ready => "READY",
            Self::NotReady => "NOT_READY",
            Self::Available => "AVAILABLE",
            Self::Talking => "TALKING",
            Self::WorkReady => "WORK_READY",
            Self::WorkNotReady => "WORK_NOT_READY",
            Self::Reserved => "RESERVED",
            Self::Hold => "HOLD",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Interrupted => "INTERRUPTED",
            Self::NotActive => "NOT_ACTIVE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Decode a wire name, mapping anything unrecognized to `Unknown`
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or(Self::Unknown)
    }

    /// Agent is actively available for work
    #[must_use]
    pub fn is_ready(self) -> bool {
        READY_STATES.contains(&self)
    }

    /// Agent is logged in but not ready
    #[must_use]
    pub fn is_not_ready(self) -> bool {
        NOT_READY_STATES.contains(&self)
    }

    /// Agent is logged in
    #[must_use]
    pub fn is_logged_in(self) -> bool {
        LOGGED_IN_STATES.contains(&self)
    }

    /// Agent is logged out or its state is unknown
    #[must_use]
    pub fn is_logged_out(self) -> bool {
        LOGGED_OUT_STATES.contains(&self)
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known presence state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateName(pub String);

impl fmt::Display for UnknownStateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown presence state [{}]", self.0)
    }
}

impl std::error::Error for UnknownStateName {}

impl FromStr for PresenceState {
    type Err = UnknownStateName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ALL_STATES
            .iter()
            .copied()
            .find(|state| state.as_str() == trimmed)
            .ok_or_else(|| UnknownStateName(trimmed.to_string()))
    }
}
