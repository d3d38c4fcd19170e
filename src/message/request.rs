//! State-change request bodies
//!
//! The platform expects exactly one of three shapes:
//!
//! ```text
//! <User><state>READY</state></User>
//! <User><state>NOT_READY</state><reasonCodeId>12</reasonCodeId></User>
//! <User><state>LOGIN</state><extension>1001</extension></User>
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::types::presence::PresenceState;

/// Body of a `PUT /User/{id}` state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "User")]
pub struct StateChangeRequest {
    /// Requested state wire name
    pub state: String,
    /// Line to log in on (login only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Numeric reason (NOT_READY and LOGOUT only)
    #[serde(
        rename = "reasonCodeId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reason_code_id: Option<u32>,
}

impl StateChangeRequest {
    /// Plain state change
    #[must_use]
    pub fn state(target: PresenceState) -> Self {
        Self {
            state: target.as_str().to_string(),
            extension: None,
            reason_code_id: None,
        }
    }

    /// Login on the given line
    pub fn login(line: impl Into<String>) -> Self {
        Self {
            state: PresenceState::Login.as_str().to_string(),
            extension: Some(line.into()),
            reason_code_id: None,
        }
    }

    /// State change carrying a reason code
    ///
    /// Only NOT_READY and LOGOUT accept a reason; for any other target the
    /// reason is dropped and a plain body is built.
    #[must_use]
    pub fn with_reason(target: PresenceState, reason: u32) -> Self {
        let mut request = Self::state(target);
        if matches!(target, PresenceState::NotReady | PresenceState::Logout) {
            request.reason_code_id = Some(reason);
        }
        request
    }

    /// Build the body for a transition to `target`
    ///
    /// LOGIN always carries `line`; a reason applies to NOT_READY and LOGOUT.
    #[must_use]
    pub fn for_target(target: PresenceState, line: &str, reason: Option<u32>) -> Self {
        match (target, reason) {
            (PresenceState::Login, _) => Self::login(line),
            (_, Some(code)) => Self::with_reason(target, code),
            (_, None) => Self::state(target),
        }
    }

    /// Serialize to the wire body
    ///
    /// # Errors
    /// Returns `AgentError::Xml` if serialization fails
    pub fn to_xml(&self) -> Result<String> {
        quick_xml::se::to_string(self).map_err(|e| AgentError::xml(e.to_string()))
    }

    /// Parse a wire body
    ///
    /// # Errors
    /// Returns `AgentError::Xml` if the body is not a valid request
    pub fn from_xml(body: &str) -> Result<Self> {
        Ok(quick_xml::de::from_str(body)?)
    }

    /// Requested state
    #[must_use]
    pub fn target(&self) -> PresenceState {
        PresenceState::from_wire(&self.state)
    }
}
