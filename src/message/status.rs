//! Payload bodies carried by responses and push notifications
//!
//! Only the fields the engine and its callers read are modelled; unknown
//! elements are skipped by the deserializer so platform additions do not
//! break decoding.

use serde::Deserialize;

use crate::types::presence::PresenceState;

// ============================================================================
// User Status
// ============================================================================

/// Reason attached to a NOT_READY or LOGOUT state
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReasonCode {
    /// NOT_READY or LOGOUT
    pub category: String,
    /// Reason resource URI
    pub uri: String,
    /// Numeric code as configured on the platform
    pub code: String,
    /// Display label
    pub label: String,
    /// Whether the reason is global
    pub for_all: bool,
    /// Reason id
    pub id: String,
}

/// Roles assigned to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Roles {
    /// Role names (Agent, Supervisor, ...)
    pub role: Vec<String>,
}

/// Full user status as returned by `GET /User/{id}` or pushed in an update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStatus {
    /// Resource URI; empty means "no user body"
    pub uri: String,
    /// Durable agent id
    pub login_id: String,
    /// Login name
    pub login_name: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Extension the agent is logged in on
    pub extension: String,
    /// Current state wire name
    pub state: String,
    /// Pending state wire name, if a change is queued
    pub pending_state: String,
    /// Time of the last state change
    pub state_change_time: String,
    /// Reason code id as text
    pub reason_code_id: String,
    /// Reason code detail
    #[serde(rename = "ReasonCode")]
    pub reason_code: Option<ReasonCode>,
    /// Roles
    pub roles: Roles,
    /// Team id
    pub team_id: String,
    /// Team name
    pub team_name: String,
    /// Media type
    pub media_type: String,
    /// Dialogs collection URI
    pub dialogs: String,
}

impl UserStatus {
    /// Parse a bare `<User>` body
    ///
    /// # Errors
    /// Returns `AgentError::Xml` if the body is not a user document
    pub fn from_xml(body: &str) -> crate::error::Result<Self> {
        Ok(quick_xml::de::from_str(body)?)
    }

    /// Current state
    #[must_use]
    pub fn presence(&self) -> PresenceState {
        PresenceState::from_wire(&self.state)
    }

    /// Pending state, if one is reported
    #[must_use]
    pub fn pending(&self) -> Option<PresenceState> {
        if self.pending_state.trim().is_empty() {
            None
        } else {
            Some(PresenceState::from_wire(&self.pending_state))
        }
    }

    /// Whether the body actually describes a user
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.uri.trim().is_empty()
    }
}

// ============================================================================
// API Errors
// ============================================================================

/// One error entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiError {
    /// Error type
    pub error_type: String,
    /// Error message
    pub error_message: String,
    /// Peripheral (switch) error code
    pub peripheral_error_code: String,
    /// Peripheral error text
    pub peripheral_error_text: String,
    /// Peripheral error message
    pub peripheral_error_msg: String,
    /// Extra error data
    pub error_data: String,
}

/// Error collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiErrors {
    /// Entries, in platform order
    #[serde(rename = "apiError")]
    pub errors: Vec<ApiError>,
}

// ============================================================================
// Other payload kinds
// ============================================================================

/// One call dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dialog {
    /// Dialog id
    pub id: String,
    /// Dialog URI
    pub uri: String,
    /// Dialog state
    pub state: String,
    /// Calling party
    pub from_address: String,
    /// Called party
    pub to_address: String,
    /// Media type
    pub media_type: String,
    /// Associated dialog URI (consult calls)
    pub associated_dialog_uri: String,
}

/// Dialog collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dialogs {
    /// Dialogs
    #[serde(rename = "Dialog")]
    pub dialogs: Vec<Dialog>,
}

/// One device
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    /// Device id
    pub device_id: String,
    /// Device type
    pub device_type: String,
    /// Device type display name
    pub device_type_name: String,
}

/// Device collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Devices {
    /// Devices
    #[serde(rename = "Device")]
    pub devices: Vec<Device>,
}

/// Queue statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueStatistics {
    /// Calls waiting
    pub calls_in_queue: String,
    /// Agents ready
    pub agents_ready: String,
    /// Agents not ready
    pub agents_not_ready: String,
    /// Agents logged on
    pub agents_logged_on: String,
}

/// Queue update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Queue {
    /// Queue URI
    pub uri: String,
    /// Queue name
    pub name: String,
    /// Statistics
    pub statistics: QueueStatistics,
}

/// Team member summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamUser {
    /// Member id
    pub login_id: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Current state wire name
    pub state: String,
    /// Pending state wire name
    pub pending_state: String,
}

/// Team members
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamUsers {
    /// Members
    #[serde(rename = "User")]
    pub users: Vec<TeamUser>,
}

/// Team update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Team {
    /// Team URI
    pub uri: String,
    /// Team id
    pub id: String,
    /// Team name
    pub name: String,
    /// Members
    pub users: TeamUsers,
}

/// Supervisor broadcast message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMessage {
    /// Message URI
    pub uri: String,
    /// Message id
    pub id: String,
    /// Creation time
    pub created_at: String,
    /// Display duration
    pub duration: String,
    /// Message text
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_user_body_decodes() {
        let body = r#"<User>
            <uri>/finesse/api/User/1001001</uri>
            <loginId>1001001</loginId>
            <loginName>agent01</loginName>
            <extension>1001</extension>
            <state>NOT_READY</state>
            <pendingState></pendingState>
            <reasonCodeId>12</reasonCodeId>
            <ReasonCode>
                <category>NOT_READY</category>
                <code>12</code>
                <label>Lunch</label>
                <forAll>true</forAll>
                <id>7</id>
            </ReasonCode>
            <roles><role>Agent</role><role>Supervisor</role></roles>
            <settings><wrapUpOnIncoming>OPTIONAL</wrapUpOnIncoming></settings>
        </User>"#;
        let user = UserStatus::from_xml(body).unwrap();
        assert_eq!(user.login_id, "1001001");
        assert_eq!(user.presence(), PresenceState::NotReady);
        assert_eq!(user.pending(), None);
        assert_eq!(user.roles.role, vec!["Agent", "Supervisor"]);
        let reason = user.reason_code.unwrap();
        assert_eq!(reason.label, "Lunch");
        assert!(reason.for_all);
    }

    #[test]
    fn missing_user_fields_default_to_empty() {
        let user = UserStatus::from_xml("<User><state>READY</state></User>").unwrap();
        assert!(!user.is_present());
        assert!(user.login_id.is_empty());
        assert_eq!(user.presence(), PresenceState::Ready);
    }
}
