//! Push notification envelopes
//!
//! Every push item carries one `<Update>` document whose `<data>` element
//! holds exactly one payload. The payload kind is read from the first child
//! of `<data>` before any full decode, so routing never pays for parsing
//! payloads it is going to discard.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::error::{AgentError, Result};

use super::status::{
    ApiErrors, Devices, Dialog, Dialogs, Queue, Team, TeamMessage, UserStatus,
};

// ============================================================================
// Payload Kind
// ============================================================================

/// Kind of payload carried in an update's `<data>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    /// `<user>`
    User,
    /// `<apiErrors>`
    ApiErrors,
    /// `<dialogs>` or `<Dialog>`
    Dialogs,
    /// `<Devices>`
    Devices,
    /// `<Queue>`
    Queue,
    /// `<Team>`
    Team,
    /// `<TeamMessage>`
    TeamMessage,
    /// `<data>` missing or without children
    Empty,
    /// Any other element name
    Unknown(String),
}

impl PayloadKind {
    fn from_element(name: &str) -> Self {
        match name {
            "user" | "User" => Self::User,
            "apiErrors" => Self::ApiErrors,
            "dialogs" | "Dialog" => Self::Dialogs,
            "Devices" => Self::Devices,
            "Queue" => Self::Queue,
            "Team" => Self::Team,
            "TeamMessage" => Self::TeamMessage,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether this payload can confirm a state transition
    #[must_use]
    pub fn is_confirmation(&self) -> bool {
        matches!(self, Self::User | Self::ApiErrors)
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::ApiErrors => f.write_str("apiErrors"),
            Self::Dialogs => f.write_str("dialogs"),
            Self::Devices => f.write_str("devices"),
            Self::Queue => f.write_str("queue"),
            Self::Team => f.write_str("team"),
            Self::TeamMessage => f.write_str("teamMessage"),
            Self::Empty => f.write_str("empty"),
            Self::Unknown(name) => write!(f, "unknown({name})"),
        }
    }
}

/// Read the payload kind of an update without decoding it
///
/// # Errors
/// Returns `AgentError::Xml` if the content is not well-formed up to the
/// first payload element
pub fn sniff_kind(content: &str) -> Result<PayloadKind> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut in_data = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                let name = String::from_utf8_lossy(name.as_ref());
                if in_data {
                    return Ok(PayloadKind::from_element(&name));
                }
                if name == "data" {
                    in_data = true;
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let name = String::from_utf8_lossy(name.as_ref());
                if in_data {
                    return Ok(PayloadKind::from_element(&name));
                }
                if name == "data" {
                    return Ok(PayloadKind::Empty);
                }
            }
            Event::End(e) if in_data && e.local_name().as_ref() == b"data" => {
                return Ok(PayloadKind::Empty);
            }
            Event::Eof => return Ok(PayloadKind::Empty),
            _ => {}
        }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Payload container of an update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateData {
    /// User status
    #[serde(alias = "User")]
    pub user: Option<UserStatus>,
    /// API errors
    #[serde(rename = "apiErrors")]
    pub api_errors: Option<ApiErrors>,
    /// Dialog collection
    pub dialogs: Option<Dialogs>,
    /// Single dialog
    #[serde(rename = "Dialog")]
    pub dialog: Option<Dialog>,
    /// Devices
    #[serde(rename = "Devices")]
    pub devices: Option<Devices>,
    /// Queue
    #[serde(rename = "Queue")]
    pub queue: Option<Queue>,
    /// Team
    #[serde(rename = "Team")]
    pub team: Option<Team>,
    /// Team message
    #[serde(rename = "TeamMessage")]
    pub team_message: Option<TeamMessage>,
}

/// One `<Update>` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateEnvelope {
    /// Event verb (PUT, POST, DELETE)
    pub event: String,
    /// Correlation id echoed by the platform
    pub request_id: String,
    /// Resource the update is about
    pub source: String,
    /// Payload
    pub data: UpdateData,
}

impl UpdateEnvelope {
    /// Decode an update document
    ///
    /// # Errors
    /// Returns `AgentError::Xml` if the document cannot be decoded
    pub fn from_xml(content: &str) -> Result<Self> {
        quick_xml::de::from_str(content).map_err(AgentError::from)
    }

    /// Collapse the payload container into its single variant
    #[must_use]
    pub fn into_notification(self) -> Notification {
        let data = self.data;
        if let Some(errors) = data.api_errors {
            return Notification::ApiErrors(errors);
        }
        if let Some(user) = data.user {
            return Notification::User(Box::new(user));
        }
        if let Some(dialogs) = data.dialogs {
            return Notification::Dialogs(dialogs);
        }
        if let Some(dialog) = data.dialog {
            return Notification::Dialogs(Dialogs {
                dialogs: vec![dialog],
            });
        }
        if let Some(devices) = data.devices {
            return Notification::Devices(devices);
        }
        if let Some(queue) = data.queue {
            return Notification::Queue(queue);
        }
        if let Some(team) = data.team {
            return Notification::Team(team);
        }
        if let Some(message) = data.team_message {
            return Notification::TeamMessage(message);
        }
        Notification::Empty
    }
}

/// Decoded payload of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// User status
    User(Box<UserStatus>),
    /// API errors
    ApiErrors(ApiErrors),
    /// Dialogs
    Dialogs(Dialogs),
    /// Devices
    Devices(Devices),
    /// Queue
    Queue(Queue),
    /// Team
    Team(Team),
    /// Team message
    TeamMessage(TeamMessage),
    /// Nothing recognizable
    Empty,
}

impl Notification {
    /// Kind of this payload
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::User(_) => PayloadKind::User,
            Self::ApiErrors(_) => PayloadKind::ApiErrors,
            Self::Dialogs(_) => PayloadKind::Dialogs,
            Self::Devices(_) => PayloadKind::Devices,
            Self::Queue(_) => PayloadKind::Queue,
            Self::Team(_) => PayloadKind::Team,
            Self::TeamMessage(_) => PayloadKind::TeamMessage,
            Self::Empty => PayloadKind::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_UPDATE: &str = r#"<Update>
        <data>
            <user>
                <uri>/finesse/api/User/1001001</uri>
                <loginId>1001001</loginId>
                <state>READY</state>
            </user>
        </data>
        <event>PUT</event>
        <requestId>abc</requestId>
        <source>/finesse/api/User/1001001</source>
    </Update>"#;

    #[test]
    fn sniffs_first_child_of_data() {
        assert_eq!(sniff_kind(USER_UPDATE).unwrap(), PayloadKind::User);
        assert_eq!(
            sniff_kind("<Update><data><apiErrors/></data></Update>").unwrap(),
            PayloadKind::ApiErrors
        );
        assert_eq!(
            sniff_kind("<Update><data><Dialog><id>1</id></Dialog></data></Update>").unwrap(),
            PayloadKind::Dialogs
        );
        assert_eq!(
            sniff_kind("<Update><data><Widget/></data></Update>").unwrap(),
            PayloadKind::Unknown("Widget".to_string())
        );
        assert_eq!(
            sniff_kind("<Update><data/></Update>").unwrap(),
            PayloadKind::Empty
        );
    }

    #[test]
    fn sniff_rejects_broken_markup() {
        assert!(sniff_kind("<Update></data><data><user/></data>").is_err());
    }

    #[test]
    fn user_update_collapses_to_user() {
        let envelope = UpdateEnvelope::from_xml(USER_UPDATE).unwrap();
        assert_eq!(envelope.event, "PUT");
        assert_eq!(envelope.request_id, "abc");
        match envelope.into_notification() {
            Notification::User(user) => assert_eq!(user.state, "READY"),
            other => panic!("expected user, got {other:?}"),
        }
    }

    #[test]
    fn errors_win_over_user() {
        let content = r"<Update><data>
            <apiErrors><apiError><errorType>Invalid State</errorType>
            <errorMessage>CF_INVALID_AGENT_STATE</errorMessage></apiError></apiErrors>
        </data></Update>";
        let notification = UpdateEnvelope::from_xml(content)
            .unwrap()
            .into_notification();
        assert_eq!(notification.kind(), PayloadKind::ApiErrors);
    }
}
