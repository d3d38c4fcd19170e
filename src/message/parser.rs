//! Response classification
//!
//! Decides whether a confirmation payload proves that a state change
//! happened. Error entries always win; a user body with a resource URI is a
//! confirmation; everything else is logged and rejected.

use crate::error::{AgentError, Result};

use super::envelope::{Notification, UpdateEnvelope};
use super::status::UserStatus;

/// Verdict on one payload taken from the mailbox
#[derive(Debug, Clone)]
pub enum Confirmation {
    /// A user body: the transition is confirmed with this status
    Confirmed(UserStatus),
    /// An error-bearing or undecodable payload: the transition failed
    Rejected(AgentError),
    /// Decodable, but not about this agent's state; carries a description
    Unrelated(String),
}

/// Classify a confirmation payload
///
/// # Arguments
/// * `agent` - Login name used to prefix log lines
/// * `content` - Raw `<Update>` document taken from the mailbox
pub fn classify(agent: &str, content: &str) -> Confirmation {
    let envelope = match UpdateEnvelope::from_xml(content) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::error!("[{}] cannot decode notification: {}", agent, e);
            return Confirmation::Rejected(AgentError::payload(format!(
                "cannot decode notification: {e}"
            )));
        }
    };

    match envelope.into_notification() {
        Notification::ApiErrors(errors) => {
            for error in &errors.errors {
                log::error!(
                    "[{}] API error type [{}] message [{}] peripheral [{}]",
                    agent,
                    error.error_type,
                    error.error_message,
                    error.peripheral_error_text
                );
            }
            let message = errors
                .errors
                .first()
                .map(|e| format!("{} - {}", e.error_type, e.error_message))
                .unwrap_or_else(|| "empty error list".to_string());
            Confirmation::Rejected(AgentError::payload(format!("API error: {message}")))
        }
        Notification::User(user) if user.is_present() => {
            log::trace!("[{}] confirmed state [{}]", agent, user.state);
            Confirmation::Confirmed(*user)
        }
        Notification::User(user) => {
            log::warn!(
                "[{}] user body without resource URI, state [{}]",
                agent,
                user.state
            );
            Confirmation::Unrelated("user body without resource URI".to_string())
        }
        Notification::Dialogs(dialogs) => {
            log::warn!(
                "[{}] notification carries {} dialog(s), not a user status",
                agent,
                dialogs.dialogs.len()
            );
            Confirmation::Unrelated("dialog notification without user status".to_string())
        }
        other => {
            log::error!(
                "[{}] unknown notification content of kind [{}]",
                agent,
                other.kind()
            );
            Confirmation::Unrelated(format!(
                "unknown notification content of kind [{}]",
                other.kind()
            ))
        }
    }
}

/// Classify a confirmation payload into a confirmed status or an error
///
/// # Errors
/// Returns `AgentError::PayloadUnparseable` if the payload cannot be decoded,
/// carries API errors or holds no user body
pub fn classify_response(agent: &str, content: &str) -> Result<UserStatus> {
    match classify(agent, content) {
        Confirmation::Confirmed(status) => Ok(status),
        Confirmation::Rejected(e) => Err(e),
        Confirmation::Unrelated(what) => Err(AgentError::payload(what)),
    }
}

/// Parse the body of a `GET /User/{name}` response
///
/// # Errors
/// Returns `AgentError::Xml` if the body is not a user document
pub fn parse_user_status(body: &str) -> Result<UserStatus> {
    UserStatus::from_xml(body)
}
