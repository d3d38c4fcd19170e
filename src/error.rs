//! Error types for the Finesse agent presence engine

use std::time::Duration;

use thiserror::Error;

use crate::types::presence::PresenceState;

/// Main error type for agent presence operations
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The agent is in a state that does not allow the requested transition
    #[error("agent [{agent}] is in [{state}] state and not possible {operation}")]
    WrongState {
        /// Agent login name
        agent: String,
        /// Last known state when the guard was evaluated
        state: PresenceState,
        /// Human readable operation name
        operation: String,
    },

    /// The request could not be built or delivered to the platform
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The platform answered with a non-2xx status
    #[error("Response error ({status}): {message}")]
    Response {
        /// HTTP-like status code
        status: u16,
        /// Status text or body excerpt
        message: String,
    },

    /// No push confirmation arrived before the deadline
    #[error("timeout collect notify response for agent [{agent}] after {timeout:?}")]
    NotificationTimeout {
        /// Agent login name
        agent: String,
        /// Deadline that elapsed
        timeout: Duration,
    },

    /// The confirmation payload was malformed, error-bearing or carried no user status
    #[error("Payload unparseable: {0}")]
    PayloadUnparseable(String),

    /// The dispatcher was asked for an operation it does not know
    #[error("unknown AgentGroup operation [{operation}] for agent [{agent}]")]
    UnknownCommand {
        /// Requested operation name
        operation: String,
        /// Agent login name
        agent: String,
    },

    /// The durable agent id could not be resolved from the login name
    #[error("Identity resolution failed for agent [{agent}]: {message}")]
    IdentityResolution {
        /// Agent login name
        agent: String,
        /// Failure detail
        message: String,
    },

    /// The push subscription could not be started
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// The owning scope was cancelled before the work started
    #[error("Operation cancelled for agent [{0}]")]
    Cancelled(String),

    /// XML encode/decode error
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for agent presence operations
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create a wrong-state guard error
    pub fn wrong_state(
        agent: impl Into<String>,
        state: PresenceState,
        operation: impl Into<String>,
    ) -> Self {
        Self::WrongState {
            agent: agent.into(),
            state,
            operation: operation.into(),
        }
    }

    /// Create a request failure error
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Create a non-2xx response error
    pub fn response(status: u16, msg: impl Into<String>) -> Self {
        Self::Response {
            status,
            message: msg.into(),
        }
    }

    /// Create a confirmation timeout error
    pub fn notification_timeout(agent: impl Into<String>, timeout: Duration) -> Self {
        Self::NotificationTimeout {
            agent: agent.into(),
            timeout,
        }
    }

    /// Create a payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::PayloadUnparseable(msg.into())
    }

    /// Create an unknown command error
    pub fn unknown_command(operation: impl Into<String>, agent: impl Into<String>) -> Self {
        Self::UnknownCommand {
            operation: operation.into(),
            agent: agent.into(),
        }
    }

    /// Create an identity resolution error
    pub fn identity(agent: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::IdentityResolution {
            agent: agent.into(),
            message: msg.into(),
        }
    }

    /// Create a subscription error
    pub fn subscription(msg: impl Into<String>) -> Self {
        Self::Subscription(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(agent: impl Into<String>) -> Self {
        Self::Cancelled(agent.into())
    }

    /// Create an XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<quick_xml::DeError> for AgentError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::Error> for AgentError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
