//! Agent identity types
//!
//! This module contains the login data a caller supplies for one agent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

// ============================================================================
// Agent Identity
// ============================================================================

/// Login data for one agent
///
/// The durable [`LoginId`](super::identifiers::LoginId) is not part of the
/// identity; it is resolved lazily by the session that owns the identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Human readable login name (may carry an `@domain` suffix)
    pub login_name: String,
    /// Credential used for both the API and the push subscription
    pub password: String,
    /// Phone line / extension the agent logs in on
    pub line: String,
}

impl AgentIdentity {
    /// Create a new identity
    pub fn new(
        login_name: impl Into<String>,
        password: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            login_name: login_name.into(),
            password: password.into(),
            line: line.into(),
        }
    }

    /// Check that the identity can log in
    ///
    /// # Errors
    /// Returns `AgentError::InvalidConfig` if the login name or line is blank
    pub fn validate(&self) -> Result<()> {
        if self.login_name.trim().is_empty() {
            return Err(AgentError::invalid_config("login_name must not be empty"));
        }
        if self.line.trim().is_empty() {
            return Err(AgentError::invalid_config(format!(
                "line must not be empty for agent [{}]",
                self.login_name
            )));
        }
        Ok(())
    }

    /// Domain part of a `user@domain` login name
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        match self.login_name.split_once('@') {
            Some((_, domain)) if !domain.is_empty() && !domain.contains('@') => Some(domain),
            _ => None,
        }
    }
}

// Credentials never reach log output.
impl fmt::Debug for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentIdentity")
            .field("login_name", &self.login_name)
            .field("password", &"<redacted>")
            .field("line", &self.line)
            .finish()
    }
}
