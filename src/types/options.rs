//! Session and transition options
//!
//! This module contains the tunables for agent sessions, including a builder
//! pattern for easy configuration, and the per-call transition options.

use std::time::Duration;

use crate::error::{AgentError, Result};

// ============================================================================
// Defaults
// ============================================================================

/// How long a transition waits for its push confirmation
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(20);

/// How long the notification router waits for mailbox space before dropping
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(20);

/// Pending notifications buffered per agent
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10;

/// Pause after starting a subscription so the stream can connect
pub const DEFAULT_SUBSCRIBE_SETTLE: Duration = Duration::from_secs(1);

/// Upper bound for any configured wait
const MAX_WAIT: Duration = Duration::from_secs(600);

/// Upper bound for the mailbox capacity
const MAX_MAILBOX_CAPACITY: usize = 10_000;

// ============================================================================
// Session Options
// ============================================================================

/// Options shared by every session created from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Deadline for the confirmation wait of one transition
    pub confirmation_timeout: Duration,
    /// Deadline for one mailbox delivery attempt
    pub delivery_timeout: Duration,
    /// Mailbox capacity
    pub mailbox_capacity: usize,
    /// Settle time after starting the push subscription
    pub subscribe_settle: Duration,
    /// Push domain for agents whose login name has no `@domain` suffix
    pub default_domain: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            subscribe_settle: DEFAULT_SUBSCRIBE_SETTLE,
            default_domain: None,
        }
    }
}

impl SessionOptions {
    /// Create a new builder for `SessionOptions`
    #[must_use]
    pub fn builder() -> SessionOptionsBuilder {
        SessionOptionsBuilder::default()
    }

    /// Check bounds
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a value is zero where that is not allowed or exceeds its limit
    pub fn validate(&self) -> Result<()> {
        if self.confirmation_timeout.is_zero() || self.confirmation_timeout > MAX_WAIT {
            return Err(AgentError::invalid_config(format!(
                "confirmation_timeout must be within (0, {MAX_WAIT:?}], got {:?}",
                self.confirmation_timeout
            )));
        }
        if self.delivery_timeout.is_zero() || self.delivery_timeout > MAX_WAIT {
            return Err(AgentError::invalid_config(format!(
                "delivery_timeout must be within (0, {MAX_WAIT:?}], got {:?}",
                self.delivery_timeout
            )));
        }
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAX_MAILBOX_CAPACITY {
            return Err(AgentError::invalid_config(format!(
                "mailbox_capacity must be within 1..={MAX_MAILBOX_CAPACITY}, got {}",
                self.mailbox_capacity
            )));
        }
        if self.subscribe_settle > MAX_WAIT {
            return Err(AgentError::invalid_config(format!(
                "subscribe_settle must not exceed {MAX_WAIT:?}"
            )));
        }
        Ok(())
    }
}

/// Builder for `SessionOptions`
#[derive(Debug, Default)]
pub struct SessionOptionsBuilder {
    options: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Set the confirmation timeout
    #[must_use]
    pub fn confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.options.confirmation_timeout = timeout;
        self
    }

    /// Set the mailbox delivery timeout
    #[must_use]
    pub fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.options.delivery_timeout = timeout;
        self
    }

    /// Set the mailbox capacity
    #[must_use]
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.options.mailbox_capacity = capacity;
        self
    }

    /// Set the settle time after starting a subscription
    #[must_use]
    pub fn subscribe_settle(mut self, settle: Duration) -> Self {
        self.options.subscribe_settle = settle;
        self
    }

    /// Set the push domain used when the login name carries none
    #[must_use]
    pub fn default_domain(mut self, domain: Option<String>) -> Self {
        self.options.default_domain = domain;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SessionOptions {
        self.options
    }
}

// ============================================================================
// Transition Options
// ============================================================================

/// Per-call modifiers for a guarded transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Run one automatic prerequisite transition when the guard fails
    /// (login before ready, not-ready before logout)
    pub force: bool,
}

impl TransitionOptions {
    /// Options with `force` set
    #[must_use]
    pub fn forced() -> Self {
        Self { force: true }
    }
}
