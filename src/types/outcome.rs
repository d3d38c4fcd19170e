//! Operations and their per-agent outcomes

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::AgentError;

// ============================================================================
// Operation
// ============================================================================

/// A requestable transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// LOGOUT → LOGIN
    Login,
    /// NOT_READY → LOGOUT
    Logout,
    /// any non-ready state → READY
    Ready,
    /// ready-state → NOT_READY
    NotReady,
}

impl Operation {
    /// Wire state requested by this operation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Ready => "READY",
            Self::NotReady => "NOT_READY",
        }
    }

    /// Map a wire state name to an operation, if it is requestable
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LOGIN" => Some(Self::Login),
            "LOGOUT" => Some(Self::Logout),
            "READY" => Some(Self::Ready),
            "NOT_READY" => Some(Self::NotReady),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Tag of an [`OperationOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutcomeKind {
    /// Transition confirmed
    Success,
    /// Guard violation
    WrongState,
    /// Request could not be built or sent
    RequestFailed,
    /// Non-2xx response
    ResponseError,
    /// No confirmation before the deadline
    NotificationTimeout,
    /// Confirmation was malformed or error-bearing
    PayloadUnparseable,
    /// Operation not recognized by the dispatcher
    UnknownCommand,
    /// Login name could not be resolved to an id
    IdentityResolution,
    /// Push subscription could not be started
    Subscription,
    /// Scope was cancelled before the work started
    Cancelled,
}

impl OutcomeKind {
    /// Classify an error
    #[must_use]
    pub fn of(error: &AgentError) -> Self {
        match error {
            AgentError::WrongState { .. } => Self::WrongState,
            AgentError::RequestFailed(_) | AgentError::Xml(_) | AgentError::InvalidConfig(_) => {
                Self::RequestFailed
            }
            AgentError::Response { .. } => Self::ResponseError,
            AgentError::NotificationTimeout { .. } => Self::NotificationTimeout,
            AgentError::PayloadUnparseable(_) => Self::PayloadUnparseable,
            AgentError::UnknownCommand { .. } => Self::UnknownCommand,
            AgentError::IdentityResolution { .. } => Self::IdentityResolution,
            AgentError::Subscription(_) => Self::Subscription,
            AgentError::Cancelled(_) => Self::Cancelled,
        }
    }
}

/// Typed result of one operation on one agent
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    /// Login name of the agent the outcome belongs to
    pub agent: String,
    /// `Ok` on success, otherwise the originating error
    pub result: std::result::Result<(), AgentError>,
    /// When the operation finished
    pub finished_at: DateTime<Utc>,
}

impl OperationOutcome {
    /// Create an outcome stamped with the current time
    pub fn new(agent: impl Into<String>, result: std::result::Result<(), AgentError>) -> Self {
        Self {
            agent: agent.into(),
            result,
            finished_at: Utc::now(),
        }
    }

    /// Outcome tag
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match &self.result {
            Ok(()) => OutcomeKind::Success,
            Err(e) => OutcomeKind::of(e),
        }
    }

    /// Whether the operation succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Originating error, if any
    #[must_use]
    pub fn error(&self) -> Option<&AgentError> {
        self.result.as_ref().err()
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(()) => write!(f, "Agent: {:<30} OK", self.agent),
            Err(e) => write!(f, "Agent: {:<30} {:?}: {}", self.agent, self.kind(), e),
        }
    }
}

// ============================================================================
// Group Report
// ============================================================================

/// Aggregate view over the outcomes of one group operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReport {
    /// Number of outcomes
    pub total: usize,
    /// Number of successful outcomes
    pub succeeded: usize,
    /// Failure count per outcome tag
    pub failures: BTreeMap<OutcomeKind, usize>,
}

impl GroupReport {
    /// Summarize a set of outcomes
    #[must_use]
    pub fn from_outcomes(outcomes: &[OperationOutcome]) -> Self {
        let mut report = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.kind() {
                OutcomeKind::Success => report.succeeded += 1,
                kind => *report.failures.entry(kind).or_insert(0) += 1,
            }
        }
        report
    }

    /// Number of failed outcomes
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Whether every outcome succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} agents success requests is {}",
            self.total, self.succeeded
        )
    }
}
