//! Bulk concurrency engine
//!
//! A [`BulkGroup`] fans one operation out over every member session, one task
//! per agent, and returns exactly one [`OperationOutcome`] per member. A
//! failing agent never affects its siblings' outcomes.

mod fanout;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::notify::PushSubscriber;
use crate::session::AgentSession;
use crate::transport::Transport;
use crate::types::agent::AgentIdentity;
use crate::types::options::SessionOptions;
use crate::types::presence::PresenceState;

pub use fanout::collect_outcomes;

/// Ordered set of agent sessions sharing one cancellation scope
pub struct BulkGroup<T, S> {
    sessions: Arc<Mutex<Vec<Arc<AgentSession<T, S>>>>>,
    options: SessionOptions,
    cancel: CancellationToken,
}

impl<T: Transport, S: PushSubscriber> BulkGroup<T, S> {
    /// Create an empty group
    ///
    /// # Errors
    /// Returns `AgentError::InvalidConfig` if `options` are out of bounds
    pub fn new(options: SessionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            sessions: Arc::new(Mutex::new(Vec::new())),
            options,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a session, resolve its id, start its notifications and add it
    ///
    /// The group is only mutated when every step succeeded.
    ///
    /// # Errors
    /// Returns `AgentError::Cancelled` if the group is cancelled, otherwise
    /// the error of the failed step
    pub async fn add(
        &self,
        identity: AgentIdentity,
        transport: T,
        subscriber: S,
    ) -> Result<Arc<AgentSession<T, S>>> {
        add_member(
            &self.sessions,
            &self.cancel,
            self.options.clone(),
            identity,
            transport,
            subscriber,
        )
        .await
    }

    /// Session snapshot, in insertion order
    #[must_use]
    pub fn sessions(&self) -> Vec<Arc<AgentSession<T, S>>> {
        self.sessions.lock().clone()
    }

    /// Last-known state of every member, in insertion order
    #[must_use]
    pub fn statuses(&self) -> Vec<(String, PresenceState)> {
        self.sessions
            .lock()
            .iter()
            .map(|session| (session.name().to_string(), session.last_state()))
            .collect()
    }
}

impl<T, S> BulkGroup<T, S> {
    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether the group has no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Options new members are created with
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether the group scope is cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the group scope and every member session; idempotent
    ///
    /// Requests already on the wire finish; nothing new starts.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            log::debug!("cancel agent group of {} agent(s)", self.len());
        }
        self.cancel.cancel();
    }
}

impl<T, S> Drop for BulkGroup<T, S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) async fn add_member<T: Transport, S: PushSubscriber>(
    sessions: &Mutex<Vec<Arc<AgentSession<T, S>>>>,
    cancel: &CancellationToken,
    options: SessionOptions,
    identity: AgentIdentity,
    transport: T,
    subscriber: S,
) -> Result<Arc<AgentSession<T, S>>> {
    let agent = identity.login_name.clone();
    if cancel.is_cancelled() {
        return Err(AgentError::cancelled(agent));
    }
    let session = Arc::new(AgentSession::with_scope(
        identity, transport, subscriber, options, cancel,
    )?);
    session.resolve_id().await?;
    session.start_notifications().await?;
    sessions.lock().push(Arc::clone(&session));
    log::trace!("[{}] added to agent group", agent);
    Ok(session)
}
