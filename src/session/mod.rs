//! Agent session engine
//!
//! An [`AgentSession`] owns one agent's identity, its last observed status,
//! its notification mailbox and its cancellation scope. State changes run
//! through a two-phase protocol: send the request, then
//! wait for the push confirmation before believing the state changed.
//!
//! Sessions are shared as `Arc<AgentSession<..>>`. The last-known status can
//! be read from any thread; transitions on one session are serialized.

mod identity;
mod transition;

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::message::status::UserStatus;
use crate::notify::{Mailbox, PushSubscriber, SubscriptionKey, spawn_listener};
use crate::transport::Transport;
use crate::types::agent::AgentIdentity;
use crate::types::identifiers::LoginId;
use crate::types::options::SessionOptions;
use crate::types::presence::PresenceState;

/// Last status payload and when it was observed
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Status payload
    pub status: UserStatus,
    /// Observation time
    pub observed_at: DateTime<Utc>,
}

/// One agent on one platform
pub struct AgentSession<T, S> {
    identity: AgentIdentity,
    login_id: OnceLock<LoginId>,
    last: RwLock<Option<StatusSnapshot>>,
    transport: T,
    subscriber: S,
    options: SessionOptions,
    mailbox: AsyncMutex<Mailbox>,
    mailbox_tx: Mutex<Option<mpsc::Sender<String>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl<T: Transport, S: PushSubscriber> AgentSession<T, S> {
    /// Create a session with its own cancellation scope
    ///
    /// # Errors
    /// Returns `AgentError::InvalidConfig` if `options` or `identity` are
    /// invalid
    pub fn new(
        identity: AgentIdentity,
        transport: T,
        subscriber: S,
        options: SessionOptions,
    ) -> Result<Self> {
        Self::with_scope(
            identity,
            transport,
            subscriber,
            options,
            &CancellationToken::new(),
        )
    }

    /// Create a session inside an existing cancellation scope
    ///
    /// The session gets a child of `parent`: cancelling `parent` stops the
    /// session, dropping the session never cancels `parent`.
    ///
    /// # Errors
    /// Returns `AgentError::InvalidConfig` if `options` are out of bounds or
    /// the identity has no login name or line
    pub fn with_scope(
        identity: AgentIdentity,
        transport: T,
        subscriber: S,
        options: SessionOptions,
        parent: &CancellationToken,
    ) -> Result<Self> {
        options.validate()?;
        identity.validate()?;
        let (tx, mailbox) = Mailbox::channel(options.mailbox_capacity);
        Ok(Self {
            identity,
            login_id: OnceLock::new(),
            last: RwLock::new(None),
            transport,
            subscriber,
            options,
            mailbox: AsyncMutex::new(mailbox),
            mailbox_tx: Mutex::new(Some(tx)),
            listener: Mutex::new(None),
            cancel: parent.child_token(),
        })
    }

    /// Start the push subscription and its listener
    ///
    /// Runs at most once per session; later calls return `Ok(())` without
    /// doing anything. The login id must be resolved first.
    ///
    /// # Errors
    /// Returns `AgentError::Subscription` if the id is unknown or the stream
    /// cannot be opened, `AgentError::Cancelled` if the session is cancelled
    pub async fn start_notifications(&self) -> Result<()> {
        let agent = self.name();
        if self.mailbox_tx.lock().is_none() {
            log::trace!("[{}] push listener is already running", agent);
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(AgentError::cancelled(agent));
        }
        let Some(login_id) = self.login_id().cloned() else {
            log::error!("[{}] push not started, missing agent login ID", agent);
            return Err(AgentError::subscription(format!(
                "push not started for agent [{agent}], missing agent login ID"
            )));
        };

        let key = SubscriptionKey {
            login_id,
            login_name: agent.to_string(),
            password: self.identity.password.clone(),
            domain: self.push_domain(),
        };
        log::debug!("[{}] open push stream with domain {:?}", agent, key.domain);
        let stream = self.subscriber.subscribe(key).await.map_err(|e| {
            log::error!("[{}] push subscription failed: {}", agent, e);
            match e {
                AgentError::Subscription(_) => e,
                other => AgentError::subscription(other.to_string()),
            }
        })?;

        let Some(tx) = self.mailbox_tx.lock().take() else {
            log::trace!("[{}] push listener was started concurrently", agent);
            return Ok(());
        };
        let handle = spawn_listener(
            agent.to_string(),
            stream,
            tx,
            self.options.delivery_timeout,
            self.cancel.child_token(),
        );
        *self.listener.lock() = Some(handle);

        if !self.options.subscribe_settle.is_zero() {
            tokio::select! {
                () = self.cancel.cancelled() => {}
                () = tokio::time::sleep(self.options.subscribe_settle) => {}
            }
        }
        log::trace!("[{}] push listener started", agent);
        Ok(())
    }
}

impl<T, S> AgentSession<T, S> {
    /// Login name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.login_name
    }

    /// Identity this session was created with
    #[must_use]
    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    /// Durable id, once resolved
    #[must_use]
    pub fn login_id(&self) -> Option<&LoginId> {
        self.login_id.get()
    }

    /// Options this session runs with
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Last observed state; `Unknown` before the first status
    #[must_use]
    pub fn last_state(&self) -> PresenceState {
        self.last
            .read()
            .as_ref()
            .map_or(PresenceState::Unknown, |snapshot| snapshot.status.presence())
    }

    /// Last observed status payload
    #[must_use]
    pub fn last_status(&self) -> Option<UserStatus> {
        self.last.read().as_ref().map(|snapshot| snapshot.status.clone())
    }

    /// Last status payload with its observation time
    #[must_use]
    pub fn last_snapshot(&self) -> Option<StatusSnapshot> {
        self.last.read().clone()
    }

    /// Whether the push listener has been started
    #[must_use]
    pub fn notifications_started(&self) -> bool {
        self.mailbox_tx.lock().is_none()
    }

    /// Whether the session scope is cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the session scope
    ///
    /// Stops the push listener. A request already sent is not interrupted,
    /// but its confirmation wait ends with `Cancelled`, as does any new
    /// transition.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            log::trace!("[{}] cancel session", self.name());
        }
        self.cancel.cancel();
    }

    /// Push domain: the `@domain` suffix of the login name, else the default
    fn push_domain(&self) -> Option<String> {
        self.identity
            .domain()
            .map(str::to_string)
            .or_else(|| self.options.default_domain.clone())
    }

    pub(crate) fn store_status(&self, status: UserStatus) {
        *self.last.write() = Some(StatusSnapshot {
            status,
            observed_at: Utc::now(),
        });
    }

    /// Multi-line summary of the last known status
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Agent: {}\n  id: {}\n  line: {}\n  state: {}",
            self.name(),
            self.login_id().map_or("-", LoginId::as_str),
            self.identity.line,
            self.last_state()
        );
        if let Some(snapshot) = self.last_snapshot() {
            let status = &snapshot.status;
            if let Some(pending) = status.pending() {
                out.push_str(&format!("\n  pending: {pending}"));
            }
            if let Some(reason) = &status.reason_code {
                out.push_str(&format!("\n  reason: {} ({})", reason.label, reason.code));
            }
            if !status.team_name.is_empty() {
                out.push_str(&format!("\n  team: {}", status.team_name));
            }
            out.push_str(&format!(
                "\n  observed: {}",
                snapshot.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        out
    }
}

impl<T, S> fmt::Display for AgentSession<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) => {}",
            self.name(),
            self.identity.line,
            self.last_state()
        )
    }
}

impl<T, S> fmt::Debug for AgentSession<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSession")
            .field("identity", &self.identity)
            .field("login_id", &self.login_id.get())
            .field("state", &self.last_state())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T, S> Drop for AgentSession<T, S> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}
