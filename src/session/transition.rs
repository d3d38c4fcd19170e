//! Guarded, push-confirmed state transitions
//!
//! Every transition runs in two phases. The request phase drains stale
//! notifications and sends `PUT /User/{id}`; the confirmation phase waits on
//! the mailbox until a user status arrives, an error payload arrives or the
//! deadline passes. Only a confirmation updates the last-known state.

use tokio::time::Instant;

use crate::error::{AgentError, Result};
use crate::message::parser::{Confirmation, classify};
use crate::message::request::StateChangeRequest;
use crate::notify::{MailboxWait, PushSubscriber};
use crate::transport::{ApiRequest, Transport};
use crate::types::options::TransitionOptions;
use crate::types::outcome::Operation;
use crate::types::presence::PresenceState;

use super::AgentSession;

impl<T: Transport, S: PushSubscriber> AgentSession<T, S> {
    /// LOGOUT → LOGIN on the identity's line
    ///
    /// # Errors
    /// Returns `AgentError::WrongState` unless the agent is logged out, or
    /// the error of the failed phase
    pub async fn login(&self) -> Result<()> {
        let state = self.last_state();
        if state != PresenceState::Logout {
            return Err(self.refuse(state, "login"));
        }
        self.change_state(PresenceState::Login, None).await
    }

    /// NOT_READY → LOGOUT
    ///
    /// With `force`, an agent in a ready-state is first switched to NOT_READY.
    ///
    /// # Errors
    /// Returns `AgentError::WrongState` if the agent is not NOT_READY, the
    /// prerequisite's error if the forced switch fails, or the error of the
    /// failed phase
    pub async fn logout(&self, options: TransitionOptions) -> Result<()> {
        self.guarded_logout(None, options).await
    }

    /// NOT_READY → LOGOUT with a reason code
    ///
    /// # Errors
    /// Same as [`logout`](Self::logout)
    pub async fn logout_with_reason(&self, reason: u32, options: TransitionOptions) -> Result<()> {
        self.guarded_logout(Some(reason), options).await
    }

    /// Any non-ready state → READY
    ///
    /// A logged-out agent is refused unless `force` is set, in which case it
    /// is logged in first.
    ///
    /// # Errors
    /// Returns `AgentError::WrongState` if the agent is already in a
    /// ready-state or logged out without `force`, the prerequisite's error
    /// if the forced login fails, or the error of the failed phase
    pub async fn ready(&self, options: TransitionOptions) -> Result<()> {
        let state = self.last_state();
        if state.is_ready() {
            return Err(self.refuse(state, "switch to ready"));
        }
        if state == PresenceState::Logout {
            if !options.force {
                return Err(self.refuse(state, "switch to ready"));
            }
            log::debug!("[{}] force login before ready", self.name());
            self.login().await?;
        }
        self.change_state(PresenceState::Ready, None).await
    }

    /// Ready-state → NOT_READY
    ///
    /// # Errors
    /// Returns `AgentError::WrongState` unless the agent is in a ready-state,
    /// or the error of the failed phase
    pub async fn not_ready(&self) -> Result<()> {
        self.guarded_not_ready(None).await
    }

    /// Ready-state → NOT_READY with a reason code
    ///
    /// # Errors
    /// Same as [`not_ready`](Self::not_ready)
    pub async fn not_ready_with_reason(&self, reason: u32) -> Result<()> {
        self.guarded_not_ready(Some(reason)).await
    }

    /// Run `operation` with `options`
    ///
    /// # Errors
    /// The error of the dispatched transition
    pub async fn run(&self, operation: Operation, options: TransitionOptions) -> Result<()> {
        match operation {
            Operation::Login => self.login().await,
            Operation::Logout => self.logout(options).await,
            Operation::Ready => self.ready(options).await,
            Operation::NotReady => self.not_ready().await,
        }
    }

    async fn guarded_not_ready(&self, reason: Option<u32>) -> Result<()> {
        let state = self.last_state();
        if !state.is_ready() {
            return Err(self.refuse(state, "switch to not ready"));
        }
        self.change_state(PresenceState::NotReady, reason).await
    }

    async fn guarded_logout(&self, reason: Option<u32>, options: TransitionOptions) -> Result<()> {
        let mut state = self.last_state();
        if options.force && state.is_ready() {
            log::debug!("[{}] force not ready before logout", self.name());
            self.not_ready().await?;
            state = self.last_state();
        }
        if state != PresenceState::NotReady {
            return Err(self.refuse(state, "logout"));
        }
        self.change_state(PresenceState::Logout, reason).await
    }

    fn refuse(&self, state: PresenceState, operation: &str) -> AgentError {
        let error = AgentError::wrong_state(self.name(), state, operation);
        log::error!("[{}] {}", self.name(), error);
        error
    }

    /// Two-phase state change without guards
    async fn change_state(&self, target: PresenceState, reason: Option<u32>) -> Result<()> {
        let agent = self.name();
        if self.is_cancelled() {
            return Err(AgentError::cancelled(agent));
        }
        if !self.notifications_started() {
            log::error!("[{}] change state to {} without push notifications", agent, target);
            return Err(AgentError::subscription(format!(
                "push notifications not started for agent [{agent}]"
            )));
        }
        let login_id = self.resolve_id().await?;
        let body = StateChangeRequest::for_target(target, &self.identity.line, reason)
            .to_xml()
            .map_err(|e| {
                log::error!("[{}] change state to {} failed: {}", agent, target, e);
                AgentError::request_failed(e.to_string())
            })?;

        // One transition at a time owns the mailbox.
        let mut mailbox = self.mailbox.lock().await;
        mailbox.drain(agent);

        let request = self.request(ApiRequest::put_user(login_id.as_str(), body));
        let request_id = request.id.clone();
        let response = self.transport.execute(request).await.map_err(|e| {
            log::error!("[{}] [{}] change state to {} failed: {}", agent, request_id, target, e);
            match e {
                AgentError::RequestFailed(_) => e,
                other => AgentError::request_failed(other.to_string()),
            }
        })?;
        if !response.is_success() {
            log::error!(
                "[{}] [{}] change state to {} returned status {}",
                agent,
                request_id,
                target,
                response.status
            );
            return Err(AgentError::response(response.status, response.error_text()));
        }
        log::trace!("[{}] [{}] state change request to {} accepted", agent, request_id, target);

        let timeout = self.options.confirmation_timeout;
        let deadline = Instant::now() + timeout;
        let mut unrelated: Option<String> = None;
        loop {
            let wait = tokio::select! {
                () = self.cancel.cancelled() => return Err(AgentError::cancelled(agent)),
                wait = mailbox.recv_until(deadline) => wait,
            };
            match wait {
                MailboxWait::Item(content) => match classify(agent, &content) {
                    Confirmation::Confirmed(status) => {
                        let confirmed = status.presence();
                        if confirmed != target {
                            log::debug!(
                                "[{}] requested {} but platform reports {}",
                                agent,
                                target,
                                confirmed
                            );
                        }
                        self.store_status(status);
                        log::trace!("[{}] [{}] state is now {}", agent, request_id, confirmed);
                        return Ok(());
                    }
                    Confirmation::Rejected(e) => {
                        log::error!("[{}] [{}] {}", agent, request_id, e);
                        return Err(e);
                    }
                    Confirmation::Unrelated(what) => {
                        log::debug!("[{}] keep waiting after {}", agent, what);
                        unrelated = Some(what);
                    }
                },
                MailboxWait::TimedOut => {
                    if let Some(what) = unrelated {
                        log::error!("[{}] [{}] no user status before deadline", agent, request_id);
                        return Err(AgentError::payload(what));
                    }
                    log::error!(
                        "[{}] [{}] collect notify response timeouts after {:?}",
                        agent,
                        request_id,
                        timeout
                    );
                    return Err(AgentError::notification_timeout(agent, timeout));
                }
                MailboxWait::Closed => {
                    if self.is_cancelled() {
                        return Err(AgentError::cancelled(agent));
                    }
                    log::error!("[{}] push channel closed while waiting", agent);
                    return Err(AgentError::subscription(format!(
                        "push channel closed for agent [{agent}]"
                    )));
                }
            }
        }
    }
}
