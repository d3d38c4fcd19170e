//! Identity resolution and status refresh

use crate::error::{AgentError, Result};
use crate::message::parser::parse_user_status;
use crate::message::status::UserStatus;
use crate::notify::PushSubscriber;
use crate::transport::{ApiRequest, Transport};
use crate::types::identifiers::LoginId;

use super::AgentSession;

impl<T: Transport, S: PushSubscriber> AgentSession<T, S> {
    /// Resolve the durable agent id from the login name
    ///
    /// Idempotent: once the id is known no request is made. On failure the
    /// id stays unset and the call may be retried.
    ///
    /// # Errors
    /// Returns `AgentError::IdentityResolution` on transport failure, a
    /// non-2xx response, an unreadable body or an empty `loginId`
    pub async fn resolve_id(&self) -> Result<LoginId> {
        if let Some(id) = self.login_id() {
            return Ok(id.clone());
        }
        let agent = self.name();
        let request = self.request(ApiRequest::get_user(agent));
        let request_id = request.id.clone();

        let response = self.transport.execute(request).await.map_err(|e| {
            log::error!("[{}] [{}] get agent id failed: {}", agent, request_id, e);
            AgentError::identity(agent, e.to_string())
        })?;
        if !response.is_success() {
            log::error!(
                "[{}] [{}] get agent id returned status {}",
                agent,
                request_id,
                response.status
            );
            return Err(AgentError::identity(
                agent,
                format!("status {}: {}", response.status, response.error_text()),
            ));
        }
        let status = parse_user_status(&response.body).map_err(|e| {
            log::error!("[{}] [{}] {}", agent, request_id, e);
            AgentError::identity(agent, e.to_string())
        })?;
        if status.login_id.trim().is_empty() {
            log::error!("[{}] [{}] problem collect agentId from request", agent, request_id);
            return Err(AgentError::identity(
                agent,
                format!("agent ID is empty for agent name {agent}"),
            ));
        }

        let id = LoginId::new(status.login_id.trim());
        self.store_status(status);
        let id = self.login_id.get_or_init(|| id).clone();
        log::trace!("[{}] collect agentId [{}]", agent, id);
        Ok(id)
    }

    /// Re-read the agent's status and replace the last-known one
    ///
    /// # Errors
    /// Returns `AgentError::RequestFailed` if the request fails,
    /// `AgentError::Response` on a non-2xx answer, `AgentError::Xml` if the
    /// body is not a user document
    pub async fn refresh_status(&self) -> Result<UserStatus> {
        let agent = self.name();
        let request = self.request(ApiRequest::get_user(agent));
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            log::error!("[{}] get status returned {}", agent, response.status);
            return Err(AgentError::response(response.status, response.error_text()));
        }
        let status = parse_user_status(&response.body)?;
        log::trace!("[{}] refreshed state [{}]", agent, status.state);
        self.store_status(status.clone());
        Ok(status)
    }

    pub(super) fn request(&self, request: ApiRequest) -> ApiRequest {
        request.with_credentials(&self.identity.login_name, &self.identity.password)
    }
}
