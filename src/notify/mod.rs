//! Push notification channel
//!
//! A [`PushSubscriber`] opens one event stream per agent. The router task
//! reads that stream, keeps only payloads that can confirm a transition and
//! hands them to the agent's bounded [`Mailbox`], where the session engine
//! waits for them.

mod mailbox;
mod memory;
mod router;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::identifiers::LoginId;

pub use mailbox::{Mailbox, MailboxWait};
pub use memory::MemoryPushSource;
pub use router::{RouteResult, route_item, spawn_listener};

/// One event received from the push stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// Pubsub items; each string is the raw content of one item
    Items(Vec<String>),
    /// A message carrying an extension the channel does not handle
    OtherExtension(String),
    /// A message without any extension
    Bare,
}

/// Stream of push events for one agent
pub type PushStream = BoxStream<'static, PushEvent>;

/// What a subscriber needs to open an agent's stream
#[derive(Clone, PartialEq, Eq)]
pub struct SubscriptionKey {
    /// Durable agent id, used as the stream's node
    pub login_id: LoginId,
    /// Login name
    pub login_name: String,
    /// Credential
    pub password: String,
    /// Push domain, if one could be determined
    pub domain: Option<String>,
}

impl fmt::Debug for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionKey")
            .field("login_id", &self.login_id)
            .field("login_name", &self.login_name)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Source of per-agent push streams
///
/// Implementations own the handshake, reconnection and framing of the
/// underlying push transport; the stream they return only has to yield
/// [`PushEvent`]s and end when the subscription is gone.
pub trait PushSubscriber: Send + Sync + 'static {
    /// Open the stream for one agent
    ///
    /// # Errors
    /// Returns `AgentError::Subscription` if the stream cannot be opened
    fn subscribe(&self, key: SubscriptionKey)
    -> impl Future<Output = Result<PushStream>> + Send;
}

impl<S: PushSubscriber> PushSubscriber for Arc<S> {
    fn subscribe(
        &self,
        key: SubscriptionKey,
    ) -> impl Future<Output = Result<PushStream>> + Send {
        (**self).subscribe(key)
    }
}
