//! In-process push source
//!
//! Streams are keyed by login id. Anything published before an agent
//! subscribes is lost, as it would be on the real push service.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::error::Result;

use super::{PushEvent, PushStream, PushSubscriber, SubscriptionKey};

const CHANNEL_CAPACITY: usize = 64;

/// Push source fed directly by the embedding process
#[derive(Debug, Clone, Default)]
pub struct MemoryPushSource {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<PushEvent>>>>,
}

impl MemoryPushSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, login_id: &str) -> broadcast::Sender<PushEvent> {
        self.channels
            .lock()
            .entry(login_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish an event to every open stream of `login_id`
    ///
    /// Returns the number of streams that received it.
    pub fn publish(&self, login_id: &str, event: PushEvent) -> usize {
        self.channel(login_id).send(event).unwrap_or(0)
    }

    /// Publish a single pubsub item
    pub fn publish_item(&self, login_id: &str, content: impl Into<String>) -> usize {
        self.publish(login_id, PushEvent::Items(vec![content.into()]))
    }

    /// Number of open streams for `login_id`
    #[must_use]
    pub fn subscriber_count(&self, login_id: &str) -> usize {
        self.channels
            .lock()
            .get(login_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Close every stream of `login_id`
    pub fn close(&self, login_id: &str) {
        self.channels.lock().remove(login_id);
    }
}

impl PushSubscriber for MemoryPushSource {
    fn subscribe(&self, key: SubscriptionKey) -> impl Future<Output = Result<PushStream>> + Send {
        let mut rx = self.channel(key.login_id.as_str()).subscribe();
        async move {
            let agent = key.login_name;
            let stream = async_stream::stream! {
                loop {
                    match rx.recv().await {
                        Ok(event) => yield event,
                        Err(RecvError::Lagged(skipped)) => {
                            log::warn!("[{}] push stream lagged, {} event(s) lost", agent, skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            };
            Ok(stream.boxed())
        }
    }
}
