//! Listener task routing push items into an agent's mailbox

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::message::envelope::sniff_kind;

use super::{PushEvent, PushStream};

/// What happened to one routed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    /// Queued in the mailbox
    Delivered,
    /// Not a confirmation payload; discarded
    Ignored,
    /// Could not be queued in time; discarded
    Lost,
    /// Delivery abandoned because the listener was cancelled
    Cancelled,
}

/// Route one pubsub item
///
/// User and error payloads go to the mailbox, waiting at most
/// `delivery_timeout` for space or until `cancel` fires. Everything else is
/// logged and dropped.
pub async fn route_item(
    agent: &str,
    item: String,
    mailbox: &mpsc::Sender<String>,
    delivery_timeout: Duration,
    cancel: &CancellationToken,
) -> RouteResult {
    let kind = match sniff_kind(&item) {
        Ok(kind) => kind,
        Err(e) => {
            log::warn!("[{}] discard unreadable notification: {}", agent, e);
            return RouteResult::Ignored;
        }
    };
    if !kind.is_confirmation() {
        log::debug!("[{}] ignore {} notification", agent, kind);
        return RouteResult::Ignored;
    }

    let sent = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            log::debug!("[{}] drop {} notification, listener cancelled", agent, kind);
            return RouteResult::Cancelled;
        }
        sent = mailbox.send_timeout(item, delivery_timeout) => sent,
    };
    match sent {
        Ok(()) => {
            log::trace!("[{}] queued {} notification", agent, kind);
            RouteResult::Delivered
        }
        Err(SendTimeoutError::Timeout(_)) => {
            log::warn!(
                "[{}] notification queue is full after {:?}. Data lost!",
                agent,
                delivery_timeout
            );
            RouteResult::Lost
        }
        Err(SendTimeoutError::Closed(_)) => {
            log::warn!("[{}] notification queue is closed. Data lost!", agent);
            RouteResult::Lost
        }
    }
}

/// Spawn the listener for one agent's push stream
///
/// The task ends when `cancel` fires or the stream ends; either way the
/// mailbox sender is dropped with it.
pub fn spawn_listener(
    agent: String,
    mut stream: PushStream,
    mailbox: mpsc::Sender<String>,
    delivery_timeout: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        log::debug!("[{}] start push listener", agent);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    log::trace!("[{}] stop push listener", agent);
                    break;
                }
                event = stream.next() => match event {
                    Some(PushEvent::Items(items)) => {
                        for item in items {
                            let routed =
                                route_item(&agent, item, &mailbox, delivery_timeout, &cancel).await;
                            if routed == RouteResult::Cancelled {
                                break;
                            }
                        }
                    }
                    Some(PushEvent::OtherExtension(name)) => {
                        log::warn!("[{}] unknown push extension type [{}]", agent, name);
                    }
                    Some(PushEvent::Bare) => {
                        log::warn!("[{}] push message without extension", agent);
                    }
                    None => {
                        log::warn!("[{}] push stream ended", agent);
                        break;
                    }
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Mailbox;

    const USER: &str = "<Update><data><user><uri>/u/1</uri><state>READY</state></user></data></Update>";
    const DIALOG: &str = "<Update><data><dialogs/></data></Update>";

    #[tokio::test]
    async fn only_confirmations_are_queued() {
        let cancel = CancellationToken::new();
        let (tx, mut mailbox) = Mailbox::channel(4);
        let timeout = Duration::from_millis(50);
        assert_eq!(
            route_item("a", USER.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Delivered
        );
        assert_eq!(
            route_item("a", DIALOG.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Ignored
        );
        assert_eq!(
            route_item("a", "</broken>".to_string(), &tx, timeout, &cancel).await,
            RouteResult::Ignored
        );
        assert_eq!(mailbox.drain("a"), 1);
    }

    #[tokio::test]
    async fn full_mailbox_drops_after_the_delivery_timeout() {
        let cancel = CancellationToken::new();
        let (tx, _mailbox) = Mailbox::channel(1);
        let timeout = Duration::from_millis(20);
        assert_eq!(
            route_item("a", USER.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Delivered
        );
        let started = tokio::time::Instant::now();
        assert_eq!(
            route_item("a", USER.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Lost
        );
        assert!(started.elapsed() >= timeout);
    }

    #[tokio::test]
    async fn cancel_interrupts_a_blocked_delivery() {
        let cancel = CancellationToken::new();
        let (tx, _mailbox) = Mailbox::channel(1);
        let timeout = Duration::from_secs(10);
        assert_eq!(
            route_item("a", USER.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Delivered
        );

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let started = tokio::time::Instant::now();
        assert_eq!(
            route_item("a", USER.to_string(), &tx, timeout, &cancel).await,
            RouteResult::Cancelled
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn cancelled_listener_stops_while_the_mailbox_is_full() {
        let cancel = CancellationToken::new();
        let (tx, _mailbox) = Mailbox::channel(1);
        let items = vec![USER.to_string(), USER.to_string(), USER.to_string()];
        let events = futures::stream::iter(vec![PushEvent::Items(items)]);
        let stream: PushStream = Box::pin(events.chain(futures::stream::pending()));
        let handle = spawn_listener(
            "a".to_string(),
            stream,
            tx,
            Duration::from_secs(10),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        cancel.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(joined.is_ok(), "listener kept running after cancel");
    }
}
