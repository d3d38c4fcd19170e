//! Per-agent bounded mailbox

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Result of waiting on a mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxWait {
    /// A payload arrived
    Item(String),
    /// The deadline passed
    TimedOut,
    /// Every sender is gone; nothing can arrive any more
    Closed,
}

/// Receiving half of an agent's notification queue
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::Receiver<String>,
}

impl Mailbox {
    /// Create a mailbox and the sender that feeds it
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    /// Discard every queued payload
    ///
    /// Returns the number of payloads removed.
    pub fn drain(&mut self, agent: &str) -> usize {
        let mut removed = 0;
        while let Ok(stale) = self.rx.try_recv() {
            log::debug!("[{}] remove stale notification [{}]", agent, stale);
            removed += 1;
        }
        removed
    }

    /// Wait for the next payload until `deadline`
    pub async fn recv_until(&mut self, deadline: Instant) -> MailboxWait {
        match tokio::time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(item)) => MailboxWait::Item(item),
            Ok(None) => MailboxWait::Closed,
            Err(_) => MailboxWait::TimedOut,
        }
    }

    /// Number of queued payloads
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
