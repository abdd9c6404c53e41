//! Auth-state change notifications.
//!
//! Every browser gets a channel id stored in its session. A login page that
//! is left open subscribes to its channel and follows the browser to the
//! panel once a sign-in happens elsewhere in the same browser (another tab,
//! for instance). Dropping the subscription unsubscribes.

use tokio::sync::broadcast;
use tracing::debug;

/// Events buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// What happened to a browser's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

/// An auth-state change on one browser channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub channel: String,
    pub kind: AuthEventKind,
}

/// Fan-out of auth-state changes to open login pages.
#[derive(Debug, Clone)]
pub struct AuthStateNotifier {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthStateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Nobody listening is not an error.
    pub fn publish(&self, channel: &str, kind: AuthEventKind) {
        let delivered = self
            .sender
            .send(AuthEvent {
                channel: channel.to_string(),
                kind,
            })
            .unwrap_or(0);
        debug!(channel, ?kind, delivered, "Published auth event");
    }

    /// Listen for events on one browser channel.
    #[must_use]
    pub fn subscribe(&self, channel: impl Into<String>) -> AuthSubscription {
        AuthSubscription {
            channel: channel.into(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of open subscriptions across all channels.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to one channel.
#[derive(Debug)]
pub struct AuthSubscription {
    channel: String,
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Wait for the next event on this channel.
    ///
    /// Returns `None` once the notifier is gone. Events missed because the
    /// subscriber fell behind are skipped.
    pub async fn next(&mut self) -> Option<AuthEventKind> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.channel == self.channel => return Some(event.kind),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Auth subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
