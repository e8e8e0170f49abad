//! Last-value-wins status channel between the assistant and its surface.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The single piece of feedback shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    /// Active messages are highlighted; inactive ones are rendered muted.
    pub active: bool,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, active: bool) -> Self {
        Self {
            text: text.into(),
            active,
        }
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::new("Idle", false)
    }
}

/// Sink for status updates. Reporting never fails.
pub trait StatusReporter: Send + Sync {
    fn report(&self, text: &str, active: bool);
}

impl<T: StatusReporter + ?Sized> StatusReporter for std::sync::Arc<T> {
    fn report(&self, text: &str, active: bool) {
        (**self).report(text, active)
    }
}

/// Status reporter backed by a `watch` channel.
///
/// Observers only ever see the latest message; intermediate updates that
/// arrive faster than they are read are overwritten.
#[derive(Debug)]
pub struct StatusBoard {
    tx: watch::Sender<StatusMessage>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusMessage::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusMessage> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> StatusMessage {
        self.tx.borrow().clone()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for StatusBoard {
    fn report(&self, text: &str, active: bool) {
        tracing::debug!(status = %text, active, "Status update");
        // send_replace stores the value even when nobody is subscribed.
        self.tx.send_replace(StatusMessage::new(text, active));
    }
}
