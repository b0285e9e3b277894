//! Notification of write requests to whatever collects the value

use crate::core::types::{Address, CandidateList};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,

    #[error("Notification failed: {0}")]
    Failed(String),
}

/// Events posted by the tracking loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A value is needed for the given 1 to 3 addresses
    WriteRequested { candidates: CandidateList },
}

pub trait WriteNotifier: Send + Sync {
    fn notify_write_requested(&self, candidates: &[Address]) -> Result<(), NotifyError>;
}

/// Posts events on a tokio unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<TrackerEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::UnboundedSender<TrackerEvent>) -> Self {
        ChannelNotifier { sender }
    }

    /// Create a notifier together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelNotifier::new(sender), receiver)
    }
}

impl WriteNotifier for ChannelNotifier {
    fn notify_write_requested(&self, candidates: &[Address]) -> Result<(), NotifyError> {
        self.sender
            .send(TrackerEvent::WriteRequested {
                candidates: candidates.to_vec(),
            })
            .map_err(|_| NotifyError::ChannelClosed)
    }
}
