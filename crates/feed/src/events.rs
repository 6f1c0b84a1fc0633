//! Feed events for downstream consumers.
//!
//! The poller publishes every outcome of a cycle on a broadcast channel;
//! consumers subscribe explicitly and render or react as they see fit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::AnalysisFrame;

/// Events published by the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeedEvent {
    /// A new validated frame was reconciled and emitted.
    Frame(Box<AnalysisFrame>),
    /// A cycle step failed transiently; another attempt follows after `delay`.
    Retrying {
        /// 1-based retry number, strictly increasing within a cycle.
        attempt: u32,
        max_retries: u32,
        delay: Duration,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// Retries exhausted for this cycle; polling continues on schedule.
    CycleError {
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// The session is gone; polling stopped.
    AuthenticationLost {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl FeedEvent {
    /// Get a human-readable description of the event, suitable as the
    /// consumer's single current status line.
    pub fn description(&self) -> String {
        match self {
            FeedEvent::Frame(frame) => {
                format!(
                    "new frame {}: {} (focus {:.2}, intensity {:.2})",
                    frame.image_id,
                    frame.classification_label,
                    frame.focus_score,
                    frame.intensity_average
                )
            }
            FeedEvent::Retrying {
                attempt,
                max_retries,
                delay,
                message,
                ..
            } => {
                format!(
                    "[retry {}/{}] {}, retrying in {}s",
                    attempt,
                    max_retries,
                    message,
                    delay.as_secs()
                )
            }
            FeedEvent::CycleError { message, .. } => {
                format!("failed to retrieve data after retries: {message}")
            }
            FeedEvent::AuthenticationLost { message, .. } => {
                format!("authentication lost: {message}; polling stopped")
            }
        }
    }

    /// True when the event marks the end of the polling run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedEvent::AuthenticationLost { .. })
    }
}

/// Broadcaster for feed events.
pub struct FeedEventBroadcaster {
    sender: broadcast::Sender<FeedEvent>,
}

impl FeedEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(crate::config::DEFAULT_EVENT_CAPACITY)
    }

    /// Create a new broadcaster with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to feed events.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    /// Publish a feed event.
    pub fn publish(
        &self,
        event: FeedEvent,
    ) -> Result<usize, broadcast::error::SendError<FeedEvent>> {
        self.sender.send(event)
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FeedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FeedEventBroadcaster {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
