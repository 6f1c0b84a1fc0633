//! Timed polling loop that reconciles image/results pairs.
//!
//! One spawned task owns the loop: sleep one interval, run one cycle,
//! repeat. Cycles never overlap because the next sleep only starts after
//! the previous cycle fully completes, retries included. Stopping cancels
//! the pending sleep; an in-flight cycle finishes but nothing is scheduled
//! after it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::auth::Authenticator;
use crate::client::ApiClient;
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::events::{FeedEvent, FeedEventBroadcaster};
use crate::models::AnalysisFrame;
use crate::retry::{RetryAction, RetryPolicy, retry_with_policy};

/// Outcome of one successful cycle attempt.
enum CycleOutcome {
    /// A new frame was reconciled and must be emitted.
    Emitted(Box<AnalysisFrame>),
    /// The service has not produced new output since the last emission.
    Duplicate,
}

struct RunHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Drives the fetch/validate/emit loop on a timer.
pub struct Poller {
    api: ApiClient,
    auth: Arc<Authenticator>,
    poll_interval: Duration,
    retry: RetryPolicy,
    events: FeedEventBroadcaster,
    run: Mutex<Option<RunHandle>>,
}

impl Poller {
    pub fn new(api: ApiClient, auth: Arc<Authenticator>, config: &FeedConfig) -> Self {
        Self {
            api,
            auth,
            poll_interval: config.poll_interval,
            retry: config.retry.clone(),
            events: FeedEventBroadcaster::with_capacity(config.event_capacity),
            run: Mutex::new(None),
        }
    }

    /// Subscribe to feed events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Get the event broadcaster for external use.
    pub fn broadcaster(&self) -> &FeedEventBroadcaster {
        &self.events
    }

    /// Begin polling. The last-emitted identity starts empty and the first
    /// cycle runs after one full interval. No-op while a run is active.
    pub fn start(&self) {
        let mut run = self.run.lock();
        if let Some(handle) = run.as_ref()
            && !handle.task.is_finished()
        {
            debug!("Poller already running");
            return;
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            self.api.clone(),
            self.auth.clone(),
            self.poll_interval,
            self.retry.clone(),
            self.events.clone(),
            token.clone(),
        ));
        *run = Some(RunHandle { token, task });
    }

    /// Stop polling. Cancels the pending timer; any in-flight cycle
    /// observes the cancellation before rescheduling.
    pub fn stop(&self) {
        if let Some(handle) = self.run.lock().take() {
            debug!("Stopping poller");
            handle.token.cancel();
        }
    }

    /// True while the polling task is alive.
    pub fn is_running(&self) -> bool {
        self.run
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }
}

async fn run_loop(
    api: ApiClient,
    auth: Arc<Authenticator>,
    poll_interval: Duration,
    retry: RetryPolicy,
    events: FeedEventBroadcaster,
    token: CancellationToken,
) {
    info!(
        interval_ms = poll_interval.as_millis() as u64,
        max_retries = retry.max_retries,
        "Polling started"
    );
    let mut last_image_id: Option<String> = None;

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }

        if !drive_cycle(&api, &auth, &retry, &events, &token, &mut last_image_id).await {
            break;
        }
    }

    debug!("Polling loop stopped");
}

/// Run one cycle including retries. Returns false when the run must halt:
/// authentication is gone or the poller was stopped mid-cycle.
async fn drive_cycle(
    api: &ApiClient,
    auth: &Authenticator,
    retry: &RetryPolicy,
    events: &FeedEventBroadcaster,
    token: &CancellationToken,
    last_image_id: &mut Option<String>,
) -> bool {
    if !auth.is_logged_in() {
        publish(
            events,
            FeedEvent::AuthenticationLost {
                message: FeedError::NotLoggedIn.to_string(),
                timestamp: Utc::now(),
            },
        );
        return false;
    }

    let last = last_image_id.clone();
    let result = retry_with_policy(
        retry,
        token,
        |attempt, delay, err| {
            publish(
                events,
                FeedEvent::Retrying {
                    attempt,
                    max_retries: retry.max_retries,
                    delay,
                    message: err.to_string(),
                    timestamp: Utc::now(),
                },
            );
        },
        |_| {
            let last = last.clone();
            async move {
                match attempt_cycle(api, last.as_deref()).await {
                    Ok(outcome) => RetryAction::Success(outcome),
                    Err(err) if err.is_retryable() => RetryAction::Retry(err),
                    Err(err) => RetryAction::Fail(err),
                }
            }
        },
    )
    .await;

    match result {
        Ok(CycleOutcome::Emitted(frame)) => {
            *last_image_id = Some(frame.image_id.clone());
            info!(image_id = %frame.image_id, "New frame emitted");
            publish(events, FeedEvent::Frame(frame));
            true
        }
        Ok(CycleOutcome::Duplicate) => {
            trace!("No new data since last cycle");
            true
        }
        Err(FeedError::Cancelled) => false,
        Err(err) if err.is_auth_loss() => {
            publish(
                events,
                FeedEvent::AuthenticationLost {
                    message: err.to_string(),
                    timestamp: Utc::now(),
                },
            );
            false
        }
        Err(err) => {
            publish(
                events,
                FeedEvent::CycleError {
                    message: err.to_string(),
                    timestamp: Utc::now(),
                },
            );
            true
        }
    }
}

/// One fetch+validate pass, separated from retry orchestration.
///
/// Both resources are fetched before any comparison. Mismatched identities
/// are a retryable failure; an identity equal to the last emitted one is
/// success with nothing new to emit and is never retried.
async fn attempt_cycle(api: &ApiClient, last_image_id: Option<&str>) -> Result<CycleOutcome> {
    let image = api.fetch_image().await?;
    let results = api.fetch_results().await?;

    if image.image_id != results.image_id {
        return Err(FeedError::IdentityMismatch {
            image_id: image.image_id,
            results_id: results.image_id,
        });
    }

    if last_image_id == Some(results.image_id.as_str()) {
        return Ok(CycleOutcome::Duplicate);
    }

    let frame = AnalysisFrame::from_pair(image, results)?;
    Ok(CycleOutcome::Emitted(Box::new(frame)))
}

fn publish(events: &FeedEventBroadcaster, event: FeedEvent) {
    if events.publish(event).is_err() {
        trace!("No feed event subscribers, event dropped");
    }
}
