//! Command implementations for the CyteView CLI.

use std::sync::Arc;

use cyteview_feed::{
    ApiClient, Authenticator, FeedConfig, FeedEvent, Poller, build_http_client,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    output::OutputManager,
};

pub struct CommandExecutor {
    config: AppConfig,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, output: OutputManager) -> Self {
        Self { config, output }
    }

    /// Verify the configured credentials against the service, then exit.
    pub async fn login(&self) -> Result<()> {
        let credentials = self.config.credentials()?;
        let (_api, _auth, feed_config) = self.connect().await?;
        println!(
            "{}",
            self.output
                .format_login_ok(&credentials.username, &feed_config.base_url)?
        );
        Ok(())
    }

    /// Log in, start the poller, and render events until ctrl-c or until
    /// the session is lost.
    pub async fn run(&self) -> Result<()> {
        let (api, auth, feed_config) = self.connect().await?;
        let poller = Poller::new(api, auth, &feed_config);
        let mut events = poller.subscribe();
        poller.start();
        info!(
            "Polling {} every {}s, press ctrl-c to stop",
            feed_config.base_url,
            feed_config.poll_interval.as_secs()
        );

        let outcome = self.render_events(&mut events).await;
        poller.stop();
        outcome
    }

    /// Build the HTTP stack from the configuration and perform the login.
    async fn connect(&self) -> Result<(ApiClient, Arc<Authenticator>, FeedConfig)> {
        let feed_config = self.config.feed_config()?;
        let credentials = self.config.credentials()?;
        let client = build_http_client(feed_config.request_timeout)?;
        let auth = Arc::new(Authenticator::new(
            client.clone(),
            feed_config.base_url.clone(),
        ));
        if !auth.login(&credentials.username, &credentials.password).await {
            return Err(AppError::LoginFailed(credentials.username));
        }
        let api = ApiClient::new(client, feed_config.base_url.clone(), auth.clone());
        Ok((api, auth, feed_config))
    }

    async fn render_events(
        &self,
        events: &mut tokio::sync::broadcast::Receiver<FeedEvent>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received ctrl-c, stopping");
                    return Ok(());
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        println!("{}", self.output.format_event(&event)?);
                        if let FeedEvent::AuthenticationLost { message, .. } = event {
                            return Err(AppError::AuthenticationLost(message));
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Event stream lagged, events were dropped");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                }
            }
        }
    }
}
