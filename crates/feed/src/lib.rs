//! Polling and reconciliation engine for CyteView analysis feeds.
//!
//! This crate authenticates against a remote inference API, polls it on a
//! timer, and reconciles each image with its analysis record before handing
//! validated frames to subscribers. It owns token refresh, bounded retry on
//! transient failures, and deduplication of already-seen results.
//!
//! ## Component Overview
//!
//! - `auth`: login/refresh flows and the token pair they maintain
//! - `client`: authenticated resource fetching with refresh-and-retry on 401
//! - `poller`: the timed fetch/validate/emit loop
//! - `retry`: bounded retry with fixed or linear spacing
//! - `events`: broadcast channel feeding consumers
//! - `models`: wire types and the validated [`AnalysisFrame`]
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyteview_feed::{ApiClient, Authenticator, FeedConfig, Poller, build_http_client};
//!
//! # async fn run() -> cyteview_feed::Result<()> {
//! let config = FeedConfig::parse("https://api.example.com")?;
//! let client = build_http_client(config.request_timeout)?;
//! let auth = Arc::new(Authenticator::new(client.clone(), config.base_url.clone()));
//!
//! if !auth.login("lab", "secret").await {
//!     return Ok(());
//! }
//!
//! let api = ApiClient::new(client, config.base_url.clone(), auth.clone());
//! let poller = Poller::new(api, auth, &config);
//! let mut events = poller.subscribe();
//! poller.start();
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.description());
//!     if event.is_fatal() {
//!         break;
//!     }
//! }
//! poller.stop();
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod poller;
pub mod retry;

pub use auth::Authenticator;
pub use client::{ApiClient, build_http_client};
pub use config::{Credentials, FeedConfig};
pub use error::{FeedError, Result};
pub use events::{FeedEvent, FeedEventBroadcaster};
pub use models::{AnalysisFrame, ImageResponse, ResultsResponse, TokenResponse};
pub use poller::Poller;
pub use retry::{RetryAction, RetryPolicy, RetrySpacing, retry_with_policy};
