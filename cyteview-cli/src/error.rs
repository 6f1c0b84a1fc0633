use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feed error: {0}")]
    Feed(#[from] cyteview_feed::FeedError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Login failed for `{0}`: check credentials and base URL")]
    LoginFailed(String),

    #[error("{0}")]
    AuthenticationLost(String),
}
