use reqwest::StatusCode;

/// Feed-wide result type.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors produced while authenticating, fetching, or reconciling feed data.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("session expired, log in again")]
    SessionExpired,

    #[error("feed cancelled")]
    Cancelled,

    #[error("invalid base URL `{input}`: {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} during {operation}")]
    HttpStatus {
        status: StatusCode,
        operation: &'static str,
    },

    #[error("malformed response during {operation}: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },

    #[error("results id `{results_id}` does not match image id `{image_id}`")]
    IdentityMismatch {
        image_id: String,
        results_id: String,
    },

    #[error("invalid image payload: {reason}")]
    ImageData { reason: String },
}

impl FeedError {
    pub fn invalid_base_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }

    pub fn image_data(reason: impl Into<String>) -> Self {
        Self::ImageData {
            reason: reason.into(),
        }
    }

    /// True when the error means the session is gone and the polling run
    /// must halt instead of scheduling another attempt.
    pub fn is_auth_loss(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::SessionExpired)
    }

    /// Classify whether a failed cycle step may be attempted again.
    ///
    /// Auth loss, cancellation, and a bad base URL are permanent;
    /// everything observed on the wire (network faults, bad statuses,
    /// undecodable bodies, mid-update identity skew) is worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotLoggedIn
            | Self::SessionExpired
            | Self::Cancelled
            | Self::InvalidBaseUrl { .. } => false,
            Self::Network { .. }
            | Self::HttpStatus { .. }
            | Self::MalformedResponse { .. }
            | Self::IdentityMismatch { .. }
            | Self::ImageData { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_loss_is_not_retryable() {
        assert!(!FeedError::NotLoggedIn.is_retryable());
        assert!(!FeedError::SessionExpired.is_retryable());
        assert!(FeedError::NotLoggedIn.is_auth_loss());
        assert!(FeedError::SessionExpired.is_auth_loss());
    }

    #[test]
    fn wire_failures_are_retryable() {
        let mismatch = FeedError::IdentityMismatch {
            image_id: "img2".to_string(),
            results_id: "img3".to_string(),
        };
        assert!(mismatch.is_retryable());
        assert!(!mismatch.is_auth_loss());

        let status = FeedError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            operation: "fetch image",
        };
        assert!(status.is_retryable());

        assert!(FeedError::image_data("decoded image is empty").is_retryable());
        assert!(FeedError::malformed("fetch results", "missing field").is_retryable());
    }

    #[test]
    fn cancellation_is_terminal() {
        assert!(!FeedError::Cancelled.is_retryable());
        assert!(!FeedError::Cancelled.is_auth_loss());
    }

    #[test]
    fn mismatch_message_names_both_ids() {
        let err = FeedError::IdentityMismatch {
            image_id: "img2".to_string(),
            results_id: "img3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("img2"));
        assert!(msg.contains("img3"));
    }
}
