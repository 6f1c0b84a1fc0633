//! Wire models for the inference API and the validated frame handed to
//! consumers.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response shared by the login and refresh endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of `GET /api/image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_id: String,
    pub image_data_base64: String,
}

/// Response of `GET /api/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub image_id: String,
    pub intensity_average: f64,
    pub focus_score: f64,
    pub classification_label: String,
    pub histogram: Vec<u64>,
}

/// A reconciled image/results pair with the payload decoded.
///
/// Constructible only through [`AnalysisFrame::from_pair`], which rejects
/// mismatched identities and empty or undecodable payloads. Holding a frame
/// therefore guarantees `image_bytes` is non-empty and belongs to `image_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFrame {
    pub image_id: String,
    pub image_bytes: Vec<u8>,
    pub classification_label: String,
    pub focus_score: f64,
    pub intensity_average: f64,
    pub histogram: Vec<u64>,
    pub received_at: DateTime<Utc>,
}

impl AnalysisFrame {
    /// Pair an image with its analysis record.
    ///
    /// Fails with [`FeedError::IdentityMismatch`] when the two responses
    /// refer to different images and with [`FeedError::ImageData`] when the
    /// payload is not valid base64 or decodes to zero bytes.
    pub fn from_pair(image: ImageResponse, results: ResultsResponse) -> Result<Self> {
        if image.image_id != results.image_id {
            return Err(FeedError::IdentityMismatch {
                image_id: image.image_id,
                results_id: results.image_id,
            });
        }

        let image_bytes = decode_image_payload(&image.image_data_base64)?;

        Ok(Self {
            image_id: results.image_id,
            image_bytes,
            classification_label: results.classification_label,
            focus_score: results.focus_score,
            intensity_average: results.intensity_average,
            histogram: results.histogram,
            received_at: Utc::now(),
        })
    }
}

fn decode_image_payload(encoded: &str) -> Result<Vec<u8>> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| FeedError::image_data(format!("payload is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(FeedError::image_data("decoded image is empty"));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, payload: &str) -> ImageResponse {
        ImageResponse {
            image_id: id.to_string(),
            image_data_base64: payload.to_string(),
        }
    }

    fn results(id: &str) -> ResultsResponse {
        ResultsResponse {
            image_id: id.to_string(),
            intensity_average: 101.5,
            focus_score: 0.87,
            classification_label: "healthy".to_string(),
            histogram: vec![1, 2, 3],
        }
    }

    #[test]
    fn from_pair_decodes_matching_pair() {
        // "AAECAw==" is the standard-alphabet encoding of [0, 1, 2, 3].
        let frame = AnalysisFrame::from_pair(image("img1", "AAECAw=="), results("img1")).unwrap();
        assert_eq!(frame.image_id, "img1");
        assert_eq!(frame.image_bytes, vec![0, 1, 2, 3]);
        assert_eq!(frame.classification_label, "healthy");
        assert_eq!(frame.histogram, vec![1, 2, 3]);
    }

    #[test]
    fn from_pair_rejects_mismatched_identities() {
        let err = AnalysisFrame::from_pair(image("img2", "AAECAw=="), results("img3")).unwrap_err();
        match err {
            FeedError::IdentityMismatch {
                image_id,
                results_id,
            } => {
                assert_eq!(image_id, "img2");
                assert_eq!(results_id, "img3");
            }
            other => panic!("expected IdentityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn from_pair_rejects_empty_payload() {
        let err = AnalysisFrame::from_pair(image("img1", ""), results("img1")).unwrap_err();
        assert!(matches!(err, FeedError::ImageData { .. }));
    }

    #[test]
    fn from_pair_rejects_invalid_base64() {
        let err = AnalysisFrame::from_pair(image("img1", "%%%%"), results("img1")).unwrap_err();
        assert!(matches!(err, FeedError::ImageData { .. }));
    }

    #[test]
    fn results_response_parses_wire_names() {
        let json = r#"{
            "image_id": "img1",
            "intensity_average": 101.5,
            "focus_score": 0.87,
            "classification_label": "healthy",
            "histogram": [0, 4, 9, 1]
        }"#;
        let parsed: ResultsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.image_id, "img1");
        assert_eq!(parsed.histogram, vec![0, 4, 9, 1]);
        assert!((parsed.focus_score - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn token_response_parses_wire_names() {
        let json = r#"{"access_token": "a1", "refresh_token": "r1"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "a1");
        assert_eq!(parsed.refresh_token, "r1");
    }
}
