//! Delivery failure taxonomy

use thiserror::Error;

/// Anything that prevents a parsed reply from reaching the transcript.
///
/// The kind is logged; users always see the same fallback text.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Connection refused, DNS, TLS, reset mid-body
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the JSON shape we expect
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl DeliveryError {
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryError::Network(_) => "network",
            DeliveryError::Status { .. } => "status",
            DeliveryError::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DeliveryError::Malformed(err.to_string())
        } else {
            DeliveryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        DeliveryError::Malformed(err.to_string())
    }
}
