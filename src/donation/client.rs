use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use crate::donation::draft::DonationPayload;

/// Shown when the endpoint rejects a save without saying why.
pub const SAVE_FAILED_FALLBACK: &str = "Failed to save food data";

/// Shown for transport failures and unreadable error bodies.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The endpoint answered with a non-2xx status.
    #[error("{0}")]
    Rejected(String),

    /// The request never got a usable answer.
    #[error("Save request failed: {0}")]
    NetworkOrUnknown(String),
}

impl SubmitError {
    /// Text surfaced inline on the form.
    pub fn user_message(&self) -> &str {
        match self {
            SubmitError::Rejected(message) => message,
            SubmitError::NetworkOrUnknown(_) => GENERIC_FAILURE,
        }
    }
}

/// The collaborator that persists a donation.
#[async_trait]
pub trait SaveFoodClient: Send + Sync {
    async fn save(&self, payload: &DonationPayload) -> Result<(), SubmitError>;
}

/// POSTs donations as JSON to the configured save endpoint.
#[derive(Clone)]
pub struct HttpSaveFoodClient {
    http: reqwest::Client,
    endpoint: String,
    cookie: Option<String>,
}

impl HttpSaveFoodClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            cookie: None,
        })
    }

    /// A copy that forwards `cookie` so the endpoint can attribute the donor.
    pub fn with_cookie(&self, cookie: String) -> Self {
        Self {
            cookie: Some(cookie),
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SaveFoodClient for HttpSaveFoodClient {
    async fn save(&self, payload: &DonationPayload) -> Result<(), SubmitError> {
        let mut request = self.http.post(&self.endpoint).json(payload);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Save request to {} failed: {}", self.endpoint, e);
            SubmitError::NetworkOrUnknown(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::NetworkOrUnknown(e.to_string()))?;
        let err = rejection_from_body(&body);
        tracing::info!("Save endpoint answered {}: {}", status, err);
        Err(err)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Interpret the body of a non-2xx answer.
fn rejection_from_body(body: &[u8]) -> SubmitError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
        }) if !message.is_empty() => SubmitError::Rejected(message),
        Ok(_) => SubmitError::Rejected(SAVE_FAILED_FALLBACK.to_string()),
        Err(e) => SubmitError::NetworkOrUnknown(format!("unreadable error body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_in_body_is_surfaced() {
        let err = rejection_from_body(br#"{"message":"Duplicate entry"}"#);
        assert_eq!(err, SubmitError::Rejected("Duplicate entry".into()));
        assert_eq!(err.user_message(), "Duplicate entry");
    }

    #[test]
    fn missing_or_empty_message_falls_back() {
        for body in [&br#"{}"#[..], br#"{"message":""}"#, br#"{"message":null}"#] {
            assert_eq!(
                rejection_from_body(body).user_message(),
                SAVE_FAILED_FALLBACK
            );
        }
    }

    #[test]
    fn unparseable_body_is_generic() {
        for body in [&b""[..], b"<html>502</html>"] {
            let err = rejection_from_body(body);
            assert!(matches!(err, SubmitError::NetworkOrUnknown(_)));
            assert_eq!(err.user_message(), GENERIC_FAILURE);
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_failure() {
        // Nothing listens on the loopback discard port.
        let client =
            HttpSaveFoodClient::new("http://127.0.0.1:9/api/save-food", Duration::from_secs(2))
                .unwrap();
        let payload = DonationPayload {
            description: "Bread".into(),
            quantity: "2 loaves".into(),
            location: "Market".into(),
        };
        let err = client.save(&payload).await.unwrap_err();
        assert!(matches!(err, SubmitError::NetworkOrUnknown(_)));
    }
}
