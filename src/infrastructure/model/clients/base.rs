//! Base HTTP client with shared logic

use crate::config::AzureCredential;
use crate::infrastructure::model::types::ModelError;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: String, timeout: Duration) -> Result<Self, ModelError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::network(&id, e))?;
        Ok(Self { id, endpoint, http })
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Post JSON using the given Azure credential
    pub async fn post_with_credential<Req, Res>(
        &self,
        url: &str,
        credential: &AzureCredential,
        body: &Req,
    ) -> Result<Res, ModelError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let request = self.http.post(url).json(body);
        let request = match credential {
            AzureCredential::ApiKey(key) => request.header("api-key", key),
            AzureCredential::BearerToken(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;

        if !status.is_success() {
            return Err(ModelError::api(
                Some(status.as_u16()),
                api_error_message(status, &text),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| ModelError::invalid_response(&self.id, e.to_string()))
    }
}

/// Prefer the service's `error.message`; fall back to the status line.
pub(crate) fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        })
}
