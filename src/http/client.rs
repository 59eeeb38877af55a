use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::check_cancelled;
use crate::config::Config;
use crate::constants::CONTENT_TYPE_JSON;
use crate::error::ClientError;
use crate::http::error::map_reqwest_error;

/// HTTP transport shared by all request builders of one client.
///
/// Every call races the cancellation token, so a caller holding
/// [`Transport::cancellation_token`] can abort in-flight requests.
#[derive(Debug)]
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    token: CancellationToken,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::invalid_config(&format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            token: CancellationToken::new(),
        })
    }

    /// Handle to the transport's cancellation token. Cancelling it aborts
    /// in-flight requests and stream decodes issued through this transport.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and decodes the body as one buffered JSON value.
    ///
    /// Non-2xx responses are decoded too: the server reports failures as JSON
    /// bodies with an `error` field, which is surfaced as the error message.
    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let response = self.send(method, path, body, Some(self.timeout)).await?;
        self.handle_json_response(response).await
    }

    /// Sends a request and returns the live response for incremental body
    /// reads. No timeout is applied beyond connection setup; the stream stays
    /// open as long as the server keeps producing.
    pub async fn send_streaming(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Value,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.send(method, path, Some(body), None).await?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies on the streaming path are plain JSON, not NDJSON.
            self.handle_json_response(response).await?;
            return Err(ClientError::request_failed(&format!(
                "streaming request rejected: {}",
                status
            )));
        }
        Ok(response)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, ClientError> {
        check_cancelled!(self.token);

        let url = self.endpoint_url(path);
        let mut request_builder = self.client.request(method, &url);

        if let Some(timeout) = timeout {
            request_builder = request_builder.timeout(timeout);
        }
        if let Some(body_content) = body {
            request_builder = request_builder
                .header("Content-Type", CONTENT_TYPE_JSON)
                .json(body_content);
        }

        tokio::select! {
            result = request_builder.send() => {
                result.map_err(map_reqwest_error)
            }
            _ = self.token.cancelled() => {
                Err(ClientError::request_cancelled())
            }
        }
    }

    async fn handle_json_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Value, ClientError> {
        check_cancelled!(self.token);

        let status = response.status();
        let is_error = !status.is_success();

        let text = tokio::select! {
            result = response.text() => {
                result.map_err(map_reqwest_error)?
            }
            _ = self.token.cancelled() => {
                return Err(ClientError::request_cancelled());
            }
        };

        // Some endpoints (copy, delete) acknowledge with an empty body.
        let json_value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                // Error statuses sometimes carry plain-text bodies.
                Err(_) if is_error => {
                    return Err(ClientError::request_failed(text.trim()));
                }
                Err(e) => {
                    return Err(ClientError::invalid_response(&format!(
                        "invalid JSON from Ollama: {}",
                        e
                    )));
                }
            }
        };

        if is_error {
            let error_message = match json_value.get("error") {
                Some(Value::Object(obj)) => obj
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string()),
                Some(Value::String(message)) => Some(message.clone()),
                _ => None,
            }
            .unwrap_or_else(|| format!("Ollama error: {}", status));
            return Err(ClientError::request_failed(&error_message));
        }
        Ok(json_value)
    }
}
