use std::time::Instant;

use serde_json::{Value, json};

use crate::api::builder::Taskallama;
use crate::constants::{
    API_COPY, API_DELETE, API_EMBEDDINGS, API_PULL, API_SHOW, API_TAGS, LOG_PREFIX_CONN,
    LOG_PREFIX_SUCCESS,
};
use crate::error::ClientError;
use crate::logging::{log_request, log_timed};
use crate::streaming::decode::{HandlerResult, StreamDecoder};

/// One-line REST wrappers for model management and embeddings.
impl Taskallama {
    /// Lists models available on the server (`GET /api/tags`).
    pub async fn list_models(&self) -> Result<Value, ClientError> {
        log_request("GET", API_TAGS, None);
        self.transport()
            .send_json(reqwest::Method::GET, API_TAGS, None)
            .await
    }

    /// Shows details for one model (`POST /api/show`).
    pub async fn show_model(&self, name: &str) -> Result<Value, ClientError> {
        log_request("POST", API_SHOW, Some(name));
        self.transport()
            .send_json(reqwest::Method::POST, API_SHOW, Some(&json!({"name": name})))
            .await
    }

    /// Copies a model under a new name (`POST /api/copy`).
    pub async fn copy_model(&self, source: &str, destination: &str) -> Result<(), ClientError> {
        log_request("POST", API_COPY, Some(source));
        self.transport()
            .send_json(
                reqwest::Method::POST,
                API_COPY,
                Some(&json!({"source": source, "destination": destination})),
            )
            .await?;
        Ok(())
    }

    /// Deletes a model (`DELETE /api/delete`).
    pub async fn delete_model(&self, name: &str) -> Result<(), ClientError> {
        log_request("DELETE", API_DELETE, Some(name));
        self.transport()
            .send_json(
                reqwest::Method::DELETE,
                API_DELETE,
                Some(&json!({"name": name})),
            )
            .await?;
        Ok(())
    }

    /// Pulls a model from the registry, waiting for completion
    /// (`POST /api/pull` with `stream: false`).
    pub async fn pull_model(&self, name: &str) -> Result<Value, ClientError> {
        let start = Instant::now();
        log_request("POST", API_PULL, Some(name));
        let response = self
            .transport()
            .send_json(
                reqwest::Method::POST,
                API_PULL,
                Some(&json!({"name": name, "stream": false})),
            )
            .await?;
        log_timed(LOG_PREFIX_SUCCESS, &format!("pull {}", name), start);
        Ok(response)
    }

    /// Pulls a model with incremental progress: `handler` receives each
    /// status record as the download advances.
    pub async fn pull_model_stream<F>(
        &self,
        name: &str,
        handler: F,
    ) -> Result<Vec<Value>, ClientError>
    where
        F: FnMut(&Value) -> HandlerResult,
    {
        let start = Instant::now();
        log_request("POST", API_PULL, Some(name));
        let response = self
            .transport()
            .send_streaming(
                reqwest::Method::POST,
                API_PULL,
                &json!({"name": name, "stream": true}),
            )
            .await?;
        let decoder = StreamDecoder::with_cancellation(self.cancellation_token());
        let decoded = decoder.process(response.bytes_stream(), handler).await?;
        log_timed(
            LOG_PREFIX_CONN,
            &format!("pull stream {} | {} records", name, decoded.len()),
            start,
        );
        Ok(decoded)
    }

    /// Generates embeddings for `prompt` (`POST /api/embeddings`).
    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Value, ClientError> {
        log_request("POST", API_EMBEDDINGS, Some(model));
        self.transport()
            .send_json(
                reqwest::Method::POST,
                API_EMBEDDINGS,
                Some(&json!({"model": model, "prompt": prompt})),
            )
            .await
    }
}
