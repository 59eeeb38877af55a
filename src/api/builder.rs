use std::path::Path;
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

use crate::api::types::ChatMessage;
use crate::config::{Config, validate_config};
use crate::constants::{API_CHAT, API_GENERATE, LOG_PREFIX_CONN, LOG_PREFIX_SUCCESS};
use crate::error::ClientError;
use crate::http::Transport;
use crate::logging::{log_request, log_timed};
use crate::streaming::decode::{HandlerResult, StreamDecoder};

/// Client for an Ollama-compatible model server.
///
/// A `Taskallama` is an explicit, caller-owned value: construct one from a
/// [`Config`] and share it by reference. There is no process-wide instance.
#[derive(Debug)]
pub struct Taskallama {
    transport: Transport,
    config: Config,
}

impl Taskallama {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        validate_config(&config)?;
        let transport = Transport::new(&config)?;
        Ok(Self { transport, config })
    }

    /// Client against the default local server address.
    pub fn local() -> Result<Self, ClientError> {
        Self::new(Config::default())
    }

    /// Token that aborts this client's in-flight requests and stream decodes
    /// when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.transport.cancellation_token()
    }

    /// Starts a generation request. Options set on the returned builder
    /// override the config defaults.
    pub fn task(&self) -> TaskBuilder<'_> {
        TaskBuilder {
            client: self,
            model: self.config.default_model.clone(),
            system: None,
            prompt: None,
            format: self.config.default_format.clone().map(Value::String),
            options: None,
            raw: false,
            keep_alive: self.config.keep_alive.clone(),
            images: Vec::new(),
        }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }
}

/// Fluent request builder for `/api/generate` and `/api/chat`.
///
/// Each with-option method consumes and returns the builder; a finisher
/// (`ask`, `ask_stream`, `chat`, `chat_stream`) sends the request.
pub struct TaskBuilder<'a> {
    client: &'a Taskallama,
    model: Option<String>,
    system: Option<String>,
    prompt: Option<String>,
    format: Option<Value>,
    options: Option<Value>,
    raw: bool,
    keep_alive: String,
    images: Vec<String>,
}

impl<'a> TaskBuilder<'a> {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// System prompt steering the model (the service calls this the agent).
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Output format: `"json"` or a JSON schema object.
    pub fn format(mut self, format: impl Into<Value>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Model options forwarded verbatim (temperature, top_p, num_predict, ...).
    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Bypass prompt templating on the server.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// How long the server keeps the model loaded after this request.
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = keep_alive.into();
        self
    }

    /// Attaches an image file, base64-encoded into the request.
    pub fn image(mut self, path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ClientError::invalid_config(&format!(
                "image file {} not readable: {}",
                path.display(),
                e
            ))
        })?;
        self.images.push(BASE64.encode(bytes));
        Ok(self)
    }

    /// Sends the generation request and returns the buffered JSON response.
    pub async fn ask(self) -> Result<Value, ClientError> {
        let start = Instant::now();
        let body = self.generate_body(false)?;
        let model = body["model"].as_str().unwrap_or_default().to_string();

        log_request("POST", API_GENERATE, Some(&model));
        let response = self
            .client
            .transport()
            .send_json(reqwest::Method::POST, API_GENERATE, Some(&body))
            .await?;
        log_timed(LOG_PREFIX_SUCCESS, &format!("generate ({})", model), start);
        Ok(response)
    }

    /// Sends the generation request on the streaming path.
    ///
    /// The response body is decoded as newline-delimited JSON; `handler` is
    /// invoked once per record, in arrival order, with the record's
    /// `response` field (or the whole record when it has none). Returns every
    /// decoded value once the stream completes.
    pub async fn ask_stream<F>(self, handler: F) -> Result<Vec<Value>, ClientError>
    where
        F: FnMut(&Value) -> HandlerResult,
    {
        let start = Instant::now();
        let body = self.generate_body(true)?;
        let model = body["model"].as_str().unwrap_or_default().to_string();

        log_request("POST", API_GENERATE, Some(&model));
        let decoded = self.stream_request(API_GENERATE, &body, handler).await?;
        log_timed(
            LOG_PREFIX_CONN,
            &format!("generate stream ({}) | {} records", model, decoded.len()),
            start,
        );
        Ok(decoded)
    }

    /// Sends a chat completion for `messages` and returns the buffered JSON
    /// response.
    pub async fn chat(self, messages: &[ChatMessage]) -> Result<Value, ClientError> {
        let start = Instant::now();
        let body = self.chat_body(messages, false)?;
        let model = body["model"].as_str().unwrap_or_default().to_string();

        log_request("POST", API_CHAT, Some(&model));
        let response = self
            .client
            .transport()
            .send_json(reqwest::Method::POST, API_CHAT, Some(&body))
            .await?;
        log_timed(LOG_PREFIX_SUCCESS, &format!("chat ({})", model), start);
        Ok(response)
    }

    /// Streaming variant of [`chat`](Self::chat); same decode semantics as
    /// [`ask_stream`](Self::ask_stream).
    pub async fn chat_stream<F>(
        self,
        messages: &[ChatMessage],
        handler: F,
    ) -> Result<Vec<Value>, ClientError>
    where
        F: FnMut(&Value) -> HandlerResult,
    {
        let start = Instant::now();
        let body = self.chat_body(messages, true)?;
        let model = body["model"].as_str().unwrap_or_default().to_string();

        log_request("POST", API_CHAT, Some(&model));
        let decoded = self.stream_request(API_CHAT, &body, handler).await?;
        log_timed(
            LOG_PREFIX_CONN,
            &format!("chat stream ({}) | {} records", model, decoded.len()),
            start,
        );
        Ok(decoded)
    }

    async fn stream_request<F>(
        &self,
        path: &str,
        body: &Value,
        handler: F,
    ) -> Result<Vec<Value>, ClientError>
    where
        F: FnMut(&Value) -> HandlerResult,
    {
        let transport = self.client.transport();
        let response = transport
            .send_streaming(reqwest::Method::POST, path, body)
            .await?;
        let decoder = StreamDecoder::with_cancellation(transport.cancellation_token());
        decoder.process(response.bytes_stream(), handler).await
    }

    fn required_model(&self) -> Result<&str, ClientError> {
        self.model
            .as_deref()
            .ok_or_else(|| ClientError::invalid_config("no model selected"))
    }

    fn generate_body(&self, stream: bool) -> Result<Value, ClientError> {
        let mut body = self.common_body(stream)?;
        if let Some(prompt) = &self.prompt {
            body.insert("prompt".to_string(), json!(prompt));
        }
        if let Some(system) = &self.system {
            body.insert("system".to_string(), json!(system));
        }
        if self.raw {
            body.insert("raw".to_string(), json!(true));
        }
        if !self.images.is_empty() {
            body.insert("images".to_string(), json!(self.images));
        }
        Ok(Value::Object(body))
    }

    fn chat_body(&self, messages: &[ChatMessage], stream: bool) -> Result<Value, ClientError> {
        let mut body = self.common_body(stream)?;
        body.insert(
            "messages".to_string(),
            serde_json::to_value(messages)
                .map_err(|e| ClientError::invalid_config(&format!("bad messages: {}", e)))?,
        );
        Ok(Value::Object(body))
    }

    fn common_body(&self, stream: bool) -> Result<Map<String, Value>, ClientError> {
        let model = self.required_model()?;
        let mut body = Map::new();
        body.insert("model".to_string(), json!(model));
        body.insert("stream".to_string(), json!(stream));
        body.insert("keep_alive".to_string(), json!(self.keep_alive));
        if let Some(format) = &self.format {
            body.insert("format".to_string(), format.clone());
        }
        if let Some(options) = &self.options {
            body.insert("options".to_string(), options.clone());
        }
        Ok(body)
    }
}
