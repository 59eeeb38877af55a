use std::pin::pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::constants::RESPONSE_FIELD;
use crate::error::ClientError;
use crate::http::error::map_reqwest_error;
use crate::streaming::chunks::ChunkBuffer;

/// Result type for per-record handlers driven by [`StreamDecoder::process`].
///
/// Errors returned by a handler are logged and skipped; they never abort the
/// decode and the value still lands in the result list.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Decodes a newline-delimited JSON response body into an ordered sequence of
/// values, dispatching each one to a caller-supplied handler as it completes.
///
/// One decoder invocation owns one [`ChunkBuffer`]; nothing is shared across
/// invocations. The decode is sequential and synchronous apart from awaiting
/// the next chunk, so handler calls happen in strict arrival order with no
/// batching delay.
pub struct StreamDecoder {
    token: CancellationToken,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    /// Decoder without external cancellation; the decode runs until the
    /// stream ends.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Decoder whose chunk reads race `token`; a hung source stream can be
    /// abandoned by cancelling it.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Consumes `stream` to exhaustion, invoking `handler` once per decoded
    /// record and returning all decoded values in arrival order.
    ///
    /// Each record is parsed as JSON; when the parsed value is an object
    /// carrying a `response` key, only that field's value is surfaced. A
    /// record that fails to parse is treated as not yet complete: it is
    /// pushed back with its delimiter and retried once more bytes arrive.
    ///
    /// Fails only when the stream ends with unparsable bytes still buffered
    /// (the upstream producer died mid-object); the leftover bytes are
    /// retrievable via [`ClientError::stream_remainder`].
    pub async fn process<S, F>(
        &self,
        stream: S,
        mut handler: F,
    ) -> Result<Vec<Value>, ClientError>
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>>,
        F: FnMut(&Value) -> HandlerResult,
    {
        let mut stream = pin!(stream);
        let mut buffer = ChunkBuffer::new();
        let mut decoded = Vec::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    return Err(ClientError::request_cancelled());
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else { break };
            let chunk = chunk.map_err(map_reqwest_error)?;
            buffer.append(&chunk);

            while let Some(record) = buffer.next_record() {
                if is_blank(&record) {
                    continue;
                }
                match parse_record(&record) {
                    Some(value) => dispatch(value, &mut handler, &mut decoded),
                    None => {
                        // A delimiter landed inside an incomplete value; put
                        // the bytes back and wait for the rest.
                        buffer.push_back(record);
                        break;
                    }
                }
            }
        }

        let remainder = buffer.remainder();
        if !is_blank(&remainder) {
            match parse_record(&remainder) {
                Some(value) => dispatch(value, &mut handler, &mut decoded),
                None => return Err(ClientError::stream_decode(&remainder)),
            }
        }

        Ok(decoded)
    }
}

fn is_blank(record: &[u8]) -> bool {
    record.iter().all(|byte| byte.is_ascii_whitespace())
}

/// Parses one record, projecting out the `response` field when the value is
/// an object that carries one.
fn parse_record(record: &[u8]) -> Option<Value> {
    let value: Value = serde_json::from_slice(record).ok()?;
    match value {
        Value::Object(mut map) if map.contains_key(RESPONSE_FIELD) => map.remove(RESPONSE_FIELD),
        other => Some(other),
    }
}

fn dispatch<F: FnMut(&Value) -> HandlerResult>(
    value: Value,
    handler: &mut F,
    decoded: &mut Vec<Value>,
) {
    if let Err(e) = handler(&value) {
        log::warn!("stream handler failed, continuing: {}", e);
    }
    decoded.push(value);
}
