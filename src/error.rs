use std::error::Error;
use std::fmt;

use crate::constants::{ERROR_CANCELLED, ERROR_INCOMPLETE_STREAM};

/// Error type for client operations
#[derive(Debug, Clone)]
pub struct ClientError {
    pub message: String,
    kind: ClientErrorKind,
}

#[derive(Debug, Clone)]
enum ClientErrorKind {
    RequestCancelled,
    RequestFailed,
    ServerUnavailable,
    InvalidResponse,
    InvalidConfig,
    /// Stream ended with unparsable bytes still in the buffer. Carries the
    /// raw leftover content for diagnostics.
    StreamDecode { remainder: String },
}

impl ClientError {
    pub fn request_failed(message: &str) -> Self {
        Self {
            message: message.to_string(),
            kind: ClientErrorKind::RequestFailed,
        }
    }

    pub fn server_unavailable(message: &str) -> Self {
        Self {
            message: message.to_string(),
            kind: ClientErrorKind::ServerUnavailable,
        }
    }

    pub fn invalid_response(message: &str) -> Self {
        Self {
            message: message.to_string(),
            kind: ClientErrorKind::InvalidResponse,
        }
    }

    pub fn invalid_config(message: &str) -> Self {
        Self {
            message: message.to_string(),
            kind: ClientErrorKind::InvalidConfig,
        }
    }

    pub fn request_cancelled() -> Self {
        Self {
            message: ERROR_CANCELLED.to_string(),
            kind: ClientErrorKind::RequestCancelled,
        }
    }

    pub fn stream_decode(remainder: &[u8]) -> Self {
        let remainder = String::from_utf8_lossy(remainder).into_owned();
        Self {
            message: format!("{}: {}", ERROR_INCOMPLETE_STREAM, remainder),
            kind: ClientErrorKind::StreamDecode { remainder },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ClientErrorKind::RequestCancelled)
    }

    pub fn is_server_unavailable(&self) -> bool {
        matches!(self.kind, ClientErrorKind::ServerUnavailable)
    }

    pub fn is_stream_decode(&self) -> bool {
        matches!(self.kind, ClientErrorKind::StreamDecode { .. })
    }

    /// The bytes left in the buffer when a stream ended mid-object, if this
    /// is a stream decode error.
    pub fn stream_remainder(&self) -> Option<&str> {
        match &self.kind {
            ClientErrorKind::StreamDecode { remainder } => Some(remainder),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientError: {}", self.message)
    }
}

impl Error for ClientError {}

#[macro_export]
macro_rules! check_cancelled {
    ($token:expr) => {
        if $token.is_cancelled() {
            return Err($crate::error::ClientError::request_cancelled());
        }
    };
}
