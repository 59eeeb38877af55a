use crate::constants::{ERROR_SERVER_UNAVAILABLE, ERROR_TIMEOUT};
use crate::error::ClientError;

pub fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_connect() {
        ClientError::server_unavailable(ERROR_SERVER_UNAVAILABLE)
    } else if err.is_timeout() {
        ClientError::server_unavailable(ERROR_TIMEOUT)
    } else {
        log::error!("HTTP request failed: {}", err);
        ClientError::request_failed(&format!("Ollama request failed: {}", err))
    }
}
