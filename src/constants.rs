/// Ollama API endpoints
pub const API_GENERATE: &str = "/api/generate";
pub const API_CHAT: &str = "/api/chat";
pub const API_TAGS: &str = "/api/tags";
pub const API_SHOW: &str = "/api/show";
pub const API_COPY: &str = "/api/copy";
pub const API_DELETE: &str = "/api/delete";
pub const API_PULL: &str = "/api/pull";
pub const API_EMBEDDINGS: &str = "/api/embeddings";

/// Default connection settings
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_KEEP_ALIVE: &str = "5m";
pub const DEFAULT_FORMAT: &str = "json";

/// Request headers
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Wire format: one JSON value per line, newline-delimited
pub const RECORD_DELIMITER: u8 = b'\n';
pub const RESPONSE_FIELD: &str = "response";

/// Error messages
pub const ERROR_SERVER_UNAVAILABLE: &str = "Ollama server not available";
pub const ERROR_TIMEOUT: &str = "Request timed out";
pub const ERROR_CANCELLED: &str = "Request cancelled by caller";
pub const ERROR_INCOMPLETE_STREAM: &str = "Incomplete JSON object remaining";

/// Logging prefixes
pub const LOG_PREFIX_SUCCESS: &str = "✅";
pub const LOG_PREFIX_ERROR: &str = "❌";
pub const LOG_PREFIX_WARNING: &str = "⚠️";
pub const LOG_PREFIX_CONN: &str = "↔️";
