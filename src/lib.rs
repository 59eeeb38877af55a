//! Client for local Ollama-compatible model servers.
//!
//! The crate wraps the server's REST surface (generate, chat, embeddings,
//! model management) behind a caller-owned fluent builder, and decodes the
//! streaming responses the server produces: a continuous byte body carrying
//! one JSON object per line, chunked without regard for line boundaries.
//!
//! ```no_run
//! # async fn demo() -> Result<(), taskallama::ClientError> {
//! use taskallama::{Config, Taskallama};
//!
//! let client = Taskallama::new(Config::default())?;
//! let answers = client
//!     .task()
//!     .model("llama3.2")
//!     .prompt("Why is the sky blue?")
//!     .ask_stream(|value| {
//!         if let Some(text) = value.as_str() {
//!             print!("{text}");
//!         }
//!         Ok(())
//!     })
//!     .await?;
//! # let _ = answers;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod logging;
pub mod streaming;

pub use api::{ChatMessage, TaskBuilder, Taskallama};
pub use config::Config;
pub use error::ClientError;
pub use streaming::{ChunkBuffer, HandlerResult, StreamDecoder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
