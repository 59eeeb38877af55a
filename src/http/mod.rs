pub mod client;
pub mod error;

pub use client::Transport;
pub use error::map_reqwest_error;
