pub mod builder;
pub mod models;
pub mod types;

pub use builder::{TaskBuilder, Taskallama};
pub use types::ChatMessage;
