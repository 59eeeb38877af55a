pub mod chunks;
pub mod decode;

pub use chunks::ChunkBuffer;
pub use decode::{HandlerResult, StreamDecoder};
