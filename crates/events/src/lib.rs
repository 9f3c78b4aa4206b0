//! Todo lifecycle events and their Redis Streams publisher.
//!
//! - [`envelope`]: the JSON envelope appended to the stream.
//! - [`redis_stream`]: [`RedisStreamPublisher`], the `XADD`-based
//!   implementation of `todo_core::ports::StreamPublisher`.

pub mod envelope;
pub mod redis_stream;

pub use envelope::{TodoEvent, TODO_CREATED};
pub use redis_stream::{RedisStreamPublisher, StreamConfig};
