//! Redis Streams publisher.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::StreamMaxlen;
use redis::{AsyncCommands, RedisError};
use todo_core::error::{BoxError, PublishError};
use todo_core::ports::{HealthProbe, StreamPublisher};
use todo_core::todo::TodoItem;

use crate::envelope::TodoEvent;

/// Connection settings for the event stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Redis connection URL, e.g. `redis://localhost:6379/0`.
    pub url: String,
    /// Stream key events are appended to.
    pub stream_name: String,
    /// Approximate upper bound on stream length (`XADD MAXLEN ~ n`).
    pub max_len: Option<usize>,
}

/// Appends todo events to a Redis stream with `XADD`.
///
/// Holds a [`ConnectionManager`], which multiplexes one connection and
/// reconnects on its own; clones are cheap and share that connection.
#[derive(Clone)]
pub struct RedisStreamPublisher {
    connection: ConnectionManager,
    stream_name: String,
    max_len: Option<usize>,
}

impl RedisStreamPublisher {
    /// Open a managed connection and verify it with `PING`.
    pub async fn connect(config: &StreamConfig) -> Result<Self, RedisError> {
        let client = redis::Client::open(config.url.as_str())?;
        let mut connection = ConnectionManager::new(client).await?;
        redis::cmd("PING").query_async::<String>(&mut connection).await?;

        Ok(Self {
            connection,
            stream_name: config.stream_name.clone(),
            max_len: config.max_len,
        })
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    async fn append(&self, fields: &[(&'static str, String)]) -> Result<String, RedisError> {
        let mut conn = self.connection.clone();
        match self.max_len {
            Some(n) => {
                conn.xadd_maxlen(&self.stream_name, StreamMaxlen::Approx(n), "*", fields)
                    .await
            }
            None => conn.xadd(&self.stream_name, "*", fields).await,
        }
    }
}

#[async_trait]
impl StreamPublisher for RedisStreamPublisher {
    async fn publish_todo_created(&self, todo: &TodoItem) -> Result<(), PublishError> {
        let event = TodoEvent::created(todo);
        let fields = event.stream_fields()?;

        let entry_id = self
            .append(&fields)
            .await
            .map_err(|e| PublishError::Append(e.into()))?;

        tracing::debug!(
            stream = %self.stream_name,
            entry_id = %entry_id,
            todo_id = %todo.id,
            "Published todo.created event",
        );
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for RedisStreamPublisher {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
