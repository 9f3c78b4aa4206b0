use std::time::Duration;

use crate::file::FileValidationError;

/// Type-erased backend error carried inside [`StorageError`] and [`PublishError`].
///
/// Adapters box their driver errors (sqlx, redis, aws-sdk) so the core crate
/// stays free of infrastructure dependencies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a relational or object-storage adapter.
///
/// Every variant names the step that failed; the wrapped source is the
/// driver-level cause.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] BoxError),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] BoxError),

    #[error("failed to insert todo: {0}")]
    Insert(#[source] BoxError),

    #[error("failed to create todos table: {0}")]
    Schema(#[source] BoxError),

    #[error("failed to upload file to object storage: {0}")]
    Upload(#[source] BoxError),

    #[error("failed to ensure bucket exists: {0}")]
    Bucket(#[source] BoxError),
}

/// Failure reported by a stream publisher adapter.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to marshal todo event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to publish event to stream: {0}")]
    Append(#[source] BoxError),
}

/// Domain-level error returned by the use cases.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Caller input broke a business rule. Nothing was written or published.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The caller-supplied deadline expired while `operation` was running.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The caller-supplied cancellation token fired while `operation` was running.
    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    /// A failed workflow step, prefixed with a short static description.
    #[error("{context}: {source}")]
    Workflow {
        context: &'static str,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Wrap `source` with the description of the workflow step that failed.
    pub fn workflow(context: &'static str, source: CoreError) -> Self {
        Self::Workflow {
            context,
            source: Box::new(source),
        }
    }

    /// The innermost error beneath any [`CoreError::Workflow`] wrappers.
    pub fn root(&self) -> &CoreError {
        match self {
            Self::Workflow { source, .. } => source.root(),
            other => other,
        }
    }

    /// `true` when the failure is a rejected input rather than a backend failure.
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Self::Validation(_))
    }

    /// `true` when the failure came from an expired deadline or a cancellation.
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout { .. } | Self::Cancelled { .. })
    }
}

impl From<FileValidationError> for CoreError {
    fn from(err: FileValidationError) -> Self {
        Self::Validation(format!("file validation failed: {err}"))
    }
}
