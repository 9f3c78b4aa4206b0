//! In-memory implementations of every port.
//!
//! Used by the unit tests in this crate and by the HTTP integration tests in
//! `todo-api`. Each type is cheaply cloneable; clones share state, so a test
//! can keep one handle for assertions and pass another into a use case.
//!
//! Failures are injected with the `fail_*` switches. Injected errors carry the
//! message `injected failure` wrapped in the same error variant a real backend
//! would produce.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{BoxError, CoreError, PublishError, StorageError};
use crate::ports::{
    FileStorage, HealthProbe, StreamPublisher, TodoRepository, TodoSchema, TransactionManager,
    UnitOfWork,
};
use crate::todo::TodoItem;
use crate::types::EntityId;

const INJECTED: &str = "injected failure";

fn injected() -> BoxError {
    INJECTED.into()
}

// ---------------------------------------------------------------------------
// Relational store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    rows: RwLock<HashMap<EntityId, TodoItem>>,
    fail_begin: AtomicBool,
    fail_insert: AtomicBool,
    fail_commit: AtomicBool,
    healthy: AtomicBool,
    insert_attempts: AtomicUsize,
    transactions: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// A `todos` table held in a `HashMap`, with transactional staging.
///
/// Rows written through a transaction-bound handle become visible only when
/// the transaction commits.
#[derive(Clone)]
pub struct InMemoryTodoStore {
    state: Arc<StoreState>,
    commit_latency: Option<Duration>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        let state = StoreState::default();
        state.healthy.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
            commit_latency: None,
        }
    }

    /// Sleep for `latency` before applying every commit.
    pub fn with_commit_latency(mut self, latency: Duration) -> Self {
        self.commit_latency = Some(latency);
        self
    }

    pub fn fail_begins(&self, fail: bool) {
        self.state.fail_begin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.state.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commits(&self, fail: bool) {
        self.state.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Committed row for `id`, if any.
    pub async fn get(&self, id: EntityId) -> Option<TodoItem> {
        self.state.rows.read().await.get(&id).cloned()
    }

    /// Number of committed rows.
    pub async fn len(&self) -> usize {
        self.state.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn insert_attempts(&self) -> usize {
        self.state.insert_attempts.load(Ordering::SeqCst)
    }

    pub fn transactions_started(&self) -> usize {
        self.state.transactions.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.state.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.state.rollbacks.load(Ordering::SeqCst)
    }

    fn check_insert(&self, todo: &TodoItem, pending: &[TodoItem]) -> Result<(), StorageError> {
        self.state.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_insert.load(Ordering::SeqCst) {
            return Err(StorageError::Insert(injected()));
        }
        if pending.iter().any(|row| row.id == todo.id) {
            return Err(StorageError::Insert(
                format!("duplicate key value for id {}", todo.id).into(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool-bound writes commit immediately.
#[async_trait]
impl TodoRepository for InMemoryTodoStore {
    async fn create(&mut self, todo: &TodoItem) -> Result<(), StorageError> {
        let mut rows = self.state.rows.write().await;
        self.check_insert(todo, &[])?;
        if rows.contains_key(&todo.id) {
            return Err(StorageError::Insert(
                format!("duplicate key value for id {}", todo.id).into(),
            ));
        }
        rows.insert(todo.id, todo.clone());
        Ok(())
    }
}

#[async_trait]
impl TodoSchema for InMemoryTodoStore {
    async fn init_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Transaction-bound handle: inserts are staged until commit.
struct InMemoryTx {
    store: InMemoryTodoStore,
    staged: Vec<TodoItem>,
}

#[async_trait]
impl TodoRepository for InMemoryTx {
    async fn create(&mut self, todo: &TodoItem) -> Result<(), StorageError> {
        self.store.check_insert(todo, &self.staged)?;
        if self.store.state.rows.read().await.contains_key(&todo.id) {
            return Err(StorageError::Insert(
                format!("duplicate key value for id {}", todo.id).into(),
            ));
        }
        self.staged.push(todo.clone());
        Ok(())
    }
}

#[async_trait]
impl TransactionManager for InMemoryTodoStore {
    async fn do_in_tx(&self, work: UnitOfWork) -> Result<(), CoreError> {
        if self.state.fail_begin.load(Ordering::SeqCst) {
            return Err(StorageError::Begin(injected()).into());
        }
        self.state.transactions.fetch_add(1, Ordering::SeqCst);

        let mut tx = InMemoryTx {
            store: self.clone(),
            staged: Vec::new(),
        };

        let outcome = {
            let repo: &mut dyn TodoRepository = &mut tx;
            work(repo).await
        };

        if let Err(err) = outcome {
            self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(err);
        }

        if let Some(latency) = self.commit_latency {
            tokio::time::sleep(latency).await;
        }

        if self.state.fail_commit.load(Ordering::SeqCst) {
            self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Commit(injected()).into());
        }

        let mut rows = self.state.rows.write().await;
        for todo in tx.staged {
            rows.insert(todo.id, todo);
        }
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reports under the name of the backend it stands in for.
#[async_trait]
impl HealthProbe for InMemoryTodoStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        if self.state.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err("connection refused".into())
        }
    }
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PublisherState {
    attempted: RwLock<Vec<TodoItem>>,
    published: RwLock<Vec<TodoItem>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
    healthy: AtomicBool,
}

/// Records every `todo.created` publish instead of writing to a stream.
#[derive(Clone)]
pub struct RecordingPublisher {
    state: Arc<PublisherState>,
    latency: Option<Duration>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        let state = PublisherState::default();
        state.healthy.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
            latency: None,
        }
    }

    /// Sleep for `latency` before every publish.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Every todo passed to a publish call, successful or not.
    pub async fn attempted(&self) -> Vec<TodoItem> {
        self.state.attempted.read().await.clone()
    }

    /// Todos whose publish succeeded.
    pub async fn published(&self) -> Vec<TodoItem> {
        self.state.published.read().await.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamPublisher for RecordingPublisher {
    async fn publish_todo_created(&self, todo: &TodoItem) -> Result<(), PublishError> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        self.state.attempted.write().await.push(todo.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.state.fail.load(Ordering::SeqCst) {
            return Err(PublishError::Append(injected()));
        }

        self.state.published.write().await.push(todo.clone());
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for RecordingPublisher {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        if self.state.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err("connection refused".into())
        }
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// An object written to [`InMemoryFileStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct StorageState {
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_upload: AtomicBool,
    bucket_ready: AtomicBool,
}

/// Object storage keyed by storage path.
#[derive(Clone, Default)]
pub struct InMemoryFileStorage {
    state: Arc<StorageState>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.state.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub async fn object(&self, storage_path: &str) -> Option<StoredObject> {
        self.state.objects.read().await.get(storage_path).cloned()
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn bucket_ready(&self) -> bool {
        self.state.bucket_ready.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload_file(
        &self,
        storage_path: &str,
        content_type: &str,
        data: Vec<u8>,
        _size: i64,
    ) -> Result<(), StorageError> {
        if self.state.fail_upload.load(Ordering::SeqCst) {
            return Err(StorageError::Upload(injected()));
        }
        self.state.objects.write().await.insert(
            storage_path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(())
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        self.state.bucket_ready.store(true, Ordering::SeqCst);
        Ok(())
    }
}
