//! Workflow benchmarks over the in-memory adapters.
//!
//! Measures the cost the workflows add on top of their backends: validation,
//! transaction bookkeeping, deadline wrapping and error propagation.
//!
//! Run with `cargo bench -p todo-core --features test-util`.

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::future::join_all;
use tokio::runtime::Runtime;

use todo_core::deadline::Deadline;
use todo_core::error::CoreError;
use todo_core::memory::{InMemoryFileStorage, InMemoryTodoStore, RecordingPublisher};
use todo_core::ports::{
    unit_of_work, FileStorage, StreamPublisher, TodoRepository, TransactionManager,
};
use todo_core::todo::{CreateTodoRequest, TodoItem};
use todo_core::usecases::{FileUseCase, TodoUseCase, UploadFileRequest};

const MAX_RETRIES: usize = 3;

fn create_request(i: usize) -> CreateTodoRequest {
    CreateTodoRequest {
        description: format!("Benchmark todo {i}"),
        due_date: Utc::now() + chrono::Duration::hours(24),
        file_id: None,
    }
}

fn upload_request(i: usize, data: &[u8]) -> UploadFileRequest {
    UploadFileRequest {
        file_name: format!("benchmark-{i}.txt"),
        content_type: "text/plain".to_string(),
        size: data.len() as i64,
        data: data.to_vec(),
    }
}

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(5))
}

fn todo_use_case(store: &InMemoryTodoStore, publisher: &RecordingPublisher) -> TodoUseCase {
    TodoUseCase::new(Arc::new(store.clone()), Arc::new(publisher.clone()))
}

/// Upload a file, then create a todo that references it.
fn benchmark_full_workflow(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let todos = todo_use_case(&InMemoryTodoStore::new(), &RecordingPublisher::new());
    let files = FileUseCase::new(Arc::new(InMemoryFileStorage::new()));
    let data = vec![b'x'; 1024];

    c.bench_function("full_workflow_upload_then_create", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            rt.block_on(async {
                let uploaded = files
                    .upload_file(upload_request(i, &data), &deadline())
                    .await
                    .unwrap();
                let mut req = create_request(i);
                req.file_id = Some(uploaded.file_id);
                black_box(todos.create_todo(req, &deadline()).await.unwrap())
            })
        });
    });
}

/// Each adapter call on its own, for comparison with the full workflow.
fn benchmark_operation_comparison(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("operation_comparison");

    group.bench_function("insert", |b| {
        let mut store = InMemoryTodoStore::new();
        b.iter(|| {
            let todo = TodoItem::new("insert", Utc::now(), None);
            rt.block_on(async { black_box(store.create(&todo).await.unwrap()) })
        });
    });

    group.bench_function("publish", |b| {
        let publisher = RecordingPublisher::new();
        let todo = TodoItem::new("publish", Utc::now(), None);
        b.iter(|| {
            rt.block_on(async { black_box(publisher.publish_todo_created(&todo).await.unwrap()) })
        });
    });

    group.bench_function("upload", |b| {
        let storage = InMemoryFileStorage::new();
        let data = vec![b'x'; 1024];
        let mut i = 0;
        b.iter(|| {
            i += 1;
            let path = format!("files/benchmark/{i}.txt");
            rt.block_on(async {
                black_box(
                    storage
                        .upload_file(&path, "text/plain", data.clone(), 1024)
                        .await
                        .unwrap(),
                )
            })
        });
    });

    group.bench_function("create_todo", |b| {
        let todos = todo_use_case(&InMemoryTodoStore::new(), &RecordingPublisher::new());
        let mut i = 0;
        b.iter(|| {
            i += 1;
            rt.block_on(async {
                black_box(todos.create_todo(create_request(i), &deadline()).await.unwrap())
            })
        });
    });

    group.finish();
}

fn benchmark_upload_sizes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let files = FileUseCase::new(Arc::new(InMemoryFileStorage::new()));
    let mut group = c.benchmark_group("upload_file");

    for (name, size) in [
        ("1KB", 1024),
        ("10KB", 10 * 1024),
        ("100KB", 100 * 1024),
        ("1MB", 1024 * 1024),
    ] {
        let data = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                rt.block_on(async {
                    let uploaded = files.upload_file(upload_request(i, data), &deadline()).await;
                    black_box(uploaded.unwrap())
                })
            });
        });
    }

    group.finish();
}

fn benchmark_concurrent_creates(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let todos = Arc::new(todo_use_case(&InMemoryTodoStore::new(), &RecordingPublisher::new()));
    let mut group = c.benchmark_group("create_todo_concurrent");

    for concurrency in [1usize, 5, 10, 25] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &concurrency| {
                b.iter(|| {
                    rt.block_on(async {
                        let handles: Vec<_> = (0..concurrency)
                            .map(|i| {
                                let todos = Arc::clone(&todos);
                                tokio::spawn(async move {
                                    todos.create_todo(create_request(i), &deadline()).await
                                })
                            })
                            .collect();
                        black_box(join_all(handles).await)
                    })
                });
            },
        );
    }

    group.finish();
}

/// Per-call budgets do not change the happy path; this shows the wrapping cost.
fn benchmark_create_with_timeout(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let todos = todo_use_case(&InMemoryTodoStore::new(), &RecordingPublisher::new());
    let mut group = c.benchmark_group("create_todo_with_timeout");

    for (name, budget) in [
        ("100ms", Duration::from_millis(100)),
        ("500ms", Duration::from_millis(500)),
        ("1s", Duration::from_secs(1)),
        ("5s", Duration::from_secs(5)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &budget, |b, &budget| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                rt.block_on(async {
                    let deadline = Deadline::after(budget);
                    black_box(todos.create_todo(create_request(i), &deadline).await.unwrap())
                })
            });
        });
    }

    group.finish();
}

/// Caller-side retry: the first attempt fails at publish and rolls back, the
/// next one succeeds. The workflow itself never retries.
async fn create_with_retries(
    todos: &TodoUseCase,
    publisher: &RecordingPublisher,
    i: usize,
) -> Result<TodoItem, CoreError> {
    publisher.fail_publishes(true);
    let mut attempt = 0;
    loop {
        match todos.create_todo(create_request(i), &deadline()).await {
            Ok(todo) => return Ok(todo),
            Err(err) if attempt + 1 >= MAX_RETRIES => return Err(err),
            Err(_) => {
                attempt += 1;
                publisher.fail_publishes(false);
            }
        }
    }
}

fn benchmark_error_recovery(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("error_recovery");

    group.bench_function("create_todo_retry_after_publish_failure", |b| {
        let store = InMemoryTodoStore::new();
        let publisher = RecordingPublisher::new();
        let todos = todo_use_case(&store, &publisher);
        let mut i = 0;
        b.iter(|| {
            i += 1;
            rt.block_on(async {
                black_box(create_with_retries(&todos, &publisher, i).await.unwrap())
            })
        });
    });

    // Re-inserting one id: every iteration after the first hits the
    // duplicate-key path and rolls back.
    group.bench_function("insert_retry_on_conflict", |b| {
        let store = InMemoryTodoStore::new();
        let todo = TodoItem::new("conflict", Utc::now(), None);
        b.iter(|| {
            let todo = todo.clone();
            rt.block_on(async {
                let result = store
                    .do_in_tx(unit_of_work(move |repo| {
                        Box::pin(async move {
                            repo.create(&todo).await?;
                            Ok::<(), CoreError>(())
                        })
                    }))
                    .await;
                black_box(result)
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_full_workflow,
    benchmark_operation_comparison,
    benchmark_upload_sizes,
    benchmark_concurrent_creates,
    benchmark_create_with_timeout,
    benchmark_error_recovery
);
criterion_main!(benches);
