//! Pool contract tests: fixed bound, FIFO waiting, release on every exit.

use std::sync::Arc;
use std::time::Duration;

use salon_core::error::AppError;
use salon_core::port::CrudRepository;
use salon_infra_sqlite::{run_migrations, ConnectionPool, SqliteEmployeeRepository, StoreConfig};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salon=info")),
        )
        .with_test_writer()
        .try_init();
}

fn file_config(path: &str, max_connections: usize, acquire_timeout: Duration) -> StoreConfig {
    // Clear leftovers from a previous run (db plus WAL side files).
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
    StoreConfig {
        database_path: path.to_string(),
        max_connections,
        acquire_timeout,
    }
}

#[tokio::test]
async fn pool_never_exceeds_its_bound() {
    init_tracing();
    let config = file_config(
        "/tmp/salon_test_pool_bound.db",
        3,
        Duration::from_millis(150),
    );
    let pool = ConnectionPool::open(&config).await.unwrap();

    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.acquire().await.unwrap());
    }

    // A fourth request waits out the timeout and fails; no extra
    // connection is ever created.
    match pool.acquire().await {
        Err(AppError::PoolExhausted { waited_ms }) => assert_eq!(waited_ms, 150),
        other => panic!("expected PoolExhausted, got {other:?}"),
    }

    // Freeing one slot unblocks acquisition.
    held.pop();
    assert!(pool.acquire().await.is_ok());
}

#[tokio::test]
async fn every_operation_returns_its_connection() {
    init_tracing();
    let config = file_config("/tmp/salon_test_pool_release.db", 1, Duration::from_secs(1));
    let pool = Arc::new(ConnectionPool::open(&config).await.unwrap());
    run_migrations(&pool).await.unwrap();

    let repo = SqliteEmployeeRepository::new(pool.clone());

    // Successful, sentinel-returning and gated operations all run on the
    // single connection; any leak would deadlock this loop.
    for _ in 0..10 {
        let emp = salon_core::domain::Employee::new("Ana", "", "", "", 50, 50, 0).unwrap();
        let created = repo.create(emp).await.unwrap();
        assert!(!created.is_sentinel());

        assert!(repo.find_by_id(999_999).await.unwrap().is_sentinel());
        assert!(repo.delete(999_999).await.unwrap().is_sentinel());
        assert!(!repo.delete(created.id).await.unwrap().is_sentinel());
    }

    assert!(pool.acquire().await.is_ok());
}

#[tokio::test]
async fn concurrent_callers_share_a_small_pool() {
    init_tracing();
    let config = file_config("/tmp/salon_test_pool_shared.db", 3, Duration::from_secs(10));
    let pool = Arc::new(ConnectionPool::open(&config).await.unwrap());
    run_migrations(&pool).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let repo = SqliteEmployeeRepository::new(pool.clone());
        handles.push(tokio::spawn(async move {
            let emp = salon_core::domain::Employee::new(
                format!("employee-{i}"),
                "",
                "",
                "",
                60,
                40,
                0,
            )
            .unwrap();
            let created = repo.create(emp).await.unwrap();
            assert!(!created.is_sentinel());
            let found = repo.find_by_id(created.id).await.unwrap();
            assert_eq!(found.id, created.id);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let repo = SqliteEmployeeRepository::new(pool.clone());
    assert_eq!(repo.list_all().await.unwrap().len(), 16);
}

#[tokio::test]
async fn startup_fails_when_database_cannot_be_opened() {
    init_tracing();
    let config = StoreConfig {
        database_path: "/nonexistent-dir/nowhere/salon.db".to_string(),
        max_connections: 4,
        acquire_timeout: Duration::from_secs(1),
    };

    match ConnectionPool::open(&config).await {
        Err(AppError::PoolInit(_)) => {}
        other => panic!("expected PoolInit failure, got {other:?}"),
    }
}
