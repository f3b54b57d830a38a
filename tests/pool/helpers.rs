//! Test helpers and utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tidepool::ThreadPool;

/// Duty-cycle interval for tests: short enough to keep tests fast, long
/// enough that a phase is observable.
pub const INTERVAL: Duration = Duration::from_millis(200);

/// Generous deadline for bounded polling.
pub const DEADLINE: Duration = Duration::from_secs(5);

/// Install a test subscriber when POOL_TEST_LOG is set.
pub fn init_logging() {
    if std::env::var("POOL_TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Create an initialized pool with the given worker count.
pub fn pool(workers: usize) -> ThreadPool {
    init_logging();
    let pool = ThreadPool::named("test");
    assert!(pool.initialize(workers, INTERVAL));
    pool
}

/// Poll `cond` until it holds or `deadline` elapses.
pub fn wait_until(deadline: Duration, cond: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Shared counter for tasks to bump.
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// Task that bumps `counter` when executed.
pub fn bump(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}
