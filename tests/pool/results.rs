//! Result-channel submission tests.

use crate::helpers::*;
use std::time::Instant;

use tidepool::PoolError;

/// A result-channel submission delivers the task's return value.
#[test]
fn test_result_roundtrip() {
    let pool = pool(1);
    let handle = pool.submit_with_result(|| 21 * 2).expect("gate open");
    assert_eq!(handle.wait().unwrap(), 42);
    pool.terminate(false);
}

/// try_wait polls without blocking until the result arrives.
#[test]
fn test_try_wait() {
    let pool = pool(1);
    let handle = pool.submit_with_result(|| "done").expect("gate open");

    let start = Instant::now();
    let value = loop {
        if let Some(result) = handle.try_wait() {
            break result;
        }
        assert!(start.elapsed() < DEADLINE, "timed out waiting for result");
        std::thread::sleep(std::time::Duration::from_millis(5));
    };

    assert_eq!(value.unwrap(), "done");
    pool.terminate(false);
}

/// A panicking task reports through the channel and spares its worker.
#[test]
fn test_panic_reported() {
    let pool = pool(1);
    let boom = pool
        .submit_with_result(|| -> u32 { panic!("boom") })
        .expect("gate open");
    let fine = pool.submit_with_result(|| 7).expect("gate open");

    let err = boom.wait().unwrap_err();
    assert!(err.is_worker_panic());
    assert!(err.to_string().contains("boom"));

    // Same single worker, next task still runs.
    assert_eq!(fine.wait().unwrap(), 7);

    pool.terminate(false);
    let stats = pool.stats();
    assert_eq!(stats.panicked_tasks, 1);
    assert_eq!(stats.completed_tasks, 2);
}

/// Submitting to an uninitialized pool is surfaced on the result path.
#[test]
fn test_not_running() {
    let pool = tidepool::ThreadPool::named("test");
    let result = pool.submit_with_result(|| 1);
    assert!(matches!(result, Err(PoolError::NotRunning)));
}

/// A task discarded by an immediate terminate closes its channel.
#[test]
fn test_discarded_task_closes_channel() {
    let pool = pool(1);
    let handle = pool.submit_with_result(|| 1).expect("gate open");

    // Still queued in the collecting phase when the pool shuts down hard.
    pool.terminate(true);

    // Timing-sensitive: if the drain happened to start first the task may
    // have produced a value; otherwise the channel reports the discard.
    match handle.wait() {
        Err(err) => assert!(matches!(err, PoolError::ChannelClosed)),
        Ok(value) => assert_eq!(value, 1),
    }
}
