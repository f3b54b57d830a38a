//! Admission gate tests
//!
//! The gate admits a task only while the pool is collecting and nothing is
//! still executing from the previous drain, or unconditionally while
//! paused.

use crate::helpers::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// During the initial collecting phase tasks are queued but never run.
#[test]
fn test_collecting_queues_without_executing() {
    let pool = pool(2);
    let count = counter();

    for _ in 0..5 {
        pool.submit(bump(&count));
    }
    assert_eq!(pool.pending_count(), 5);

    // Sample until the phase flips. Reading the counter before checking
    // the gate keeps the assertion race-free: if the gate was still open
    // after the read, nothing can have executed before it.
    loop {
        let seen = count.load(Ordering::SeqCst);
        if !pool.is_accepting() {
            break;
        }
        assert_eq!(seen, 0, "no task may run during the collecting phase");
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(wait_until(DEADLINE, || count.load(Ordering::SeqCst) == 5));
    pool.terminate(false);
}

/// Submissions are rejected while the pool is draining.
#[test]
fn test_draining_rejects_submissions() {
    let pool = pool(2);
    let count = counter();
    for _ in 0..5 {
        pool.submit(bump(&count));
    }

    // Wait for the drain to start.
    assert!(wait_until(DEADLINE, || !pool.is_accepting()));

    // The result path surfaces the rejection as an error.
    let rejected = pool.submit_with_result(|| ());
    assert!(matches!(rejected, Err(e) if e.is_rejected()));

    // The fire-and-forget path drops the task silently.
    let ghost = counter();
    pool.submit(bump(&ghost));

    assert!(wait_until(DEADLINE, || count.load(Ordering::SeqCst) == 5));
    pool.terminate(false);
    assert_eq!(ghost.load(Ordering::SeqCst), 0);
}

/// A straggler from the previous drain blocks admission even after the
/// gate nominally reopens.
#[test]
fn test_straggler_blocks_admission() {
    let pool = pool(2);
    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));

    {
        let started = Arc::clone(&started);
        let finished = Arc::clone(&finished);
        pool.submit(move || {
            started.store(true, Ordering::SeqCst);
            std::thread::sleep(INTERVAL * 2);
            finished.store(true, Ordering::SeqCst);
        });
    }

    // The task outlives its draining phase, so the gate reopens while it
    // is still executing.
    assert!(wait_until(DEADLINE, || {
        pool.is_accepting() && started.load(Ordering::SeqCst)
    }));

    let attempt = pool.submit_with_result(|| ());
    if !finished.load(Ordering::SeqCst) {
        // The task was provably still executing when the gate was
        // consulted, so the admission must have been blocked.
        assert!(matches!(attempt, Err(e) if e.is_rejected()));
    }

    // Once the straggler completes, the collecting phase truly opens.
    assert!(wait_until(DEADLINE, || pool.submit_with_result(|| ()).is_ok()));
    pool.terminate(false);
}
