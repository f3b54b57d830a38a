//! tidepool - Duty-cycled worker thread pool.
//!
//! This crate provides a bounded worker-thread pool whose admission gate is
//! duty-cycled: a background timer periodically flips the pool between a
//! *collecting* phase (new tasks may be submitted, nothing executes) and a
//! *draining* phase (submissions are rejected, workers execute everything
//! queued).
//!
//! # Features
//!
//! - **Duty-cycled admission**: collect and drain alternate on a fixed
//!   interval; the pool never accepts and executes in the same phase
//! - **Pausable**: pausing pins the gate open and suspends execution
//! - **Graceful or immediate shutdown**: drain the backlog or discard it
//! - **Re-initializable**: a terminated pool can be started again
//! - **Panic containment**: a panicking task never kills its worker
//! - **Result channels**: optionally receive a task's return value or
//!   its panic as a typed error
//! - **Structured logging**: lifecycle and phase transitions via tracing
//!
//! # Architecture
//!
//! Callers submit tasks through the admission gate into a FIFO queue.
//! Worker threads block on a condition variable and only drain the queue
//! while the gate is closed to new submissions; a timer thread toggles the
//! gate every `interval` and waits out stragglers before reopening it.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tidepool::ThreadPool;
//!
//! let pool = ThreadPool::named("demo");
//! assert!(pool.initialize(4, Duration::from_millis(500)));
//!
//! // Collecting phase: the task is queued, nothing runs yet.
//! pool.submit(|| println!("hello from a worker"));
//!
//! // Half a second later the timer flips the pool into its draining
//! // phase and the workers execute the backlog.
//!
//! pool.terminate(false); // drain, then join every thread
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod pool;
pub mod queue;

// Re-exports for convenience
pub use config::PoolConfig;
pub use pool::{JobHandle, PoolError, PoolResult, PoolStats, ThreadPool};
pub use queue::ConcurrentQueue;
