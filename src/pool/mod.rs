//! Duty-cycled worker pool.
//!
//! This module provides a worker-thread pool whose admission gate
//! alternates on a fixed interval between collecting and draining.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       ThreadPool                           │
//! ├────────────────────────────────────────────────────────────┤
//! │   submit() ──► admission gate ──► ConcurrentQueue          │
//! │                     ▲                    │                 │
//! │               ┌─────┴─────┐      ┌───────▼───────┐         │
//! │               │   timer   │      │ Worker1..N    │         │
//! │               │ (toggles  │◄─────┤ (drain while  │         │
//! │               │  phases)  │ idle │  gate closed) │         │
//! │               └───────────┘      └───────────────┘         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! While the gate is open (collecting phase) tasks are queued but never
//! executed; while it is closed (draining phase) the workers execute the
//! backlog and new submissions are rejected. Before reopening the gate the
//! timer waits for every in-flight task to finish, so a collecting phase
//! never overlaps execution from the previous drain.

mod error;
mod thread;

pub use error::{PoolError, PoolResult};
pub use thread::{JobHandle, ThreadPool};

use std::time::Duration;

/// Running statistics about pool activity.
///
/// Counters accumulate for the lifetime of the pool instance and survive
/// terminate/initialize cycles. `completed_tasks` counts every task that
/// finished executing, panicked ones included.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Tasks that finished executing.
    pub completed_tasks: u64,
    /// Tasks that panicked while executing.
    pub panicked_tasks: u64,
    /// Total time workers spent blocked waiting for work.
    pub total_wait: Duration,
    /// Total time workers spent executing tasks.
    pub total_exec: Duration,
    /// Running sum of observed queue lengths.
    pub queue_len_sum: u64,
    /// Number of queue-length observations.
    pub queue_len_samples: u64,
}

impl PoolStats {
    /// Average worker wait per completed task.
    pub fn avg_wait(&self) -> Option<Duration> {
        (self.completed_tasks > 0).then(|| self.total_wait / self.completed_tasks as u32)
    }

    /// Average execution time per completed task.
    pub fn avg_exec(&self) -> Option<Duration> {
        (self.completed_tasks > 0).then(|| self.total_exec / self.completed_tasks as u32)
    }

    /// Average observed queue length.
    pub fn avg_queue_len(&self) -> Option<f64> {
        (self.queue_len_samples > 0)
            .then(|| self.queue_len_sum as f64 / self.queue_len_samples as f64)
    }
}
