//! Concurrency and property tests for the duty-cycled pool.
//!
//! Run with: cargo test --test pool
//!
//! These tests are timing-sensitive: they use a short duty-cycle interval
//! and bounded-deadline polling instead of fixed sleeps wherever possible.
//! Set POOL_TEST_LOG=1 (together with RUST_LOG) to see pool logs.

mod helpers;

mod admission;
mod results;
