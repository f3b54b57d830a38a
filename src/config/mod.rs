//! Configuration module for tidepool.
//!
//! This module provides pool configuration loading from environment
//! variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidepool::config::PoolConfig;
//!
//! let config = PoolConfig::from_env()?;
//! println!("Workers: {}", config.worker_count());
//! println!("Interval: {:?}", config.interval);
//! ```

mod error;
mod parse;
mod pool;

pub use error::ConfigError;
pub use pool::PoolConfig;
