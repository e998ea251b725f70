//! # Battle Test Utilities
//!
//! Shared testing utilities for the battle engine:
//! - Determinism test harness
//! - Config, path and scenario fixtures
//! - Property-based testing strategies
//! - Test log setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a log subscriber for tests.
///
/// Honors `RUST_LOG`; output goes through the test harness's capture.
/// Safe to call from every test: only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
