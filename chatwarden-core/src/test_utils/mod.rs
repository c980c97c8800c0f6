// File: src/test_utils/mod.rs

pub mod helpers;

pub use helpers::{init_test_tracing, setup_test_database};
