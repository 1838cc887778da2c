//! Integration test harness

mod cache_test;
mod e2e_test;
mod engine_test;
mod hub_test;
