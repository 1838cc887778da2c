//! spread-scout: ranked vertical credit-spread recommendations as a live feed
//!
//! This library provides the core components for:
//! - Underlying price lookup across prioritized providers
//! - Option-chain ingestion for a single equity
//! - Pairing contracts into vertical credit-spread candidates
//! - Probability-of-profit scoring and risk-policy ranking
//! - TTL caching of computed payloads
//! - A polling-based publish/subscribe hub that simulates a push feed
//! - Full observability stack

pub mod cache;
pub mod calendar;
pub mod chain;
pub mod cli;
pub mod config;
pub mod engine;
pub mod hub;
pub mod news;
pub mod quote;
pub mod service;
pub mod telemetry;
