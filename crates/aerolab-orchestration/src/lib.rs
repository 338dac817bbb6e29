//! # aerolab-orchestration
//!
//! Execution strategy, concurrency gate, rate limiting, and the analysis
//! pipeline that ties them to the normalizer, cache and solver backend.

pub mod config;
pub mod engine;
pub mod gate;
pub mod interfaces;
pub mod observers;
pub mod rate_limit;
pub mod strategy;

pub use config::EngineConfig;
pub use engine::{AnalysisEngine, AnalysisOutcome, EngineError, EngineHealth};
pub use gate::{ConcurrencyGate, GatePermit, GateStats};
pub use interfaces::{AttemptObserver, AttemptReport};
pub use observers::{LoggingObserver, NoOpObserver};
pub use rate_limit::{RateLimitConfig, RateLimited, RateLimiter};
pub use strategy::{SolverExecutionStrategy, StrategyFailure, StrategySuccess};
