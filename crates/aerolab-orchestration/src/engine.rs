//! The request pipeline: validate, normalize, cache, limit, gate, solve.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aerolab_cache::{CacheKey, CacheStats, ResultCache};
use aerolab_core::{
    AerodynamicSummary, CanonicalAirfoil, FlowCondition, GeometryNormalizer, InputValidationError,
    Point, SolverResult,
};
use aerolab_solver::{AttemptError, SolverBackend, SolverProbe};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::gate::{ConcurrencyGate, GateStats};
use crate::interfaces::{AttemptObserver, AttemptReport};
use crate::observers::LoggingObserver;
use crate::rate_limit::RateLimiter;
use crate::strategy::{SolverExecutionStrategy, StrategyFailure};

/// Why an analysis request produced no result.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The submission itself is unusable.
    #[error(transparent)]
    Validation(#[from] InputValidationError),

    /// The client must wait before submitting again.
    #[error("rate limit exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Every execution mode was tried, or one failed unrecoverably.
    #[error(transparent)]
    Exhausted(StrategyFailure),

    /// The solver could not be started at all.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(#[source] AttemptError),

    /// The blocking worker running the solver panicked or was cancelled.
    #[error("analysis worker failed: {0}")]
    Worker(String),
}

/// Everything produced for one successful request.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// In-domain points in submission order.
    pub raw_points: Vec<Point>,
    pub airfoil: CanonicalAirfoil,
    pub flow: FlowCondition,
    pub result: Arc<SolverResult>,
    /// Whether the result was served from the cache.
    pub cached: bool,
    /// Attempts made for this request; empty on a cache hit.
    pub attempts: Vec<AttemptReport>,
    pub summary: AerodynamicSummary,
}

/// Engine state for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EngineHealth {
    pub backend: String,
    pub solver: SolverProbe,
    pub gate: GateStats,
    pub cache: CacheStats,
    pub cache_entries: usize,
    pub completed_analyses: u64,
    pub uptime_secs: u64,
}

/// Orchestrates analysis requests against a solver backend.
pub struct AnalysisEngine {
    normalizer: GeometryNormalizer,
    strategy: SolverExecutionStrategy,
    gate: ConcurrencyGate,
    limiter: Option<RateLimiter>,
    cache: ResultCache,
    backend: Arc<dyn SolverBackend>,
    observer: Arc<dyn AttemptObserver>,
    completed: AtomicU64,
    started: Instant,
}

impl AnalysisEngine {
    /// Build an engine that logs every attempt.
    #[must_use]
    pub fn new(config: EngineConfig, backend: Arc<dyn SolverBackend>) -> Self {
        Self::with_observer(config, backend, Arc::new(LoggingObserver::new()))
    }

    /// Build an engine with a custom attempt observer.
    #[must_use]
    pub fn with_observer(
        config: EngineConfig,
        backend: Arc<dyn SolverBackend>,
        observer: Arc<dyn AttemptObserver>,
    ) -> Self {
        let config = config.normalize();
        info!(
            backend = backend.name(),
            max_concurrent = config.max_concurrent,
            rate_limited = config.rate_limit.is_some(),
            cache_capacity = config.cache.capacity,
            "Analysis engine ready"
        );
        Self {
            normalizer: GeometryNormalizer::new(config.normalizer),
            strategy: SolverExecutionStrategy::new(config.descriptors),
            gate: ConcurrencyGate::new(config.max_concurrent),
            limiter: config.rate_limit.map(RateLimiter::new),
            cache: ResultCache::new(config.cache),
            backend,
            observer,
            completed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Analyze one submission.
    ///
    /// Cache hits skip the rate limiter and the gate. On a miss the solver
    /// runs on the blocking pool while this task waits.
    pub async fn analyze(
        &self,
        client_id: &str,
        raw: &[u8],
        reynolds: f64,
        alpha: f64,
    ) -> Result<AnalysisOutcome, EngineError> {
        let flow = FlowCondition::new(reynolds, alpha)?;
        let raw_points = self.normalizer.parse_bytes(raw)?;
        let airfoil = self.normalizer.normalize_points(raw_points.clone())?;

        let key = CacheKey::new(&airfoil, &flow);
        if let Some(result) = self.cache.get(&key) {
            debug!(client_id, %key, "Serving cached result");
            return Ok(Self::outcome(raw_points, airfoil, flow, result, true, Vec::new()));
        }

        if let Some(limiter) = &self.limiter {
            limiter
                .check(client_id)
                .map_err(|limited| EngineError::RateLimited {
                    retry_after: limited.retry_after,
                })?;
        }

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| EngineError::Worker(err.to_string()))?;

        let backend = Arc::clone(&self.backend);
        let observer = Arc::clone(&self.observer);
        let strategy = self.strategy.clone();
        let job_airfoil = airfoil.clone();
        let joined = tokio::task::spawn_blocking(move || {
            // Slot is held until the process is gone, even if the request is dropped.
            let _permit = permit;
            strategy.execute(backend.as_ref(), &job_airfoil, &flow, observer.as_ref())
        })
        .await;

        let success = match joined {
            Ok(Ok(success)) => success,
            Ok(Err(failure)) if failure.terminal().is_launch_failure() => {
                let (_, terminal) = failure.into_parts();
                return Err(EngineError::SolverUnavailable(terminal));
            }
            Ok(Err(failure)) => return Err(EngineError::Exhausted(failure)),
            Err(join_err) => return Err(EngineError::Worker(join_err.to_string())),
        };

        let result = Arc::new(success.result);
        self.cache.insert(key, Arc::clone(&result));
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            client_id,
            %key,
            fidelity = %result.fidelity,
            attempts = success.attempts.len(),
            completed,
            "Analysis complete"
        );

        Ok(Self::outcome(
            raw_points,
            airfoil,
            flow,
            result,
            false,
            success.attempts,
        ))
    }

    fn outcome(
        raw_points: Vec<Point>,
        airfoil: CanonicalAirfoil,
        flow: FlowCondition,
        result: Arc<SolverResult>,
        cached: bool,
        attempts: Vec<AttemptReport>,
    ) -> AnalysisOutcome {
        let summary = AerodynamicSummary::from_result(&result, &flow);
        AnalysisOutcome {
            raw_points,
            airfoil,
            flow,
            result,
            cached,
            attempts,
            summary,
        }
    }

    /// Current health, independent of in-flight requests.
    ///
    /// Expired cache entries are purged first so `cache_entries` only counts
    /// results that can still be served.
    pub fn health(&self) -> EngineHealth {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        EngineHealth {
            backend: self.backend.name().to_string(),
            solver: self.backend.probe(),
            gate: self.gate.stats(),
            cache: self.cache.stats(),
            cache_entries: self.cache.len(),
            completed_analyses: self.completed.load(Ordering::Relaxed),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }

    /// The concurrency gate.
    #[must_use]
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// The result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The geometry normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &GeometryNormalizer {
        &self.normalizer
    }
}
