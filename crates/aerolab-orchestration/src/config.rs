//! Engine configuration.

use aerolab_cache::CacheOptions;
use aerolab_core::NormalizerOptions;
use aerolab_solver::ModeDescriptor;

use crate::rate_limit::RateLimitConfig;

/// Default number of solver processes allowed at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Immutable configuration of an [`crate::AnalysisEngine`].
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Geometry parsing limits and format detection thresholds.
    pub normalizer: NormalizerOptions,
    /// Budget of each execution mode.
    pub descriptors: [ModeDescriptor; 3],
    /// Capacity of the concurrency gate.
    pub max_concurrent: usize,
    /// Per-client rate limiting; `None` disables it.
    pub rate_limit: Option<RateLimitConfig>,
    /// Result cache sizing.
    pub cache: CacheOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerOptions::default(),
            descriptors: ModeDescriptor::defaults(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            rate_limit: Some(RateLimitConfig::default()),
            cache: CacheOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Normalize options, replacing unusable values with defaults.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.normalizer = self.normalizer.normalize();
        self.max_concurrent = self.max_concurrent.max(1);
        self.rate_limit = self.rate_limit.map(RateLimitConfig::normalize);
        for descriptor in &mut self.descriptors {
            if descriptor.timeout.is_zero() {
                descriptor.timeout = ModeDescriptor::default_for(descriptor.mode).timeout;
            }
        }
        self
    }
}
