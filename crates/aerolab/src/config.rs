//! Application configuration from CLI flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use aerolab_cache::CacheOptions;
use aerolab_core::NormalizerOptions;
use aerolab_orchestration::{EngineConfig, RateLimitConfig};
use aerolab_server::ClientPolicy;
use aerolab_solver::platform::{self, resolve_executable};
use aerolab_solver::{ExecutionMode, ModeDescriptor, ProcessBackend};
use clap::{Args, Parser, Subcommand};

/// Invalid or unusable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("work directory {} is unusable: {source}", .path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// AeroLab: airfoil analysis backed by an external panel-method solver.
#[derive(Parser, Debug)]
#[command(name = "aerolab", version, about)]
pub struct AppConfig {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Analyze a single geometry file and print the result.
    Analyze(AnalyzeArgs),
    /// Generate shell completion.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000", env = "AEROLAB_BIND")]
    pub bind: SocketAddr,

    /// Requests per client before rate limiting kicks in.
    #[arg(long, default_value = "5", env = "AEROLAB_RATE_BURST")]
    pub rate_burst: u32,

    /// Time to earn back one request (e.g. "12s").
    #[arg(long, default_value = "12s", value_parser = parse_duration, env = "AEROLAB_RATE_REFILL")]
    pub rate_refill: Duration,

    /// Disable per-client rate limiting.
    #[arg(long, env = "AEROLAB_NO_RATE_LIMIT")]
    pub no_rate_limit: bool,

    /// Identify clients by the first X-Forwarded-For entry. Only safe behind
    /// a proxy that overwrites the header.
    #[arg(long, env = "AEROLAB_TRUST_FORWARDED_FOR")]
    pub trust_forwarded_for: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Geometry file (two or more whitespace-separated columns).
    pub file: PathBuf,

    /// Reynolds number.
    #[arg(long, default_value = "500000")]
    pub reynolds: f64,

    /// Angle of attack in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub alpha: f64,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (only print the coefficients).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Options shared by every command that runs the solver.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Solver executable, resolved against PATH.
    #[arg(long, global = true, default_value = "xfoil", env = "AEROLAB_SOLVER_PATH")]
    pub solver_path: PathBuf,

    /// Extra argument passed to the solver; repeat or separate with commas.
    #[arg(
        long = "solver-arg",
        global = true,
        value_delimiter = ',',
        allow_hyphen_values = true,
        env = "AEROLAB_SOLVER_ARGS"
    )]
    pub solver_args: Vec<String>,

    /// Root for per-run work directories [default: <tmp>/aerolab].
    #[arg(long, global = true, env = "AEROLAB_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Solver processes allowed at once.
    #[arg(long, global = true, default_value = "3", env = "AEROLAB_MAX_CONCURRENT")]
    pub max_concurrent: usize,

    /// Threads in the blocking pool that waits on solver processes.
    #[arg(long, global = true, default_value = "8", env = "AEROLAB_BLOCKING_THREADS")]
    pub blocking_threads: usize,

    /// Timeout of the standard viscous attempt.
    #[arg(long, global = true, default_value = "30s", value_parser = parse_duration, env = "AEROLAB_STANDARD_TIMEOUT")]
    pub standard_timeout: Duration,

    /// Timeout of the smoothed viscous attempt.
    #[arg(long, global = true, default_value = "45s", value_parser = parse_duration, env = "AEROLAB_SMOOTHED_TIMEOUT")]
    pub smoothed_timeout: Duration,

    /// Timeout of the inviscid fallback attempt.
    #[arg(long, global = true, default_value = "20s", value_parser = parse_duration, env = "AEROLAB_FALLBACK_TIMEOUT")]
    pub fallback_timeout: Duration,

    /// Cached results kept.
    #[arg(long, global = true, default_value = "256", env = "AEROLAB_CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// Age after which a cached result is recomputed (e.g. "1h").
    #[arg(long, global = true, default_value = "1h", value_parser = parse_duration, env = "AEROLAB_CACHE_TTL")]
    pub cache_ttl: Duration,

    /// Largest accepted geometry upload in bytes.
    #[arg(long, global = true, default_value = "65536", env = "AEROLAB_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Default log level: chatty for the service, quiet for one-shot runs.
    #[must_use]
    pub fn default_level(&self) -> tracing::Level {
        match self.command {
            Command::Serve(_) => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        }
    }
}

impl EngineArgs {
    /// Resolved work directory root.
    #[must_use]
    pub fn work_root(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("aerolab"))
    }

    /// Engine configuration; `rate_limit` is `None` unless serving.
    #[must_use]
    pub fn engine_config(&self, rate_limit: Option<RateLimitConfig>) -> EngineConfig {
        let timeouts = [
            (ExecutionMode::ViscousStandard, self.standard_timeout),
            (ExecutionMode::ViscousSmoothed, self.smoothed_timeout),
            (ExecutionMode::InviscidFallback, self.fallback_timeout),
        ];
        EngineConfig {
            normalizer: NormalizerOptions {
                max_bytes: self.max_upload_bytes,
                ..NormalizerOptions::default()
            },
            descriptors: timeouts.map(|(mode, timeout)| ModeDescriptor {
                timeout,
                ..ModeDescriptor::default_for(mode)
            }),
            max_concurrent: self.max_concurrent,
            rate_limit,
            cache: CacheOptions {
                capacity: self.cache_capacity,
                ttl: self.cache_ttl,
            },
        }
        .normalize()
    }

    /// Process backend for the configured solver; creates the work root.
    pub fn backend(&self) -> Result<ProcessBackend, ConfigError> {
        let work_root = self.work_root();
        std::fs::create_dir_all(&work_root).map_err(|source| ConfigError::WorkDir {
            path: work_root.clone(),
            source,
        })?;
        Ok(ProcessBackend::new(
            resolve_executable(&self.solver_path),
            self.solver_args.clone(),
            work_root,
            platform::native(),
        ))
    }
}

impl ServeArgs {
    /// Rate limiting as configured, or `None` when disabled.
    #[must_use]
    pub fn rate_limit(&self) -> Option<RateLimitConfig> {
        (!self.no_rate_limit).then_some(RateLimitConfig {
            burst: self.rate_burst,
            refill_interval: self.rate_refill,
        })
    }

    /// How the server identifies clients for rate limiting.
    #[must_use]
    pub fn client_policy(&self) -> ClientPolicy {
        ClientPolicy {
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

/// Parse a duration string like "5m", "1h", "30s", "500ms".
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("invalid duration `{s}` (expected e.g. 500ms, 30s, 5m, 1h)");
    let (digits, scale): (&str, fn(u64) -> Duration) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, Duration::from_millis)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, |n| Duration::from_secs(n.saturating_mul(60)))
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, |n| Duration::from_secs(n.saturating_mul(3600)))
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, Duration::from_secs)
    } else {
        (s, Duration::from_secs)
    };
    digits.parse::<u64>().map(scale).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_formats() {
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("45"), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn parse_duration_ms() {
        assert_eq!(parse_duration("1ms"), Ok(Duration::from_millis(1)));
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn engine_config_from_flags() {
        let config = AppConfig::try_parse_from([
            "aerolab",
            "--standard-timeout",
            "10s",
            "--max-concurrent",
            "0",
            "--cache-ttl",
            "5m",
            "serve",
            "--no-rate-limit",
        ])
        .unwrap();
        let Command::Serve(serve) = &config.command else {
            panic!("expected serve");
        };
        let engine = config.engine.engine_config(serve.rate_limit());
        assert_eq!(engine.descriptors[0].timeout, Duration::from_secs(10));
        assert_eq!(engine.descriptors[0].iteration_cap, 200);
        assert_eq!(engine.descriptors[2].timeout, Duration::from_secs(20));
        assert_eq!(engine.max_concurrent, 1);
        assert_eq!(engine.cache.ttl, Duration::from_secs(300));
        assert!(engine.rate_limit.is_none());
        assert!(!serve.client_policy().trust_forwarded_for);
        assert_eq!(config.default_level(), tracing::Level::INFO);
    }

    #[test]
    fn forwarded_for_is_opt_in() {
        let config =
            AppConfig::try_parse_from(["aerolab", "serve", "--trust-forwarded-for"]).unwrap();
        let Command::Serve(serve) = &config.command else {
            panic!("expected serve");
        };
        assert!(serve.client_policy().trust_forwarded_for);
        assert!(serve.rate_limit().is_some());
    }

    #[test]
    fn analyze_accepts_negative_alpha() {
        let config = AppConfig::try_parse_from([
            "aerolab", "analyze", "foil.dat", "--alpha", "-4", "--json",
        ])
        .unwrap();
        let Command::Analyze(args) = &config.command else {
            panic!("expected analyze");
        };
        assert!((args.alpha + 4.0).abs() < f64::EPSILON);
        assert!((args.reynolds - 500_000.0).abs() < f64::EPSILON);
        assert!(args.json);
        assert_eq!(config.default_level(), tracing::Level::WARN);
    }

    #[test]
    fn solver_args_split_on_commas() {
        let config = AppConfig::try_parse_from([
            "aerolab",
            "--solver-path",
            "/bin/sh",
            "--solver-arg",
            "-e,fake.sh",
            "analyze",
            "foil.dat",
            "--alpha",
            "2",
        ])
        .unwrap();
        assert_eq!(config.engine.solver_args, ["-e", "fake.sh"]);
    }
}
