//! Application entry point and dispatch.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use aerolab_orchestration::AnalysisEngine;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::{AnalyzeArgs, AppConfig, Command, ConfigError, EngineArgs, ServeArgs};
use crate::presenter;

/// Client identity used for one-shot CLI analyses.
const CLI_CLIENT: &str = "cli";

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    match &config.command {
        Command::Completions { shell } => {
            let mut cmd = <AppConfig as clap::CommandFactory>::command();
            clap_complete::generate(*shell, &mut cmd, "aerolab", &mut io::stdout());
            Ok(())
        }
        Command::Serve(args) => run_serve(&config.engine, args),
        Command::Analyze(args) => run_analyze(&config.engine, args),
    }
}

/// Single-threaded dispatch; solver processes are waited on from the blocking pool.
fn runtime(engine: &EngineArgs) -> Result<Runtime, ConfigError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(engine.blocking_threads.max(1))
        .build()
        .map_err(ConfigError::Runtime)
}

fn run_serve(engine_args: &EngineArgs, args: &ServeArgs) -> Result<()> {
    let backend = engine_args.backend()?;
    let probe = aerolab_solver::SolverProbe::inspect(backend.executable());
    if probe.is_ready() {
        info!(solver = %probe.path.display(), "Solver found");
    } else {
        warn!(
            solver = %probe.path.display(),
            present = probe.present,
            executable = probe.executable,
            "Solver not launchable; analyses will fail until it is installed"
        );
    }

    let config = engine_args.engine_config(args.rate_limit());
    let engine = Arc::new(AnalysisEngine::new(config, Arc::new(backend)));

    runtime(engine_args)?.block_on(async {
        let listener = TcpListener::bind(args.bind)
            .await
            .map_err(|source| ConfigError::Bind {
                addr: args.bind,
                source,
            })?;
        aerolab_server::serve(listener, engine, args.client_policy(), shutdown_signal())
            .await
            .context("server error")
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Cannot listen for Ctrl+C; stopping now");
        return;
    }
    info!("Shutting down");
}

fn run_analyze(engine_args: &EngineArgs, args: &AnalyzeArgs) -> Result<()> {
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let backend = engine_args.backend()?;
    let engine = AnalysisEngine::new(engine_args.engine_config(None), Arc::new(backend));

    let spinner = if args.json || args.quiet {
        ProgressBar::hidden()
    } else {
        spinner(&format!("Analyzing {}", args.file.display()))
    };

    let outcome = runtime(engine_args)?
        .block_on(engine.analyze(CLI_CLIENT, &raw, args.reynolds, args.alpha));
    spinner.finish_and_clear();
    let outcome = outcome?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        presenter::write_json(&mut out, outcome)?;
    } else {
        presenter::write_report(&mut out, &outcome, args.quiet)?;
    }
    out.flush()?;
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
