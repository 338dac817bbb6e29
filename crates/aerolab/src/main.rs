//! AeroLab: airfoil analysis service and CLI.

use aerolab_lib::{app, config, errors};

fn main() {
    let config = config::AppConfig::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(config.default_level().into())
                .from_env_lossy(),
        )
        .init();

    if let Err(err) = app::run(&config) {
        eprintln!("Error: {err:#}");
        std::process::exit(errors::exit_code(&err));
    }
}
