#![forbid(unsafe_code)]

//! Altezza splash binary entry point.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use altezza_runtime::{Program, RuntimeError};
use altezza_splash::app::SplashModel;
use altezza_splash::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file
        && let Err(e) = init_logging(path)
    {
        eprintln!("Failed to initialize: {e}");
        std::process::exit(1);
    }

    let model = SplashModel::new(Instant::now(), opts.splash_config());
    if let Err(e) = Program::new(model, opts.program_config()).run() {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}

/// Send structured logs to `path`; stdout belongs to the UI.
fn init_logging(path: &Path) -> Result<(), RuntimeError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| RuntimeError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber installed by the host already wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
