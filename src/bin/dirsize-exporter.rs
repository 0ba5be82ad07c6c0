//! dirsize-exporter - Prometheus exporter for directory sizes.
//!
//! Scans the data directory on a fixed interval and serves the sizes of its
//! immediate subdirectories on `/metrics`.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use dirsize_exporter::app::{self, SHUTDOWN_GRACE};
use dirsize_exporter::config::{self, Cli, Command, Config};

/// Initializes JSON logging on stdout.
/// Only this crate logs by default, at INFO or DEBUG with `--verbose`;
/// `RUST_LOG` replaces the whole filter.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Start(args) => start(Config::from(args)),
        Command::Completion(args) => config::write_completion(args.shell, &mut io::stdout()),
    }
}

fn start(config: Config) {
    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    let result = runtime.block_on(app::run(config));
    // Do not hang on a scan stuck in the blocking pool.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(e) = result {
        error!(error = %e, "exporter failed");
        process::exit(1);
    }
}
