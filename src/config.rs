//! Command-line interface and validated runtime configuration.
//!
//! Every option can also be set through an `EXPORTER_*` environment
//! variable; an explicit flag wins over the environment.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Exports the disk usage of top-level subdirectories as Prometheus gauges.
#[derive(Parser, Debug)]
#[command(name = "dirsize-exporter", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start exporter.
    Start(StartArgs),
    /// Print a shell completion script to stdout.
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `shell` to `out`.
pub fn write_completion(shell: Shell, out: &mut dyn io::Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}

#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Verbose logging.
    #[arg(
        short,
        long,
        env = "EXPORTER_VERBOSE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Path to data dir. Each immediate subdirectory is exported as one series.
    #[arg(long, env = "EXPORTER_DATA_DIR", default_value = "/data")]
    pub data_dir: PathBuf,

    /// Refresh interval in seconds.
    #[arg(
        short,
        long,
        env = "EXPORTER_INTERVAL",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Listen port.
    #[arg(
        long,
        env = "EXPORTER_PORT",
        default_value_t = 9100,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    /// Listen address.
    #[arg(
        long,
        env = "EXPORTER_LISTEN_ADDRESS",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    )]
    pub listen_address: IpAddr,
}

/// Validated configuration handed to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub interval: Duration,
    pub listen: SocketAddr,
    pub verbose: bool,
}

impl Config {
    /// Log filter used when `RUST_LOG` is unset: this crate only, at debug
    /// when verbose and info otherwise.
    pub fn default_log_filter(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        format!("{}={}", env!("CARGO_CRATE_NAME"), level)
    }
}

impl From<StartArgs> for Config {
    fn from(args: StartArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            interval: Duration::from_secs(args.interval),
            listen: SocketAddr::new(args.listen_address, args.port),
            verbose: args.verbose,
        }
    }
}
