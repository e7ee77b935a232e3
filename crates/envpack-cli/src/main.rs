//! envpack CLI - unpack a release manifest into a GitOps environment

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "envpack")]
#[command(author = "envpack Contributors")]
#[command(version)]
#[command(about = "Unpack a release manifest tarball into an environment", long_about = None)]
struct Cli {
    /// Name of environment to unpack manifests into
    #[arg(short = 'e', long = "env")]
    env: String,

    /// Tarball containing the release manifest
    #[arg(short = 'm', long = "manifest")]
    manifest: PathBuf,

    /// Dry run: change nothing and echo the commands that would run
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Configuration file (default: ./envpack.yaml when present)
    #[arg(short = 'c', long, env = "ENVPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn init_tracing(dry_run: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if dry_run {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("envpack={level},envpack_core={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

fn main() {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_codes::ERROR
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    init_tracing(cli.dry_run, cli.debug);

    if let Err(err) =
        commands::unpack::run(&cli.env, &cli.manifest, cli.config.as_deref(), cli.dry_run)
    {
        let code = err.exit_code();
        display::print_error(err, cli.debug);
        std::process::exit(code);
    }
}
