use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;

use distcat::config::{Config, JobConfig};
use distcat::orchestrator::DistOrchestrator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write a single ad-hoc bundle to this path instead of running the configured jobs
    #[arg(short, long, requires = "src")]
    out: Option<PathBuf>,

    /// Source files for the ad-hoc bundle, concatenated in the given order
    #[arg(short, long, requires = "out")]
    src: Vec<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "warn",  // Default: warnings and errors only
        1 => "info",  // -v: informational messages
        2 => "debug", // -vv: debug messages
        _ => "trace", // -vvv or more: trace messages
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );
    info!("Starting distcat bundle generation");

    let config = if let Some(out) = cli.out {
        // Ad-hoc mode: one job assembled from the CLI, replacing the
        // configured job list entirely.
        debug!("Ad-hoc bundle: {:?} from {:?}", out, cli.src);
        let config = Config {
            jobs: vec![JobConfig::new(out, cli.src)],
        };
        config.validate()?;
        config
    } else {
        Config::load(cli.config.as_deref())?
    };

    debug!("Configuration: {:?}", config);

    let orchestrator = DistOrchestrator::new(config);
    orchestrator.run()?;

    info!("All bundles generated successfully");
    Ok(())
}
