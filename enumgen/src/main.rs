use clap::Parser;
use enumgen::cli::Cli;
use enumgen::{Result, generate};
use tracing::{error, info, warn};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    let report = generate(&config)?;

    match &report.output {
        Some(path) => info!(
            "Generated {} types ({} values) into {:?} ({} bytes)",
            report.type_count, report.value_count, path, report.bytes_written
        ),
        None => warn!("Nothing to generate in package {}", report.package),
    }
    Ok(())
}

/// RUST_LOG wins when set; otherwise verbosity flags pick the level.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
