use clap::Parser;
use trellis::cli::{run_cli, Cli};
use trellis::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = if cli.verbose {
        LogConfig::default_dev()
    } else {
        LogConfig::from_env()
    };
    let _guard = init_logging(&config)?;
    run_cli(cli)
}
