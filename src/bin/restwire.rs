use clap::Parser;
use restwire::cli::{run_cli, Cli};
use restwire::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    // Keep stdout readable unless a level was asked for explicitly.
    let config = LogConfig::from_lookup(|name| {
        std::env::var(name)
            .ok()
            .or_else(|| (name == "RESTWIRE_LOG_LEVEL").then(|| "warn".to_string()))
    });
    let _guard = init_logging_with_config(&config)?;

    run_cli(Cli::parse())
}
