//! reportloop CLI entry point.

use clap::Parser;

use reportloop::cli::commands::{self, load_config};
use reportloop::cli::{Cli, Commands};
use reportloop::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging follows the loaded configuration; a broken config still gets
    // default logging so the error itself can be reported.
    let log_config = load_config(cli.config.as_deref())
        .map(|config| LogConfig::from(&config.logging))
        .unwrap_or_default();
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config, cli.json).await,
        Commands::Verify(args) => commands::verify::execute(args, cli.config, cli.json).await,
        Commands::Render(args) => commands::render::execute(args, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, cli.config, cli.json).await,
    };

    if let Err(err) = result {
        reportloop::cli::handle_error(err, cli.json);
    }
}
