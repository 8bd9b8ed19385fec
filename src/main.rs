use anyhow::Result;
use clap::Parser;

use amestris_transmute::cli::commands::materials::MaterialsCommand;
use amestris_transmute::cli::commands::session::SessionCommand;
use amestris_transmute::cli::commands::show_how_to_get_started;
use amestris_transmute::cli::commands::simulate::SimulateCommand;
use amestris_transmute::cli::{Cli, Commands};
use amestris_transmute::config::{config, TransmuteConfig};
use amestris_transmute::telemetry::{init_telemetry, shutdown_telemetry};

fn load_config(cli: &Cli) -> Result<TransmuteConfig> {
    match &cli.config {
        Some(path) => {
            TransmuteConfig::load_env_file()?;
            TransmuteConfig::load_from(path)
        }
        None => Ok(config()?.clone()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_telemetry(&config.observability)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(async {
        match cli.command {
            // Default behavior: no subcommand - explain how to get started
            None => show_how_to_get_started().await,
            Some(Commands::Simulate { inputs, output, complexity }) => {
                SimulateCommand::new(inputs, output, complexity)
                    .execute(&config)
                    .await
            }
            Some(Commands::Transmute { inputs, output, complexity, actor }) => {
                SimulateCommand::new(inputs, output, complexity)
                    .with_commit(actor)
                    .execute(&config)
                    .await
            }
            Some(Commands::Materials { all }) => MaterialsCommand::new(all).execute(&config).await,
            Some(Commands::Session) => SessionCommand::new().execute(&config).await,
        }
    });

    #[cfg(feature = "observability")]
    amestris_transmute::observability::backend_metrics().log_stats();
    shutdown_telemetry();

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
    Ok(())
}
