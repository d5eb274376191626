//! checksb - differential SQL testing across bendsql and snowsql.

use std::sync::Arc;

use checksb::cli::Cli;
use checksb::config::Config;
use checksb::engine::SystemRunner;
use checksb::error::Result;
use checksb::logging;
use checksb::orchestrator::{exit_code, Orchestrator};
use checksb::report;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();

    logging::init_logging(cli.log_file.as_ref().map(|path| path.as_deref()));

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults();

    let settings = cli.resolve(&config)?;
    let sink = report::sink_for(settings.output_format, settings.output_file.as_ref())?;

    let mut orchestrator = Orchestrator::from_settings(&settings, Arc::new(SystemRunner), sink);
    let summary = orchestrator.run(settings.mode).await?;

    Ok(exit_code(&summary, settings.fail_on_mismatch))
}
