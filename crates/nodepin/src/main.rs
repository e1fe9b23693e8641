mod async_helpers;
mod catalog_source;
mod cli;
mod declaration;
mod error;
mod logging;
mod orchestrator;
mod prompt;
mod report;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};

use nodepin_nvm::NvmProvider;

use crate::catalog_source::HttpCatalog;
use crate::cli::Cli;
use crate::orchestrator::Orchestrator;
use crate::prompt::StdioPrompter;
use crate::settings::AppSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (mut settings, settings_error) = match AppSettings::load() {
        Ok(settings) => (settings, None),
        Err(error) => (AppSettings::default(), Some(error)),
    };
    cli.apply(&mut settings);

    logging::init_logging(settings.debug_logging, settings.max_log_size_bytes);
    if let Some(error) = settings_error {
        eprintln!("{}", error.fallback_notice());
        warn!("Using default settings: {error}");
    }
    info!("nodepin v{} starting", env!("CARGO_PKG_VERSION"));

    let provider = NvmProvider::new()
        .with_nvm_dir(settings.nvm_dir.clone())
        .with_installer_sha256(settings.installer_sha256.clone())
        .with_timeouts(settings.nvm_timeouts());
    let catalog = HttpCatalog::new(reqwest::Client::new(), settings.catalog_url.clone());
    let prompter = StdioPrompter::default();

    let outcome = Orchestrator::new(
        settings.orchestrator_config(cli.yes),
        &provider,
        &catalog,
        &prompter,
    )
    .run()
    .await;

    info!("Visited states: {}", outcome.history.join(" -> "));
    ExitCode::from(outcome.exit_code())
}
