use clap::Parser;
use colored::*;
use dishanveshi_core::{get_default_config_file, ClientConfig, Controller, Indicator, NoopIndicator, Outcome};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

mod app;
mod cli;
mod logging;
mod output;
mod settings;

use crate::app::SpinnerIndicator;
use crate::cli::{Args, Command};
use crate::output::print_usage_instructions;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => match get_default_config_file() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                return ExitCode::FAILURE;
            }
        },
    };

    // flags > environment > file > defaults
    let file_config = match ClientConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::FAILURE;
        }
    };
    let flags = ClientConfig {
        api_base: args.api_base.clone(),
        maps_api_key: args.maps_key.clone(),
        ..ClientConfig::default()
    };
    let config = file_config.merge(&ClientConfig::from_env()).merge(&flags);

    logging::init(config.log_level.as_deref(), args.verbose);
    debug!("Using config file {}", config_path.display());

    let Some(command) = args.command else {
        print_usage_instructions();
        return ExitCode::SUCCESS;
    };

    if let Command::Config { action } = &command {
        return match settings::run(action, &config_path, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", format!("{:#}", e).red());
                ExitCode::FAILURE
            }
        };
    }

    let indicator: Arc<dyn Indicator> = if std::io::stderr().is_terminal() {
        Arc::new(SpinnerIndicator::new())
    } else {
        Arc::new(NoopIndicator)
    };
    let mut controller = match Controller::bootstrap(&config, indicator) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("{}", e.to_string().red().bold());
            return ExitCode::FAILURE;
        }
    };

    match app::run_command(&mut controller, command).await {
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            ExitCode::FAILURE
        }
    }
}
